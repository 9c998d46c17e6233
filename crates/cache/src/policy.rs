//! Whether a unit of work may use the build cache, and why not

use std::borrow::Cow;
use std::fmt;

/// Explanation attached to a disabled [`CachingState`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisabledReason(Cow<'static, str>);

impl DisabledReason {
    /// The reason as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caching policy for one unit of work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CachingState {
    /// Outputs may be loaded from and stored to the cache
    Enabled,
    /// Caching is off for the given reason
    Disabled(DisabledReason),
}

impl CachingState {
    /// Caching is on
    pub const ENABLED: Self = Self::Enabled;

    /// Caching is turned off for the whole build
    pub const DISABLED: Self = Self::disabled_static("Task output caching is disabled.");

    /// The unit of work did not opt in to caching
    pub const CACHING_NOT_ENABLED: Self =
        Self::disabled_static("Caching has not been enabled for the task");

    /// The unit of work has nothing to cache
    pub const NO_OUTPUTS_DECLARED: Self = Self::disabled_static("No outputs declared");

    const fn disabled_static(reason: &'static str) -> Self {
        Self::Disabled(DisabledReason(Cow::Borrowed(reason)))
    }

    /// Caching is off for `reason`.
    ///
    /// # Panics
    ///
    /// Panics if `reason` is empty: every disabled state must be explainable
    /// to the build author.
    #[must_use]
    pub fn disabled(reason: impl Into<Cow<'static, str>>) -> Self {
        let reason = reason.into();
        assert!(
            !reason.trim().is_empty(),
            "disabled reason must be set if caching is disabled"
        );
        Self::Disabled(DisabledReason(reason))
    }

    /// Whether caching is on
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Why caching is off, or `None` when it is on
    #[must_use]
    pub fn disabled_reason(&self) -> Option<&str> {
        match self {
            Self::Enabled => None,
            Self::Disabled(reason) => Some(reason.as_str()),
        }
    }
}

impl Default for CachingState {
    fn default() -> Self {
        Self::CACHING_NOT_ENABLED
    }
}

impl fmt::Display for CachingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled(reason) => write!(f, "disabled: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_has_no_reason() {
        let state = CachingState::ENABLED;
        assert!(state.is_enabled());
        assert_eq!(state.disabled_reason(), None);
        assert_eq!(state.to_string(), "enabled");
    }

    #[test]
    fn test_well_known_reasons() {
        for state in [
            CachingState::DISABLED,
            CachingState::CACHING_NOT_ENABLED,
            CachingState::NO_OUTPUTS_DECLARED,
        ] {
            assert!(!state.is_enabled());
            assert!(!state.disabled_reason().unwrap().is_empty());
        }
        assert_eq!(
            CachingState::NO_OUTPUTS_DECLARED.disabled_reason(),
            Some("No outputs declared")
        );
    }

    #[test]
    fn test_custom_reason() {
        let state = CachingState::disabled(format!("'{}' is not cacheable", ":test"));
        assert!(!state.is_enabled());
        assert_eq!(state.disabled_reason(), Some("':test' is not cacheable"));
        assert_eq!(state.to_string(), "disabled: ':test' is not cacheable");
    }

    #[test]
    #[should_panic(expected = "disabled reason must be set")]
    fn test_empty_reason_panics() {
        let _ = CachingState::disabled("");
    }

    #[test]
    #[should_panic(expected = "disabled reason must be set")]
    fn test_blank_reason_panics() {
        let _ = CachingState::disabled("   ");
    }

    #[test]
    fn test_default_is_not_enabled() {
        assert_eq!(CachingState::default(), CachingState::CACHING_NOT_ENABLED);
    }
}
