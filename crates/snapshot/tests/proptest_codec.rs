//! Property-based tests for the input property codec.
//!
//! - Round trip: decoding an encoded map yields the same map, including
//!   arbitrary finite floats inside nested arrays and objects
//! - Hash stability: decoded maps hash identically to the originals
//! - Corruption: unknown tags are always rejected

use proptest::prelude::*;
use serde_json::{Value, json};
use strata_snapshot::{
    Error, InputPropertiesCodec, InputPropertyMap, OpaqueValue, ValueSnapshot, hash_properties,
};

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<f64>()
            .prop_filter("JSON has no NaN or infinity", |f| f.is_finite())
            .prop_map(|f| json!(f)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn json_strategy() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

fn snapshot_strategy() -> impl Strategy<Value = ValueSnapshot> {
    prop_oneof![
        Just(ValueSnapshot::Null),
        ".{0,40}".prop_map(ValueSnapshot::String),
        (any::<i64>(), any::<bool>(), "[a-z]{0,8}").prop_map(|(n, flag, s)| {
            ValueSnapshot::Opaque(OpaqueValue::new(json!({"n": n, "flag": flag, "tags": [s]})))
        }),
        json_strategy().prop_map(|value| ValueSnapshot::Opaque(OpaqueValue::new(value))),
    ]
}

fn properties_strategy() -> impl Strategy<Value = InputPropertyMap> {
    prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9.]{0,15}", snapshot_strategy(), 0..12)
}

proptest! {
    /// Property: decode(encode(m)) == m
    #[test]
    fn roundtrip_preserves_every_entry(properties in properties_strategy()) {
        let codec = InputPropertiesCodec::default();
        let bytes = codec.encode_to_vec(&properties).unwrap();
        let decoded = codec.decode_from_slice(&bytes).unwrap();

        prop_assert_eq!(&decoded, &properties);
        prop_assert_eq!(hash_properties(&decoded), hash_properties(&properties));
    }

    /// Property: a tag outside {0, 1, 2} never decodes to a value
    #[test]
    fn unknown_tags_are_rejected(name in "[a-z]{1,10}", tag in 3u8..0x80) {
        let mut bytes = vec![1, u8::try_from(name.len()).unwrap()];
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(tag);

        let err = InputPropertiesCodec::default().decode_from_slice(&bytes).unwrap_err();
        let is_unknown_tag = matches!(err, Error::UnknownSnapshotTag { tag: t } if t == u32::from(tag));
        prop_assert!(is_unknown_tag);
    }
}
