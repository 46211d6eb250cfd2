// tests/roundtrip_properties.rs
//! Property tests over generated dynamic values

use dyn_bridge::dynamic::MAX_SAFE_INTEGER;
use dyn_bridge::{export, import, Dynamic, MemoryRuntime, Runtime, ValueKind};
use proptest::prelude::*;

fn dynamic_strategy() -> impl Strategy<Value = Dynamic> {
    let leaf = prop_oneof![
        Just(Dynamic::Null),
        any::<bool>().prop_map(Dynamic::Bool),
        (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).prop_map(Dynamic::Int),
        any::<f64>()
            .prop_filter("NaN is never equal to itself", |f| !f.is_nan())
            .prop_map(Dynamic::Float),
        ".{0,12}".prop_map(Dynamic::String),
    ];

    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Dynamic::Array),
            prop::collection::hash_map(".{0,8}", inner, 0..6)
                .prop_map(|map| Dynamic::Object(map.into_iter().collect())),
        ]
    })
}

fn expected_kind(value: &Dynamic) -> ValueKind {
    match value {
        Dynamic::Null => ValueKind::Null,
        Dynamic::Bool(_) => ValueKind::Bool,
        Dynamic::Int(_) | Dynamic::Float(_) => ValueKind::Number,
        Dynamic::String(_) => ValueKind::String,
        Dynamic::Array(_) => ValueKind::Array,
        Dynamic::Object(_) => ValueKind::Object,
    }
}

proptest! {
    #[test]
    fn prop_export_inverts_import(value in dynamic_strategy()) {
        let mut rt = MemoryRuntime::new();
        let imported = import(&mut rt, &value).unwrap();
        let exported = export(&rt, &imported).unwrap();

        prop_assert_eq!(exported, value);
    }

    #[test]
    fn prop_import_preserves_type_tag(value in dynamic_strategy()) {
        let mut rt = MemoryRuntime::new();
        let imported = import(&mut rt, &value).unwrap();

        prop_assert_eq!(rt.kind_of(&imported).unwrap(), expected_kind(&value));
    }

    #[test]
    fn prop_allocation_failure_is_total(value in dynamic_strategy()) {
        let mut sizing = MemoryRuntime::new();
        import(&mut sizing, &value).unwrap();
        let needed = sizing.allocations();
        prop_assume!(needed > 0);

        let mut rt = MemoryRuntime::with_allocation_limit(needed - 1);
        let err = import(&mut rt, &value).unwrap_err();
        prop_assert!(err.is_allocation_failure());
    }

    #[test]
    fn prop_unsafe_integers_rejected(n in prop_oneof![
        (MAX_SAFE_INTEGER + 1)..=i64::MAX,
        i64::MIN..=(-MAX_SAFE_INTEGER - 1),
    ]) {
        let mut rt = MemoryRuntime::new();
        let value = Dynamic::object().with_field("n", n);

        prop_assert!(import(&mut rt, &value).is_err());
    }
}
