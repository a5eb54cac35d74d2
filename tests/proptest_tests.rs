// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests verify the algebraic properties of the merge and
//! normalization operations over arbitrary configuration trees.

use proptest::prelude::*;
use rediswire::domain::client::{ClientConfig, DEFAULT_REDIS_PORT};
use rediswire::domain::raw::{merge, merge_maps, take_parent, RawMap, RawValue};

/// Arbitrary configuration trees. Floats are left out so that
/// structural equality stays exact.
fn raw_value_strategy() -> impl Strategy<Value = RawValue> {
    let leaf = prop_oneof![
        Just(RawValue::Null),
        any::<bool>().prop_map(RawValue::Bool),
        any::<i64>().prop_map(RawValue::Int),
        "[a-z0-9 ]{0,12}".prop_map(RawValue::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(("[a-z]{1,8}", inner), 0..4)
            .prop_map(|entries| RawValue::Map(entries.into_iter().collect()))
    })
}

/// Arbitrary scalar (non-mapping) values.
fn scalar_strategy() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        Just(RawValue::Null),
        any::<bool>().prop_map(RawValue::Bool),
        any::<i64>().prop_map(RawValue::Int),
        "[a-z0-9 ]{0,12}".prop_map(RawValue::from),
    ]
}

// Merging a tree over itself is the identity
proptest! {
    #[test]
    fn test_merge_idempotent_when_child_equals_parent(value in raw_value_strategy()) {
        let merged = merge(&value, &value).unwrap();
        prop_assert_eq!(merged, value);
    }
}

// The child wins at every key where both sides hold a scalar
proptest! {
    #[test]
    fn test_merge_child_wins_for_scalar_leaves(
        key in "[a-z]{1,8}",
        child_value in scalar_strategy(),
        parent_value in scalar_strategy(),
    ) {
        let child: RawMap = [(key.clone(), child_value.clone())].into_iter().collect();
        let parent: RawMap = [(key.clone(), parent_value)].into_iter().collect();
        let merged = merge_maps(&child, &parent).unwrap();
        prop_assert_eq!(merged.get(&key), Some(&child_value));
    }
}

// Parent keys absent from the child always survive the merge
proptest! {
    #[test]
    fn test_merge_preserves_parent_only_keys(
        parent in prop::collection::vec(("[a-z]{1,8}", scalar_strategy()), 0..6),
    ) {
        let parent: RawMap = parent.into_iter().collect();
        let merged = merge_maps(&RawMap::new(), &parent).unwrap();
        prop_assert_eq!(merged, parent);
    }
}

// Normalization is total: every host/port combination lands in a
// valid state
proptest! {
    #[test]
    fn test_normalize_is_total(
        host in "(/[a-z]{1,12}|[a-z]{1,12})",
        port in any::<Option<u16>>(),
    ) {
        let config = ClientConfig {
            host: host.clone(),
            port,
            ..ClientConfig::default()
        }
        .normalize();

        if host.starts_with('/') {
            prop_assert_eq!(config.port, None);
        } else if port.unwrap_or(0) == 0 {
            prop_assert_eq!(config.port, Some(DEFAULT_REDIS_PORT));
        } else {
            prop_assert_eq!(config.port, port);
        }
    }
}

// Normalization leaves already-valid configs unchanged
proptest! {
    #[test]
    fn test_normalize_fixed_point(
        host in "(/[a-z]{1,12}|[a-z]{1,12})",
        port in any::<Option<u16>>(),
    ) {
        let once = ClientConfig {
            host,
            port,
            ..ClientConfig::default()
        }
        .normalize();
        let twice = once.clone().normalize();
        prop_assert_eq!(twice, once);
    }
}

// The inheritance directive never survives extraction
proptest! {
    #[test]
    fn test_take_parent_always_removes_directive(
        parent_name in "[a-z]{1,8}",
        rest in prop::collection::vec(("[a-z]{1,8}", scalar_strategy()), 0..4),
    ) {
        let mut map: RawMap = rest.into_iter().collect();
        map.insert("extends", RawValue::from(parent_name.clone()));

        let taken = take_parent(&mut map).unwrap();
        prop_assert_eq!(taken, Some(parent_name));
        prop_assert!(!map.contains_key("extends"));
    }
}
