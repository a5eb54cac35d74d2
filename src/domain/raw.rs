// SPDX-License-Identifier: MIT OR Apache-2.0

//! Untyped configuration tree and the merge algebra over it.
//!
//! This module provides [`RawValue`] and [`RawMap`], the untyped form of
//! configuration as authored by a user, together with the deep-merge
//! operation used throughout resolution and the extraction of the
//! reserved `extends` inheritance directive.
//!
//! `RawMap` preserves declaration order, which is load-bearing: named
//! clients must be resolved in the order they were written so that a
//! parent is always resolved before any client that extends it.

use crate::domain::errors::{Result, WiringError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The reserved key carrying the inheritance directive in a raw client
/// config. [`take_parent`] removes it so it is never treated as a
/// literal configuration key.
pub const PARENT_KEY: &str = "extends";

/// Alternate spelling of the inheritance directive, accepted
/// interchangeably with [`PARENT_KEY`].
pub const PARENT_KEY_ALT: &str = "inherit-from";

/// An untyped configuration value.
///
/// This is the shape of configuration as it arrives from a user: scalars
/// and nested mappings, with no schema applied yet. Values deserialize
/// from any self-describing serde format; sequences are rejected since
/// no part of the configuration schema is list-shaped.
///
/// # Examples
///
/// ```
/// use rediswire::domain::raw::{RawMap, RawValue};
///
/// let value = RawValue::Map(RawMap::from_iter([
///     ("host", RawValue::from("10.0.0.5")),
///     ("port", RawValue::from(6380)),
/// ]));
/// assert!(value.as_map().is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// An explicit null (or an absent value in formats that have one).
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    Str(String),
    /// A nested mapping.
    Map(RawMap),
}

impl RawValue {
    /// Returns the contained mapping, if this value is one.
    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns true if this value is the explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// A short human-readable name for the value's shape, used in
    /// error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Str(_) => "string",
            RawValue::Map(_) => "mapping",
        }
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Str(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Str(v)
    }
}

impl From<RawMap> for RawValue {
    fn from(v: RawMap) -> Self {
        RawValue::Map(v)
    }
}

/// An insertion-ordered string-keyed mapping of [`RawValue`]s.
///
/// Inserting an existing key replaces the value in place, keeping the
/// key's original position; this mirrors how a re-declared client keeps
/// its place in the wiring plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMap {
    entries: Vec<(String, RawValue)>,
}

impl RawMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a value, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes a key, returning its value if it was present. The order
    /// of the remaining entries is unchanged.
    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawMap {
    fn from_iter<T: IntoIterator<Item = (K, RawValue)>>(iter: T) -> Self {
        let mut map = RawMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Deep-merges `child` over `parent` with child-overrides-parent
/// semantics.
///
/// For any key present on both sides the child's value wins, unless the
/// child's value is itself a mapping, in which case the merge recurses.
/// A child mapping meeting a non-null scalar on the parent side fails
/// with [`WiringError::MalformedConfig`]. An explicit child null defers
/// to a parent mapping (so `clients: {a: }` and `clients: {a: {}}` read
/// the same), but wins over parent scalars like any other child value.
///
/// # Examples
///
/// ```
/// use rediswire::domain::raw::{merge, RawMap, RawValue};
///
/// let child = RawValue::Map(RawMap::from_iter([("port", RawValue::from(6380))]));
/// let parent = RawValue::Map(RawMap::from_iter([
///     ("host", RawValue::from("127.0.0.1")),
///     ("port", RawValue::from(6379)),
/// ]));
/// let merged = merge(&child, &parent).unwrap();
/// let map = merged.as_map().unwrap();
/// assert_eq!(map.get("host"), Some(&RawValue::from("127.0.0.1")));
/// assert_eq!(map.get("port"), Some(&RawValue::from(6380)));
/// ```
pub fn merge(child: &RawValue, parent: &RawValue) -> Result<RawValue> {
    merge_at(child, parent, "")
}

/// Map-level form of [`merge`], for the common case where both sides
/// are known to be mappings.
pub fn merge_maps(child: &RawMap, parent: &RawMap) -> Result<RawMap> {
    merge_maps_at(child, parent, "")
}

fn merge_at(child: &RawValue, parent: &RawValue, path: &str) -> Result<RawValue> {
    match (child, parent) {
        (RawValue::Map(c), RawValue::Map(p)) => Ok(RawValue::Map(merge_maps_at(c, p, path)?)),
        (RawValue::Map(c), RawValue::Null) => Ok(RawValue::Map(c.clone())),
        (RawValue::Map(_), scalar) => Err(WiringError::malformed(
            path,
            format!("cannot merge a mapping over a {}", scalar.type_name()),
        )),
        (RawValue::Null, RawValue::Map(p)) => Ok(RawValue::Map(p.clone())),
        (child, _) => Ok(child.clone()),
    }
}

fn merge_maps_at(child: &RawMap, parent: &RawMap, path: &str) -> Result<RawMap> {
    let mut result = RawMap::new();
    for (key, parent_value) in parent.iter() {
        let merged = match child.get(key) {
            Some(child_value) => merge_at(child_value, parent_value, &join_path(path, key))?,
            None => parent_value.clone(),
        };
        result.insert(key, merged);
    }
    for (key, child_value) in child.iter() {
        if !parent.contains_key(key) {
            result.insert(key, child_value.clone());
        }
    }
    Ok(result)
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Removes and returns the reserved inheritance directive
/// (`extends` or `inherit-from`) from a raw client config.
///
/// Returns `None` when the directive is absent (or explicitly null).
/// Fails with [`WiringError::MalformedConfig`] when the directive is
/// not a string, since a parent reference must be a client name.
pub fn take_parent(map: &mut RawMap) -> Result<Option<String>> {
    let directive = map
        .remove(PARENT_KEY)
        .or_else(|| map.remove(PARENT_KEY_ALT));
    match directive {
        None | Some(RawValue::Null) => Ok(None),
        Some(RawValue::Str(name)) => Ok(Some(name)),
        Some(other) => Err(WiringError::malformed(
            PARENT_KEY,
            format!("expected a client name string, found a {}", other.type_name()),
        )),
    }
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RawValue::Null => serializer.serialize_unit(),
            RawValue::Bool(v) => serializer.serialize_bool(*v),
            RawValue::Int(v) => serializer.serialize_i64(*v),
            RawValue::Float(v) => serializer.serialize_f64(*v),
            RawValue::Str(v) => serializer.serialize_str(v),
            RawValue::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawValueVisitor;

        impl<'de> Visitor<'de> for RawValueVisitor {
            type Value = RawValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a configuration scalar or mapping")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Bool(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Int(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<RawValue, E> {
                i64::try_from(v)
                    .map(RawValue::Int)
                    .map_err(|_| E::custom(format!("integer {} out of range", v)))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Float(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Str(v.to_string()))
            }

            fn visit_string<E: serde::de::Error>(
                self,
                v: String,
            ) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Str(v))
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Null)
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<RawValue, E> {
                Ok(RawValue::Null)
            }

            fn visit_some<D2: Deserializer<'de>>(
                self,
                deserializer: D2,
            ) -> std::result::Result<RawValue, D2::Error> {
                RawValue::deserialize(deserializer)
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<RawValue, A::Error> {
                let mut map = RawMap::new();
                while let Some((key, value)) = access.next_entry::<String, RawValue>()? {
                    map.insert(key, value);
                }
                Ok(RawValue::Map(map))
            }
        }

        deserializer.deserialize_any(RawValueVisitor)
    }
}
