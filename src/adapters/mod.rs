// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the concrete edges of the crate.
//!
//! This module contains the implementations that touch the outside
//! world: parsing YAML into the raw configuration tree, and the live
//! connector the version gate probes endpoints with.

#[cfg(feature = "redis")]
pub mod redis_probe;
#[cfg(feature = "yaml")]
pub mod yaml;

// Re-export adapters based on feature flags
#[cfg(feature = "redis")]
pub use redis_probe::RedisProbe;
#[cfg(feature = "yaml")]
pub use yaml::{from_yaml_file, from_yaml_str};
