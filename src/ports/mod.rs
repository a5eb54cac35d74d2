// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) that bound the
//! resolution pipeline: the consumed network-client collaborator used
//! by the version gate, and the produced service-registry collaborator
//! that instantiates the wiring plan.

pub mod connector;
pub mod registry;

// Re-export commonly used types
pub use connector::{RedisConnection, RedisConnector};
pub use registry::ServiceRegistry;
