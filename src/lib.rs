// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture configuration-resolution and service-wiring
//! crate for Redis-backed services.
//!
//! This crate turns a declarative, possibly-nested configuration block
//! into a fully specified [`WiringPlan`](domain::plan::WiringPlan):
//! which services exist (Redis clients, a cache-invalidation journal, a
//! cache storage, an HTTP session handler, diagnostics panels), how
//! they depend on each other, and the resolved configuration of each.
//! A pre-flight [`VersionGate`](service::VersionGate) probes every
//! configured endpoint before the plan is considered usable.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: the configuration algebra — raw-tree merging,
//!   client inheritance resolution, subsystem derivation, and the plan
//!   types (`RawValue`, `ClientConfig`, `ResolvedClients`, `WiringPlan`)
//! - **Ports**: trait definitions bounding the pipeline
//!   (`RedisConnector` for the consumed network client, `ServiceRegistry`
//!   for the produced instantiation step)
//! - **Adapters**: the concrete edges (YAML parsing, the live `redis`
//!   probe)
//! - **Service**: the loader orchestrating resolution and the version
//!   gate validating the result
//!
//! # Resolution semantics
//!
//! - Defaults merge under every client with child-overrides-parent
//!   semantics; named clients may inherit from earlier ones through the
//!   `extends` directive, and the first client resolved is promoted to
//!   be the default/autowired instance.
//! - Socket-style hosts (`/`-prefixed) never carry a port; other hosts
//!   default to port 6379.
//! - Subsystems (`journal`, `storage`, `session`) derive their configs
//!   from the default client plus their own overrides; `false` disables
//!   a subsystem entirely.
//! - Every error is fatal to the load. A partially wired service graph
//!   is worse than refusing to start.
//!
//! # Feature Flags
//!
//! - `yaml`: YAML parsing support (default)
//! - `redis`: the live version-probe connector over the `redis` crate
//! - `full`: all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use rediswire::prelude::*;
//!
//! # fn main() -> rediswire::domain::errors::Result<()> {
//! let raw = RawValue::Map(RawMap::from_iter([
//!     ("host", RawValue::from("127.0.0.1")),
//!     ("storage", RawValue::Bool(true)),
//! ]));
//! let plan = WiringLoader::new().load(&raw)?;
//! assert!(plan.get("redis.cache_storage").is_some());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for
/// convenient access.
pub mod prelude {
    pub use crate::domain::{
        ClientConfig, ClientDefinition, ClientResolver, DebuggerMode, JournalConfig, PlanBuilder,
        RawMap, RawValue, ResolvedClient, ResolvedClients, Result, ServiceEntry, ServiceId,
        ServiceKind, SessionConfig, SetupCall, StorageConfig, SubsystemSetting, WiringError,
        WiringPlan,
    };
    pub use crate::ports::{RedisConnection, RedisConnector, ServiceRegistry};
    pub use crate::service::{VersionGate, WiringLoader};

    // Re-export adapters based on feature flags
    #[cfg(feature = "redis")]
    pub use crate::adapters::RedisProbe;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{from_yaml_file, from_yaml_str};
}
