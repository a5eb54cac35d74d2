// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the configuration algebra and plan types.
//!
//! This module holds the pure core of the crate: the untyped raw
//! configuration tree and its merge algebra, the typed client record,
//! the inheritance-aware resolver, subsystem derivation, and the
//! wiring plan. Nothing in here performs I/O.

pub mod client;
pub mod errors;
pub mod plan;
pub mod raw;
pub mod resolver;
pub mod subsystems;

// Re-export commonly used types
pub use client::{ClientConfig, DebuggerMode};
pub use errors::{Result, WiringError};
pub use plan::{PlanBuilder, ServiceEntry, ServiceId, ServiceKind, SetupCall, WiringPlan};
pub use raw::{RawMap, RawValue};
pub use resolver::{ClientDefinition, ClientResolver, ResolvedClient, ResolvedClients};
pub use subsystems::{JournalConfig, SessionConfig, StorageConfig, SubsystemSetting};
