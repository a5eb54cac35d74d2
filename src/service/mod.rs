// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer orchestrating resolution and validation.
//!
//! This module contains the loader that runs the full resolution
//! pipeline and the pre-flight version gate validating the resulting
//! plan's live endpoints.

pub mod loader;
pub mod version_gate;

// Re-export commonly used types
pub use loader::WiringLoader;
pub use version_gate::VersionGate;
