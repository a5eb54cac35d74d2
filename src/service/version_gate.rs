// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-flight validation of configured endpoints.
//!
//! After a plan is built and before it is considered usable, the gate
//! opens a short-lived connection to every client whose
//! `versionCheck` flag is set, asserts protocol-version compatibility,
//! and closes again. A single bad endpoint rejects the whole plan:
//! this runs once at process bootstrap, where explicit operator
//! feedback beats resilience.

use crate::domain::errors::Result;
use crate::domain::plan::WiringPlan;
use crate::domain::resolver::ResolvedClients;
use crate::ports::RedisConnector;
use tracing::debug;

/// Validates the live endpoints of a resolution run.
///
/// # Examples
///
/// ```rust,no_run
/// # #[cfg(feature = "redis")]
/// # fn main() -> rediswire::domain::errors::Result<()> {
/// use rediswire::adapters::RedisProbe;
/// use rediswire::domain::raw::{RawMap, RawValue};
/// use rediswire::service::{VersionGate, WiringLoader};
///
/// let raw = RawValue::Map(RawMap::new());
/// let plan = WiringLoader::new().load(&raw)?;
///
/// let probe = RedisProbe::new();
/// VersionGate::new(&probe).validate_plan(&plan)?;
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "redis"))]
/// # fn main() {}
/// ```
pub struct VersionGate<'a> {
    connector: &'a dyn RedisConnector,
}

impl<'a> VersionGate<'a> {
    /// A gate probing through the given connector.
    pub fn new(connector: &'a dyn RedisConnector) -> Self {
        Self { connector }
    }

    /// Probes every client with `versionCheck` enabled, in
    /// declaration order. The first failure aborts validation.
    pub fn validate(&self, clients: &ResolvedClients) -> Result<()> {
        for client in clients.iter() {
            if !client.config.version_check {
                debug!(client = %client.label(), "version check disabled, skipping");
                continue;
            }
            debug!(
                client = %client.label(),
                endpoint = %client.config.endpoint(),
                "probing endpoint version"
            );
            let mut connection = self.connector.connect(&client.config)?;
            connection.assert_version()?;
            connection.close()?;
        }
        Ok(())
    }

    /// Convenience form of [`validate`](Self::validate) over the
    /// plan's retained client registry.
    pub fn validate_plan(&self, plan: &WiringPlan) -> Result<()> {
        self.validate(plan.clients())
    }
}
