// SPDX-License-Identifier: MIT OR Apache-2.0

//! The loader orchestrating a full configuration resolution.
//!
//! This is the entry point most callers want: it takes the raw
//! top-level configuration mapping and runs the whole pipeline —
//! subsystem toggles, client resolution with inheritance, subsystem
//! derivation from the default client, and plan assembly.

use crate::domain::client::ClientConfig;
use crate::domain::errors::{Result, WiringError};
use crate::domain::plan::{PlanBuilder, WiringPlan};
use crate::domain::raw::{RawMap, RawValue};
use crate::domain::resolver::{ClientDefinition, ClientResolver};
use crate::domain::subsystems::{JournalConfig, SessionConfig, StorageConfig, SubsystemSetting};
use tracing::debug;

/// Resolves raw configuration into a [`WiringPlan`].
///
/// The top-level mapping may carry the subsystem toggles (`journal`,
/// `storage`, `session`), the named-client map (`clients`), and any
/// client-level keys, which form the anonymous root client.
///
/// # Examples
///
/// ```
/// use rediswire::domain::raw::{RawMap, RawValue};
/// use rediswire::service::WiringLoader;
///
/// let raw = RawValue::Map(RawMap::from_iter([
///     ("host", RawValue::from("127.0.0.1")),
///     ("session", RawValue::Bool(true)),
/// ]));
/// let plan = WiringLoader::new().load(&raw).unwrap();
/// assert!(plan.get("redis.session").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct WiringLoader {
    client_defaults: ClientConfig,
    namespace: String,
}

impl Default for WiringLoader {
    fn default() -> Self {
        Self {
            client_defaults: ClientConfig::default(),
            namespace: "redis".to_string(),
        }
    }
}

impl WiringLoader {
    /// A loader with the standard client defaults and the `redis`
    /// service-id namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base client defaults merged under every client.
    pub fn with_client_defaults(mut self, defaults: ClientConfig) -> Self {
        self.client_defaults = defaults;
        self
    }

    /// Replaces the service-id namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Runs the full resolution pipeline on a raw configuration
    /// mapping.
    ///
    /// Any error is fatal: no partial plan is ever produced.
    pub fn load(&self, raw: &RawValue) -> Result<WiringPlan> {
        let mut root = match raw {
            RawValue::Map(map) => map.clone(),
            RawValue::Null => RawMap::new(),
            other => {
                return Err(WiringError::malformed(
                    "",
                    format!("expected a configuration mapping, found a {}", other.type_name()),
                ))
            }
        };

        let journal_setting = SubsystemSetting::from_raw("journal", root.remove("journal").as_ref())?;
        let storage_setting = SubsystemSetting::from_raw("storage", root.remove("storage").as_ref())?;
        let session_setting = SubsystemSetting::from_raw("session", root.remove("session").as_ref())?;
        let named = named_definitions(root.remove("clients"))?;

        // Whatever remains at the top level is the anonymous root client.
        let root_definition = ClientDefinition::from_raw(root)?;

        let resolved = ClientResolver::with_defaults(self.client_defaults.clone())
            .resolve_all(root_definition, named)?;
        debug!(clients = resolved.len(), "client resolution finished");

        let default_config = resolved.default_client().config.clone();
        let journal = JournalConfig::derive(&journal_setting)?;
        let storage = StorageConfig::derive(&storage_setting)?;
        let session = SessionConfig::derive(&default_config, &session_setting)?;

        Ok(PlanBuilder::with_namespace(self.namespace.clone())
            .build(resolved, journal, storage, session))
    }

    /// Parses YAML text and runs [`load`](Self::load) on the result.
    #[cfg(feature = "yaml")]
    pub fn load_yaml_str(&self, text: &str) -> Result<WiringPlan> {
        let raw = crate::adapters::yaml::from_yaml_str(text)?;
        self.load(&raw)
    }
}

fn named_definitions(clients: Option<RawValue>) -> Result<Vec<(String, ClientDefinition)>> {
    let map = match clients {
        None | Some(RawValue::Null) => return Ok(Vec::new()),
        Some(RawValue::Map(map)) => map,
        Some(other) => {
            return Err(WiringError::malformed(
                "clients",
                format!("expected a mapping of client configs, found a {}", other.type_name()),
            ))
        }
    };

    let mut definitions = Vec::with_capacity(map.len());
    for (name, value) in map.iter() {
        let overrides = match value {
            RawValue::Map(overrides) => overrides.clone(),
            RawValue::Null => RawMap::new(),
            other => {
                return Err(WiringError::malformed(
                    format!("clients.{}", name),
                    format!("expected a client config mapping, found a {}", other.type_name()),
                ))
            }
        };
        definitions.push((name.to_string(), ClientDefinition::from_raw(overrides)?));
    }
    Ok(definitions)
}
