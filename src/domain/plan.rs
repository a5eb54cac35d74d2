// SPDX-License-Identifier: MIT OR Apache-2.0

//! The wiring plan: the fully resolved, ready-to-instantiate
//! description of every service a configuration implies.
//!
//! A [`WiringPlan`] is built once per configuration load, is immutable
//! afterwards, and is consumed by an external instantiation step
//! through the [`ServiceRegistry`](crate::ports::ServiceRegistry)
//! port. Dependencies between services are explicit edges, so any
//! topologically ordered consumer can realize the plan.

use crate::domain::client::{ClientConfig, DebuggerMode};
use crate::domain::errors::Result;
use crate::domain::resolver::ResolvedClients;
use crate::domain::subsystems::{JournalConfig, SessionConfig, StorageConfig};
use crate::ports::ServiceRegistry;
use std::fmt;
use tracing::debug;

/// Identifier of a service in the wiring plan.
///
/// A newtype over the dotted service name (`redis.client`,
/// `redis.cache_storage`, ...), preventing accidental confusion with
/// other strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        ServiceId(s)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        ServiceId(s.to_string())
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which concrete driver binding this build of the crate provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverImpl {
    /// The native driver backed by the compiled-in `redis` adapter.
    Native,
    /// No concrete driver is compiled in; only the interface is bound.
    InterfaceOnly,
}

impl DriverImpl {
    /// The driver implementation available in this build.
    pub fn available() -> Self {
        if cfg!(feature = "redis") {
            DriverImpl::Native
        } else {
            DriverImpl::InterfaceOnly
        }
    }
}

/// A typed post-construction setup call attached to a service entry.
#[derive(Clone, Debug, PartialEq)]
pub enum SetupCall {
    /// Configure the client's distributed-lock duration, in seconds.
    SetLockDuration(u64),
    /// Attach the diagnostics panel with the given id to the client.
    AttachPanel(ServiceId),
    /// Disable write locking on the cache storage.
    DisableLocking,
    /// Set the key namespace prefix of a journal or storage.
    SetPrefix(String),
}

/// Options handed to the runtime's native session machinery.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionHandlerOptions {
    /// The save-handler selector, always `redis`.
    pub save_handler: String,
    /// The encoded save-path describing where and how to connect.
    pub save_path: String,
}

/// What a service entry is, together with its resolved configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceKind {
    /// A Redis client.
    Client {
        /// The client's resolved configuration.
        config: ClientConfig,
    },
    /// A non-autowired alias pinning the promoted default client.
    DefaultClientAlias {
        /// The client entry the alias points at.
        target: ServiceId,
    },
    /// The shared driver abstraction.
    Driver {
        /// Which concrete implementation the driver is bound to.
        implementation: DriverImpl,
    },
    /// The cache-invalidation journal.
    CacheJournal {
        /// The journal's derived configuration.
        config: JournalConfig,
    },
    /// The cache storage.
    CacheStorage {
        /// The storage's derived configuration.
        config: StorageConfig,
    },
    /// A dedicated session handler backed by its own client.
    SessionHandler {
        /// The session's derived configuration.
        config: SessionConfig,
    },
    /// Save-path options for the runtime's native session handler.
    /// An options entry, not an injectable service.
    NativeSessionHandler {
        /// The derived handler options.
        options: SessionHandlerOptions,
    },
    /// A diagnostics panel observing one client.
    DiagnosticsPanel {
        /// False in count-only mode, true for the full panel.
        render_full: bool,
        /// The observed client's display label.
        label: String,
    },
}

/// One service in the wiring plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceEntry {
    /// The service identifier.
    pub id: ServiceId,
    /// What the service is, with its resolved configuration.
    pub kind: ServiceKind,
    /// Services this entry depends on.
    pub depends_on: Vec<ServiceId>,
    /// Whether the service is visible to autowiring.
    pub autowired: bool,
    /// Tags attached to the service.
    pub tags: Vec<String>,
    /// Post-construction setup calls, in order.
    pub setup: Vec<SetupCall>,
}

/// The fully resolved wiring plan.
///
/// Owns its service entries exclusively and retains the resolved
/// client registry for the pre-flight version gate.
#[derive(Clone, Debug, PartialEq)]
pub struct WiringPlan {
    services: Vec<ServiceEntry>,
    clients: ResolvedClients,
}

impl WiringPlan {
    /// The plan's service entries, in emission order.
    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    /// The resolved client registry the plan was built from.
    pub fn clients(&self) -> &ResolvedClients {
        &self.clients
    }

    /// Looks up a service entry by id.
    pub fn get(&self, id: &str) -> Option<&ServiceEntry> {
        self.services.iter().find(|entry| entry.id.as_str() == id)
    }

    /// Feeds every entry, in plan order, to the registry port.
    pub fn apply(&self, registry: &mut dyn ServiceRegistry) -> Result<()> {
        for entry in &self.services {
            registry.register(entry)?;
        }
        Ok(())
    }
}

/// Assembles a [`WiringPlan`] from resolved clients and derived
/// subsystem configurations.
///
/// # Examples
///
/// ```
/// use rediswire::domain::plan::PlanBuilder;
/// use rediswire::domain::resolver::{ClientDefinition, ClientResolver};
///
/// let clients = ClientResolver::new()
///     .resolve_all(ClientDefinition::default(), [])
///     .unwrap();
/// let plan = PlanBuilder::new().build(clients, None, None, None);
/// assert!(plan.get("redis.client").is_some());
/// assert!(plan.get("redis.driver").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct PlanBuilder {
    namespace: String,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            namespace: "redis".to_string(),
        }
    }
}

impl PlanBuilder {
    /// A builder using the standard `redis` service-id namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with a custom service-id namespace.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn prefixed(&self, name: &str) -> ServiceId {
        ServiceId(format!("{}.{}", self.namespace, name))
    }

    fn client_id(&self, name: Option<&str>) -> ServiceId {
        match name {
            Some(name) => self.prefixed(&format!("{}_client", name)),
            None => self.prefixed("client"),
        }
    }

    /// Builds the plan.
    ///
    /// Emission order: every resolved client in declaration order
    /// (each directly followed by its default-client alias and
    /// diagnostics panel where applicable), the shared driver, then
    /// the enabled subsystems.
    pub fn build(
        &self,
        clients: ResolvedClients,
        journal: Option<JournalConfig>,
        storage: Option<StorageConfig>,
        session: Option<SessionConfig>,
    ) -> WiringPlan {
        let mut services: Vec<ServiceEntry> = Vec::new();
        let default_id = self.client_id(clients.default_client().name.as_deref());

        for client in clients.iter() {
            let id = self.client_id(client.name.as_deref());
            let mut setup = vec![SetupCall::SetLockDuration(client.config.lock_duration)];
            let panel = client.config.debugger.is_enabled().then(|| {
                let panel_id = ServiceId(format!("{}.panel", id));
                setup.push(SetupCall::AttachPanel(panel_id.clone()));
                ServiceEntry {
                    id: panel_id,
                    kind: ServiceKind::DiagnosticsPanel {
                        render_full: client.config.debugger != DebuggerMode::CountOnly,
                        label: client.label().to_string(),
                    },
                    depends_on: vec![id.clone()],
                    autowired: false,
                    tags: Vec::new(),
                    setup: Vec::new(),
                }
            });

            services.push(ServiceEntry {
                id: id.clone(),
                kind: ServiceKind::Client {
                    config: client.config.clone(),
                },
                depends_on: Vec::new(),
                autowired: client.default,
                tags: vec![format!("{}.client", self.namespace)],
                setup,
            });

            if client.default {
                services.push(ServiceEntry {
                    id: self.prefixed("default_client"),
                    kind: ServiceKind::DefaultClientAlias { target: id.clone() },
                    depends_on: vec![id.clone()],
                    autowired: false,
                    tags: Vec::new(),
                    setup: Vec::new(),
                });
            }
            if let Some(panel) = panel {
                services.push(panel);
            }
        }

        services.push(ServiceEntry {
            id: self.prefixed("driver"),
            kind: ServiceKind::Driver {
                implementation: DriverImpl::available(),
            },
            depends_on: vec![default_id.clone()],
            autowired: true,
            tags: Vec::new(),
            setup: Vec::new(),
        });

        if let Some(journal) = journal {
            let mut setup = Vec::new();
            if let Some(prefix) = &journal.prefix {
                setup.push(SetupCall::SetPrefix(prefix.clone()));
            }
            services.push(ServiceEntry {
                id: self.prefixed("cache_journal"),
                kind: ServiceKind::CacheJournal { config: journal },
                depends_on: vec![default_id.clone()],
                autowired: true,
                tags: Vec::new(),
                setup,
            });
        }

        if let Some(storage) = storage {
            let mut setup = Vec::new();
            if !storage.locks {
                setup.push(SetupCall::DisableLocking);
            }
            if let Some(prefix) = &storage.prefix {
                setup.push(SetupCall::SetPrefix(prefix.clone()));
            }
            services.push(ServiceEntry {
                id: self.prefixed("cache_storage"),
                kind: ServiceKind::CacheStorage { config: storage },
                depends_on: vec![default_id.clone()],
                autowired: true,
                tags: Vec::new(),
                setup,
            });
        }

        if let Some(session) = session {
            if session.native {
                let options = SessionHandlerOptions {
                    save_handler: "redis".to_string(),
                    // Present whenever the session is native.
                    save_path: session.save_path().unwrap_or_default().to_string(),
                };
                services.push(ServiceEntry {
                    id: self.prefixed("session"),
                    kind: ServiceKind::NativeSessionHandler { options },
                    depends_on: Vec::new(),
                    autowired: false,
                    tags: Vec::new(),
                    setup: Vec::new(),
                });
            } else {
                let client_id = self.prefixed("session_handler_client");
                services.push(ServiceEntry {
                    id: client_id.clone(),
                    kind: ServiceKind::Client {
                        config: session.client_config(),
                    },
                    depends_on: Vec::new(),
                    autowired: false,
                    tags: Vec::new(),
                    setup: vec![SetupCall::SetLockDuration(session.lock_duration)],
                });
                services.push(ServiceEntry {
                    id: self.prefixed("session_handler"),
                    kind: ServiceKind::SessionHandler { config: session },
                    depends_on: vec![client_id],
                    autowired: true,
                    tags: Vec::new(),
                    setup: Vec::new(),
                });
            }
        }

        debug!(services = services.len(), "wiring plan assembled");
        WiringPlan { services, clients }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw::RawValue;
    use crate::domain::resolver::{ClientDefinition, ClientResolver};
    use crate::domain::subsystems::SubsystemSetting;

    fn resolve(
        root: &[(&str, RawValue)],
        named: &[(&str, &[(&str, RawValue)])],
    ) -> ResolvedClients {
        let root = ClientDefinition::new(root.iter().cloned().collect());
        let named: Vec<(String, ClientDefinition)> = named
            .iter()
            .map(|(name, entries)| {
                (
                    name.to_string(),
                    ClientDefinition::new(entries.iter().cloned().collect()),
                )
            })
            .collect();
        ClientResolver::new().resolve_all(root, named).unwrap()
    }

    fn session(entries: &[(&str, RawValue)]) -> SessionConfig {
        let setting = SubsystemSetting::Overrides(entries.iter().cloned().collect());
        SessionConfig::derive(&ClientConfig::default().normalize(), &setting)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_minimal_plan_entries() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, None);
        let ids: Vec<&str> = plan.services().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["redis.client", "redis.default_client", "redis.driver"]);
    }

    #[test]
    fn test_client_entries_tagged_and_flagged() {
        let plan = PlanBuilder::new().build(resolve(&[], &[("cache", &[])]), None, None, None);
        let root = plan.get("redis.client").unwrap();
        assert!(root.autowired);
        assert_eq!(root.tags, vec!["redis.client".to_string()]);
        assert_eq!(root.setup, vec![SetupCall::SetLockDuration(15)]);

        let cache = plan.get("redis.cache_client").unwrap();
        assert!(!cache.autowired);
        assert_eq!(cache.tags, vec!["redis.client".to_string()]);
    }

    #[test]
    fn test_exactly_one_autowired_client() {
        let plan = PlanBuilder::new().build(
            resolve(&[], &[("a", &[]), ("b", &[])]),
            None,
            None,
            None,
        );
        let autowired_clients = plan
            .services()
            .iter()
            .filter(|e| matches!(e.kind, ServiceKind::Client { .. }) && e.autowired)
            .count();
        assert_eq!(autowired_clients, 1);
    }

    #[test]
    fn test_default_client_alias_points_at_root() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, None);
        let alias = plan.get("redis.default_client").unwrap();
        assert!(!alias.autowired);
        match &alias.kind {
            ServiceKind::DefaultClientAlias { target } => {
                assert_eq!(target.as_str(), "redis.client");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_driver_depends_on_default_client() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, None);
        let driver = plan.get("redis.driver").unwrap();
        assert_eq!(driver.depends_on, vec![ServiceId::from("redis.client")]);
    }

    #[test]
    fn test_journal_and_storage_entries() {
        let plan = PlanBuilder::new().build(
            resolve(&[], &[]),
            Some(JournalConfig {
                prefix: Some("j:".to_string()),
            }),
            Some(StorageConfig {
                locks: false,
                prefix: None,
            }),
            None,
        );
        let journal = plan.get("redis.cache_journal").unwrap();
        assert_eq!(journal.setup, vec![SetupCall::SetPrefix("j:".to_string())]);
        assert_eq!(journal.depends_on, vec![ServiceId::from("redis.client")]);

        let storage = plan.get("redis.cache_storage").unwrap();
        assert_eq!(storage.setup, vec![SetupCall::DisableLocking]);
    }

    #[test]
    fn test_disabled_subsystems_have_no_entries() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, None);
        assert!(plan.get("redis.cache_journal").is_none());
        assert!(plan.get("redis.cache_storage").is_none());
        assert!(plan.get("redis.session").is_none());
        assert!(plan.get("redis.session_handler").is_none());
    }

    #[test]
    fn test_native_session_entry_carries_save_path() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, Some(session(&[])));
        let entry = plan.get("redis.session").unwrap();
        match &entry.kind {
            ServiceKind::NativeSessionHandler { options } => {
                assert_eq!(options.save_handler, "redis");
                assert_eq!(options.save_path, "tcp://127.0.0.1:6379");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
        assert!(plan.get("redis.session_handler").is_none());
    }

    #[test]
    fn test_non_native_session_wires_dedicated_client() {
        let plan = PlanBuilder::new().build(
            resolve(&[], &[]),
            None,
            None,
            Some(session(&[("native", RawValue::Bool(false))])),
        );
        assert!(plan.get("redis.session").is_none());

        let client = plan.get("redis.session_handler_client").unwrap();
        assert!(!client.autowired);
        assert!(matches!(client.kind, ServiceKind::Client { .. }));

        let handler = plan.get("redis.session_handler").unwrap();
        assert_eq!(
            handler.depends_on,
            vec![ServiceId::from("redis.session_handler_client")]
        );
    }

    #[test]
    fn test_debugger_adds_panel_entry() {
        let plan = PlanBuilder::new().build(
            resolve(&[("debugger", RawValue::Bool(true))], &[]),
            None,
            None,
            None,
        );
        let panel = plan.get("redis.client.panel").unwrap();
        match &panel.kind {
            ServiceKind::DiagnosticsPanel { render_full, label } => {
                assert!(*render_full);
                assert_eq!(label, "default");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
        assert_eq!(panel.depends_on, vec![ServiceId::from("redis.client")]);

        let client = plan.get("redis.client").unwrap();
        assert!(client
            .setup
            .contains(&SetupCall::AttachPanel(ServiceId::from("redis.client.panel"))));
    }

    #[test]
    fn test_count_mode_panel_renders_count_only() {
        let plan = PlanBuilder::new().build(
            resolve(&[], &[("cache", &[("debugger", RawValue::from("count"))])]),
            None,
            None,
            None,
        );
        let panel = plan.get("redis.cache_client.panel").unwrap();
        match &panel.kind {
            ServiceKind::DiagnosticsPanel { render_full, label } => {
                assert!(!render_full);
                assert_eq!(label, "cache");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_disabled_debugger_adds_no_panel() {
        let plan = PlanBuilder::new().build(resolve(&[], &[]), None, None, None);
        assert!(plan.get("redis.client.panel").is_none());
    }

    #[test]
    fn test_custom_namespace() {
        let plan =
            PlanBuilder::with_namespace("cachewire").build(resolve(&[], &[]), None, None, None);
        assert!(plan.get("cachewire.client").is_some());
        assert!(plan.get("cachewire.driver").is_some());
    }

    #[test]
    fn test_apply_delivers_entries_in_order() {
        struct Recording(Vec<String>);
        impl ServiceRegistry for Recording {
            fn register(&mut self, entry: &ServiceEntry) -> Result<()> {
                self.0.push(entry.id.as_str().to_string());
                Ok(())
            }
        }

        let plan = PlanBuilder::new().build(resolve(&[], &[("cache", &[])]), None, None, None);
        let mut registry = Recording(Vec::new());
        plan.apply(&mut registry).unwrap();
        let expected: Vec<String> = plan
            .services()
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect();
        assert_eq!(registry.0, expected);
    }

    #[test]
    fn test_driver_impl_matches_build_features() {
        let expected = if cfg!(feature = "redis") {
            DriverImpl::Native
        } else {
            DriverImpl::InterfaceOnly
        };
        assert_eq!(DriverImpl::available(), expected);
    }
}
