// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of the full set of named client configurations.
//!
//! The resolver walks client definitions in declaration order (the
//! anonymous root first), applies inheritance through the typed parent
//! reference, merges multi-level defaults, and promotes exactly one
//! client to be the default/autowired instance.

use crate::domain::client::ClientConfig;
use crate::domain::errors::{Result, WiringError};
use crate::domain::raw::{merge_maps, take_parent, RawMap};
use tracing::debug;

/// The alias under which the promoted default client can be referenced
/// as a parent, regardless of its declared name.
pub const DEFAULT_CLIENT_ALIAS: &str = "default";

/// A second accepted alias for the default client, matching configs
/// that refer to the anonymous root block as `root`.
pub const ROOT_CLIENT_ALIAS: &str = "root";

/// A typed, not-yet-resolved client definition.
///
/// This is the redesigned form of the raw config block: the reserved
/// inheritance directive is an explicit optional field instead of a
/// magic key inside the override map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientDefinition {
    /// Name of the already-resolved client this one inherits from.
    pub parent: Option<String>,
    /// The client's own raw overrides.
    pub overrides: RawMap,
}

impl ClientDefinition {
    /// A definition with no parent reference.
    pub fn new(overrides: RawMap) -> Self {
        Self {
            parent: None,
            overrides,
        }
    }

    /// A definition inheriting from a named parent.
    pub fn with_parent(parent: impl Into<String>, overrides: RawMap) -> Self {
        Self {
            parent: Some(parent.into()),
            overrides,
        }
    }

    /// Builds a definition from a raw config block, extracting the
    /// reserved `extends` directive so it is not treated as a literal
    /// configuration key.
    pub fn from_raw(mut overrides: RawMap) -> Result<Self> {
        let parent = take_parent(&mut overrides)?;
        Ok(Self { parent, overrides })
    }
}

/// One fully resolved client.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedClient {
    /// The client's declared name; `None` for the anonymous root.
    pub name: Option<String>,
    /// The resolved, normalized configuration.
    pub config: ClientConfig,
    /// Whether this is the promoted default/autowired client.
    pub default: bool,
}

impl ResolvedClient {
    /// Display label for logs, panels, and error messages.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_CLIENT_ALIAS)
    }
}

/// The declaration-ordered table of resolved clients.
///
/// Exactly one entry is the default client: the first one resolved
/// whose slot was not already claimed. Re-resolving a name replaces the
/// entry in place, keeping its position and its default designation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedClients {
    entries: Vec<ResolvedClient>,
    default_index: usize,
}

impl ResolvedClients {
    /// Number of resolved clients.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no clients were resolved. The resolver never
    /// produces an empty table (the root is always present).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates clients in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedClient> {
        self.entries.iter()
    }

    /// Looks up a client by name (`None` for the anonymous root).
    pub fn get(&self, name: Option<&str>) -> Option<&ResolvedClient> {
        self.entries
            .iter()
            .find(|entry| entry.name.as_deref() == name)
    }

    /// The promoted default client.
    pub fn default_client(&self) -> &ResolvedClient {
        &self.entries[self.default_index]
    }
}

/// Resolves raw client definitions into [`ResolvedClients`].
///
/// # Examples
///
/// ```
/// use rediswire::domain::raw::{RawMap, RawValue};
/// use rediswire::domain::resolver::{ClientDefinition, ClientResolver};
///
/// let root = ClientDefinition::new(RawMap::from_iter([(
///     "host",
///     RawValue::from("127.0.0.1"),
/// )]));
/// let cache = ClientDefinition::with_parent(
///     "root",
///     RawMap::from_iter([("host", RawValue::from("10.0.0.5"))]),
/// );
///
/// let resolved = ClientResolver::new()
///     .resolve_all(root, [("cache".to_string(), cache)])
///     .unwrap();
/// assert_eq!(resolved.len(), 2);
/// assert!(resolved.default_client().default);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientResolver {
    defaults: ClientConfig,
}

impl ClientResolver {
    /// A resolver using the standard client defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver with caller-supplied base defaults.
    pub fn with_defaults(defaults: ClientConfig) -> Self {
        Self { defaults }
    }

    /// Resolves the anonymous root followed by every named client, in
    /// declaration order.
    ///
    /// Any error is fatal to the whole run; no partial table is ever
    /// returned.
    pub fn resolve_all(
        &self,
        root: ClientDefinition,
        named: impl IntoIterator<Item = (String, ClientDefinition)>,
    ) -> Result<ResolvedClients> {
        let mut entries: Vec<ResolvedClient> = Vec::new();
        let mut default_index: Option<usize> = None;

        self.resolve_one(&mut entries, &mut default_index, None, root)?;
        for (name, definition) in named {
            self.resolve_one(&mut entries, &mut default_index, Some(name), definition)?;
        }

        // The root is resolved unconditionally, so an index exists.
        let default_index = default_index.unwrap_or(0);
        Ok(ResolvedClients {
            entries,
            default_index,
        })
    }

    fn resolve_one(
        &self,
        entries: &mut Vec<ResolvedClient>,
        default_index: &mut Option<usize>,
        name: Option<String>,
        definition: ClientDefinition,
    ) -> Result<()> {
        let label = name.as_deref().unwrap_or(DEFAULT_CLIENT_ALIAS).to_string();
        let defaults_raw = self.defaults.to_raw();

        let effective_defaults = match &definition.parent {
            Some(parent_name) => {
                let parent = lookup_parent(entries, *default_index, parent_name).ok_or_else(
                    || WiringError::UnknownParent {
                        client: label.clone(),
                        parent: parent_name.clone(),
                    },
                )?;
                merge_maps(&parent.config.to_raw(), &defaults_raw)?
            }
            None => defaults_raw,
        };

        let merged = merge_maps(&definition.overrides, &effective_defaults)?;
        let config = ClientConfig::from_raw(&merged)?;

        debug!(
            client = %label,
            parent = definition.parent.as_deref().unwrap_or("-"),
            endpoint = %config.endpoint(),
            "resolved client configuration"
        );

        match entries
            .iter()
            .position(|entry| entry.name == name)
        {
            // Last writer wins; the slot keeps its position and its
            // default designation.
            Some(index) => {
                let default = entries[index].default;
                entries[index] = ResolvedClient {
                    name,
                    config,
                    default,
                };
            }
            None => {
                let default = default_index.is_none();
                if default {
                    *default_index = Some(entries.len());
                }
                entries.push(ResolvedClient {
                    name,
                    config,
                    default,
                });
            }
        }
        Ok(())
    }
}

/// Parent lookup over the already-resolved entries. Named entries take
/// precedence; the `default`/`root` aliases fall back to the promoted
/// default client.
fn lookup_parent<'a>(
    entries: &'a [ResolvedClient],
    default_index: Option<usize>,
    parent: &str,
) -> Option<&'a ResolvedClient> {
    if let Some(entry) = entries.iter().find(|e| e.name.as_deref() == Some(parent)) {
        return Some(entry);
    }
    if parent == DEFAULT_CLIENT_ALIAS || parent == ROOT_CLIENT_ALIAS {
        return default_index.and_then(|i| entries.get(i));
    }
    None
}
