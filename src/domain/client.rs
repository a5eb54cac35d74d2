// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resolved per-client configuration record.
//!
//! This module provides [`ClientConfig`], the flat, typed record a raw
//! client config resolves into, together with host/port normalization
//! and the schema restriction that silently drops unknown keys after a
//! merge.

use crate::domain::errors::{Result, WiringError};
use crate::domain::raw::{RawMap, RawValue};
use serde::{Deserialize, Serialize};

/// The standard Redis TCP port, substituted when a non-socket host has
/// no usable port configured.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Diagnostics panel mode for a client.
///
/// Parsed from the raw `debugger` value, which may be a boolean, a
/// string, or null. The string `"count"` selects the count-only
/// rendering; any other truthy value renders the full panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebuggerMode {
    /// No diagnostics panel is wired for this client.
    #[default]
    Disabled,
    /// A full diagnostics panel is wired.
    Full,
    /// A panel is wired but renders only the command count.
    CountOnly,
}

/// The sentinel `debugger` value selecting count-only panel rendering.
pub const PANEL_COUNT_MODE: &str = "count";

impl DebuggerMode {
    /// Parses a raw `debugger` value.
    ///
    /// Follows scalar truthiness: null, `false`, `0`, `0.0` and the
    /// empty string disable the panel; the [`PANEL_COUNT_MODE`] string
    /// selects count-only mode; every other scalar enables the full
    /// panel. Mappings are malformed here.
    pub fn from_raw(value: &RawValue) -> Result<Self> {
        match value {
            RawValue::Null | RawValue::Bool(false) => Ok(DebuggerMode::Disabled),
            RawValue::Bool(true) => Ok(DebuggerMode::Full),
            RawValue::Int(0) => Ok(DebuggerMode::Disabled),
            RawValue::Int(_) => Ok(DebuggerMode::Full),
            RawValue::Float(f) if *f == 0.0 => Ok(DebuggerMode::Disabled),
            RawValue::Float(_) => Ok(DebuggerMode::Full),
            RawValue::Str(s) if s.is_empty() => Ok(DebuggerMode::Disabled),
            RawValue::Str(s) if s == PANEL_COUNT_MODE => Ok(DebuggerMode::CountOnly),
            RawValue::Str(_) => Ok(DebuggerMode::Full),
            RawValue::Map(_) => Err(WiringError::malformed(
                "debugger",
                "expected a boolean or string, found a mapping",
            )),
        }
    }

    /// Returns true unless the panel is disabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DebuggerMode::Disabled)
    }

    fn to_raw(self) -> RawValue {
        match self {
            DebuggerMode::Disabled => RawValue::Bool(false),
            DebuggerMode::Full => RawValue::Bool(true),
            DebuggerMode::CountOnly => RawValue::Str(PANEL_COUNT_MODE.to_string()),
        }
    }
}

/// A fully resolved client configuration.
///
/// Invariant (after [`normalize`](ClientConfig::normalize)): a
/// socket-style host (one starting with `/`) always has `port == None`;
/// any other host carries `Some(port)`, with [`DEFAULT_REDIS_PORT`]
/// substituted for an unset or zero port.
///
/// # Examples
///
/// ```
/// use rediswire::domain::client::ClientConfig;
///
/// let config = ClientConfig::default().normalize();
/// assert_eq!(config.host, "127.0.0.1");
/// assert_eq!(config.port, Some(6379));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Hostname, IP address, or filesystem path of a Unix domain socket.
    pub host: String,
    /// TCP port; `None` for socket-style hosts.
    pub port: Option<u16>,
    /// Connection and command timeout, in seconds.
    pub timeout: u64,
    /// Redis database index selected after connecting.
    pub database: i64,
    /// Password sent on connect, if the server requires one.
    pub auth: Option<String>,
    /// Duration of the client's distributed locks, in seconds.
    pub lock_duration: u64,
    /// Diagnostics panel mode.
    pub debugger: DebuggerMode,
    /// Whether the version gate probes this client's endpoint.
    pub version_check: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            timeout: 10,
            database: 0,
            auth: None,
            lock_duration: 15,
            debugger: DebuggerMode::Disabled,
            version_check: true,
        }
    }
}

impl ClientConfig {
    /// Fixes up host/port semantics.
    ///
    /// Socket paths have no ports, so a `/`-prefixed host forces
    /// `port = None`. Otherwise an unset or zero port becomes
    /// [`DEFAULT_REDIS_PORT`]. Total and pure; never fails.
    pub fn normalize(mut self) -> Self {
        if self.is_socket() {
            self.port = None;
        } else if self.port.unwrap_or(0) == 0 {
            self.port = Some(DEFAULT_REDIS_PORT);
        }
        self
    }

    /// Returns true when the host denotes a Unix domain socket path.
    pub fn is_socket(&self) -> bool {
        self.host.starts_with('/')
    }

    /// A display form of the endpoint, for logs and error messages.
    pub fn endpoint(&self) -> String {
        if self.is_socket() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port.unwrap_or(DEFAULT_REDIS_PORT))
        }
    }

    /// Builds a config from a merged raw map, restricting it to the
    /// known schema and normalizing the result.
    ///
    /// Unknown keys are silently dropped. A known key holding an
    /// uncoercible value fails with [`WiringError::MalformedConfig`].
    pub fn from_raw(map: &RawMap) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = map.get("host") {
            config.host = expect_string("host", value)?;
        }
        if let Some(value) = map.get("port") {
            config.port = expect_port("port", value)?;
        }
        if let Some(value) = map.get("timeout") {
            config.timeout = expect_seconds("timeout", value)?;
        }
        if let Some(value) = map.get("database") {
            config.database = expect_int("database", value)?;
        }
        if let Some(value) = map.get("auth") {
            config.auth = expect_optional_string("auth", value)?;
        }
        if let Some(value) = map.get("lockDuration") {
            config.lock_duration = expect_seconds("lockDuration", value)?;
        }
        if let Some(value) = map.get("debugger") {
            config.debugger = DebuggerMode::from_raw(value)?;
        }
        if let Some(value) = map.get("versionCheck") {
            config.version_check = expect_bool("versionCheck", value)?;
        }
        Ok(config.normalize())
    }

    /// The raw-map form of this config, used when a resolved client
    /// serves as the parent of a later one.
    pub fn to_raw(&self) -> RawMap {
        let mut map = RawMap::new();
        map.insert("host", RawValue::Str(self.host.clone()));
        map.insert(
            "port",
            match self.port {
                Some(port) => RawValue::Int(i64::from(port)),
                None => RawValue::Null,
            },
        );
        map.insert("timeout", RawValue::Int(self.timeout as i64));
        map.insert("database", RawValue::Int(self.database));
        map.insert(
            "auth",
            match &self.auth {
                Some(auth) => RawValue::Str(auth.clone()),
                None => RawValue::Null,
            },
        );
        map.insert("lockDuration", RawValue::Int(self.lock_duration as i64));
        map.insert("debugger", self.debugger.to_raw());
        map.insert("versionCheck", RawValue::Bool(self.version_check));
        map
    }
}

pub(crate) fn expect_string(key: &str, value: &RawValue) -> Result<String> {
    match value {
        RawValue::Str(s) => Ok(s.clone()),
        other => Err(WiringError::malformed(
            key,
            format!("expected a string, found a {}", other.type_name()),
        )),
    }
}

pub(crate) fn expect_optional_string(key: &str, value: &RawValue) -> Result<Option<String>> {
    match value {
        RawValue::Null => Ok(None),
        RawValue::Str(s) => Ok(Some(s.clone())),
        other => Err(WiringError::malformed(
            key,
            format!("expected a string or null, found a {}", other.type_name()),
        )),
    }
}

pub(crate) fn expect_int(key: &str, value: &RawValue) -> Result<i64> {
    match value {
        RawValue::Int(i) => Ok(*i),
        other => Err(WiringError::malformed(
            key,
            format!("expected an integer, found a {}", other.type_name()),
        )),
    }
}

pub(crate) fn expect_seconds(key: &str, value: &RawValue) -> Result<u64> {
    match value {
        RawValue::Int(i) if *i >= 0 => Ok(*i as u64),
        RawValue::Int(_) => Err(WiringError::malformed(key, "seconds must not be negative")),
        other => Err(WiringError::malformed(
            key,
            format!("expected whole seconds, found a {}", other.type_name()),
        )),
    }
}

pub(crate) fn expect_port(key: &str, value: &RawValue) -> Result<Option<u16>> {
    match value {
        RawValue::Null => Ok(None),
        RawValue::Int(i) if (0..=i64::from(u16::MAX)).contains(i) => Ok(Some(*i as u16)),
        RawValue::Int(i) => Err(WiringError::malformed(
            key,
            format!("port {} out of range", i),
        )),
        other => Err(WiringError::malformed(
            key,
            format!("expected a port number or null, found a {}", other.type_name()),
        )),
    }
}

pub(crate) fn expect_bool(key: &str, value: &RawValue) -> Result<bool> {
    match value {
        RawValue::Bool(b) => Ok(*b),
        other => Err(WiringError::malformed(
            key,
            format!("expected a boolean, found a {}", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_socket_host_clears_port() {
        let config = ClientConfig {
            host: "/tmp/redis.sock".to_string(),
            port: Some(6379),
            ..ClientConfig::default()
        };
        assert_eq!(config.normalize().port, None);
    }

    #[test]
    fn test_normalize_unset_port_gets_default() {
        let config = ClientConfig::default().normalize();
        assert_eq!(config.port, Some(DEFAULT_REDIS_PORT));
    }

    #[test]
    fn test_normalize_zero_port_gets_default() {
        let config = ClientConfig {
            port: Some(0),
            ..ClientConfig::default()
        };
        assert_eq!(config.normalize().port, Some(DEFAULT_REDIS_PORT));
    }

    #[test]
    fn test_normalize_valid_config_unchanged() {
        let config = ClientConfig {
            host: "10.0.0.5".to_string(),
            port: Some(6380),
            ..ClientConfig::default()
        };
        let normalized = config.clone().normalize();
        assert_eq!(normalized, config);
    }

    #[test]
    fn test_from_raw_drops_unknown_keys() {
        let mut map = RawMap::new();
        map.insert("host", RawValue::from("10.0.0.5"));
        map.insert("flavor", RawValue::from("unknown"));
        let config = ClientConfig::from_raw(&map).unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, Some(DEFAULT_REDIS_PORT));
    }

    #[test]
    fn test_from_raw_applies_defaults_for_missing_keys() {
        let config = ClientConfig::from_raw(&RawMap::new()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.timeout, 10);
        assert_eq!(config.database, 0);
        assert_eq!(config.lock_duration, 15);
        assert!(config.version_check);
        assert_eq!(config.debugger, DebuggerMode::Disabled);
    }

    #[test]
    fn test_from_raw_rejects_bad_types() {
        let mut map = RawMap::new();
        map.insert("timeout", RawValue::from("soon"));
        assert!(matches!(
            ClientConfig::from_raw(&map),
            Err(WiringError::MalformedConfig { .. })
        ));

        let mut map = RawMap::new();
        map.insert("port", RawValue::from(70000));
        assert!(ClientConfig::from_raw(&map).is_err());

        let mut map = RawMap::new();
        map.insert("versionCheck", RawValue::from("yes"));
        assert!(ClientConfig::from_raw(&map).is_err());
    }

    #[test]
    fn test_from_raw_negative_seconds_rejected() {
        let mut map = RawMap::new();
        map.insert("lockDuration", RawValue::from(-1));
        assert!(ClientConfig::from_raw(&map).is_err());
    }

    #[test]
    fn test_debugger_modes() {
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::Null).unwrap(),
            DebuggerMode::Disabled
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::Bool(false)).unwrap(),
            DebuggerMode::Disabled
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::Bool(true)).unwrap(),
            DebuggerMode::Full
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::from("count")).unwrap(),
            DebuggerMode::CountOnly
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::from("file")).unwrap(),
            DebuggerMode::Full
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::from("")).unwrap(),
            DebuggerMode::Disabled
        );
        assert_eq!(
            DebuggerMode::from_raw(&RawValue::from(0)).unwrap(),
            DebuggerMode::Disabled
        );
        assert!(DebuggerMode::from_raw(&RawValue::Map(RawMap::new())).is_err());
    }

    #[test]
    fn test_raw_round_trip() {
        let config = ClientConfig {
            host: "10.0.0.5".to_string(),
            port: Some(6380),
            timeout: 3,
            database: 2,
            auth: Some("secret".to_string()),
            lock_duration: 30,
            debugger: DebuggerMode::CountOnly,
            version_check: false,
        };
        let round = ClientConfig::from_raw(&config.to_raw()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn test_endpoint_display() {
        let tcp = ClientConfig::default().normalize();
        assert_eq!(tcp.endpoint(), "127.0.0.1:6379");

        let socket = ClientConfig {
            host: "/var/run/redis.sock".to_string(),
            ..ClientConfig::default()
        }
        .normalize();
        assert_eq!(socket.endpoint(), "/var/run/redis.sock");
    }
}
