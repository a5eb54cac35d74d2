// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derivation of dependent subsystem configurations.
//!
//! The cache-invalidation journal, the cache storage, and the HTTP
//! session handler each derive their configuration by merging
//! subsystem-specific overrides on top of subsystem defaults, which in
//! turn start from the default client's resolved fields. A disabled
//! subsystem derives nothing; that is absence, not an error.

use crate::domain::client::{
    expect_bool, expect_int, expect_optional_string, expect_port, expect_seconds, expect_string,
    ClientConfig, DebuggerMode, DEFAULT_REDIS_PORT,
};
use crate::domain::errors::{Result, WiringError};
use crate::domain::raw::{merge_maps, RawMap, RawValue};
use tracing::debug;

/// The namespace prefix sessions are stored under when none is
/// configured.
pub const DEFAULT_SESSION_PREFIX: &str = "session:";

/// A subsystem's raw toggle: `false` disables it, `true` enables it
/// with pure defaults, a mapping enables it with overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubsystemSetting {
    /// The subsystem is not wired at all.
    #[default]
    Disabled,
    /// The subsystem is wired with its derived defaults.
    Defaults,
    /// The subsystem is wired with these overrides merged on top of
    /// its derived defaults.
    Overrides(RawMap),
}

impl SubsystemSetting {
    /// Parses the raw toggle value. Absent and null read as disabled;
    /// any scalar other than a boolean is malformed.
    pub fn from_raw(key: &str, value: Option<&RawValue>) -> Result<Self> {
        match value {
            None | Some(RawValue::Null) | Some(RawValue::Bool(false)) => {
                Ok(SubsystemSetting::Disabled)
            }
            Some(RawValue::Bool(true)) => Ok(SubsystemSetting::Defaults),
            Some(RawValue::Map(map)) => Ok(SubsystemSetting::Overrides(map.clone())),
            Some(other) => Err(WiringError::malformed(
                key,
                format!(
                    "expected a boolean or a mapping, found a {}",
                    other.type_name()
                ),
            )),
        }
    }

    /// The override map to merge, or `None` when disabled.
    fn overrides(&self) -> Option<RawMap> {
        match self {
            SubsystemSetting::Disabled => None,
            SubsystemSetting::Defaults => Some(RawMap::new()),
            SubsystemSetting::Overrides(map) => Some(map.clone()),
        }
    }
}

/// Configuration of the cache-invalidation journal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JournalConfig {
    /// Key prefix the journal stores its entries under.
    pub prefix: Option<String>,
}

impl JournalConfig {
    /// Derives the journal config, or `None` when disabled.
    pub fn derive(setting: &SubsystemSetting) -> Result<Option<Self>> {
        let Some(overrides) = setting.overrides() else {
            debug!("cache journal disabled, nothing derived");
            return Ok(None);
        };
        let mut defaults = RawMap::new();
        defaults.insert("prefix", RawValue::Null);
        let merged = merge_maps(&overrides, &defaults)?;
        Ok(Some(Self {
            prefix: prefix_from(&merged)?,
        }))
    }
}

/// Configuration of the cache storage.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// Whether the storage takes locks around writes.
    pub locks: bool,
    /// Key prefix the storage stores its entries under.
    pub prefix: Option<String>,
}

impl StorageConfig {
    /// Derives the storage config, or `None` when disabled.
    pub fn derive(setting: &SubsystemSetting) -> Result<Option<Self>> {
        let Some(overrides) = setting.overrides() else {
            debug!("cache storage disabled, nothing derived");
            return Ok(None);
        };
        let mut defaults = RawMap::new();
        defaults.insert("locks", RawValue::Bool(true));
        defaults.insert("prefix", RawValue::Null);
        let merged = merge_maps(&overrides, &defaults)?;
        let locks = match merged.get("locks") {
            Some(value) => expect_bool("locks", value)?,
            None => true,
        };
        Ok(Some(Self {
            locks,
            prefix: prefix_from(&merged)?,
        }))
    }
}

/// Configuration of the HTTP session handler.
///
/// Defaults copy `host`, `port`, `timeout`, `database`, `auth`, and
/// `lockDuration` from the default client, add `weight = 1`, the
/// [`DEFAULT_SESSION_PREFIX`], and `native = true`. In native mode a
/// save-path string is derived for the external session subsystem; in
/// non-native mode a dedicated session client is wired instead.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Host (or socket path) the session handler connects to.
    pub host: String,
    /// TCP port; `None` for socket-style hosts.
    pub port: Option<u16>,
    /// Relative weight of this endpoint.
    pub weight: u32,
    /// Connection timeout, in seconds.
    pub timeout: u64,
    /// Redis database index.
    pub database: i64,
    /// Namespace prefix for session keys.
    pub prefix: String,
    /// Password, if the server requires one.
    pub auth: Option<String>,
    /// Whether the runtime's native session handler is used.
    pub native: bool,
    /// Lock duration of the dedicated session client, in seconds.
    pub lock_duration: u64,
    /// Persistent-connection pass-through for the native handler.
    pub persistent: Option<bool>,
    save_path: Option<String>,
}

impl SessionConfig {
    /// Derives the session config from the default client, or `None`
    /// when disabled.
    pub fn derive(client: &ClientConfig, setting: &SubsystemSetting) -> Result<Option<Self>> {
        let Some(overrides) = setting.overrides() else {
            debug!("session handler disabled, nothing derived");
            return Ok(None);
        };
        let defaults = Self::defaults_for(client);
        let merged = merge_maps(&overrides, &defaults.to_raw())?;
        let mut session = Self::from_raw(&merged)?;
        if session.native {
            session.save_path = Some(session.build_save_path(&defaults));
        }
        debug!(
            native = session.native,
            save_path = session.save_path.as_deref().unwrap_or("-"),
            "derived session configuration"
        );
        Ok(Some(session))
    }

    /// The derived save-path, present exactly in native mode.
    pub fn save_path(&self) -> Option<&str> {
        self.save_path.as_deref()
    }

    /// The dedicated client configuration wired for a non-native
    /// session handler.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.host.clone(),
            port: self.port,
            timeout: self.timeout,
            database: self.database,
            auth: self.auth.clone(),
            lock_duration: self.lock_duration,
            debugger: DebuggerMode::Disabled,
            version_check: false,
        }
        .normalize()
    }

    fn defaults_for(client: &ClientConfig) -> Self {
        Self {
            host: client.host.clone(),
            port: client.port,
            weight: 1,
            timeout: client.timeout,
            database: client.database,
            prefix: DEFAULT_SESSION_PREFIX.to_string(),
            auth: client.auth.clone(),
            native: true,
            lock_duration: client.lock_duration,
            persistent: None,
            save_path: None,
        }
    }

    fn to_raw(&self) -> RawMap {
        let mut map = RawMap::new();
        map.insert("host", RawValue::Str(self.host.clone()));
        map.insert(
            "port",
            match self.port {
                Some(port) => RawValue::Int(i64::from(port)),
                None => RawValue::Null,
            },
        );
        map.insert("weight", RawValue::Int(i64::from(self.weight)));
        map.insert("timeout", RawValue::Int(self.timeout as i64));
        map.insert("database", RawValue::Int(self.database));
        map.insert("prefix", RawValue::Str(self.prefix.clone()));
        map.insert(
            "auth",
            match &self.auth {
                Some(auth) => RawValue::Str(auth.clone()),
                None => RawValue::Null,
            },
        );
        map.insert("native", RawValue::Bool(self.native));
        map.insert("lockDuration", RawValue::Int(self.lock_duration as i64));
        map
    }

    fn from_raw(map: &RawMap) -> Result<Self> {
        let mut session = Self {
            host: String::new(),
            port: None,
            weight: 1,
            timeout: 0,
            database: 0,
            prefix: String::new(),
            auth: None,
            native: true,
            lock_duration: 0,
            persistent: None,
            save_path: None,
        };
        if let Some(value) = map.get("host") {
            session.host = expect_string("host", value)?;
        }
        if let Some(value) = map.get("port") {
            session.port = expect_port("port", value)?;
        }
        if let Some(value) = map.get("weight") {
            let weight = expect_int("weight", value)?;
            session.weight = u32::try_from(weight)
                .map_err(|_| WiringError::malformed("weight", "weight out of range"))?;
        }
        if let Some(value) = map.get("timeout") {
            session.timeout = expect_seconds("timeout", value)?;
        }
        if let Some(value) = map.get("database") {
            session.database = expect_int("database", value)?;
        }
        if let Some(value) = map.get("prefix") {
            session.prefix = expect_string("prefix", value)?;
        }
        if let Some(value) = map.get("auth") {
            session.auth = expect_optional_string("auth", value)?;
        }
        if let Some(value) = map.get("native") {
            session.native = expect_bool("native", value)?;
        }
        if let Some(value) = map.get("lockDuration") {
            session.lock_duration = expect_seconds("lockDuration", value)?;
        }
        if let Some(value) = map.get("persistent") {
            session.persistent = match value {
                RawValue::Null => None,
                other => Some(expect_bool("persistent", other)?),
            };
        }
        Ok(session)
    }

    /// Builds the save-path consumed verbatim by the native session
    /// subsystem: the socket path itself, or `tcp://host:port`,
    /// followed by a query string of the values overridden away from
    /// their derived defaults (standard URL query semantics, values
    /// percent-encoded, `&`-joined).
    fn build_save_path(&self, defaults: &Self) -> String {
        let mut path = if self.host.starts_with('/') {
            self.host.clone()
        } else {
            format!(
                "tcp://{}:{}",
                self.host,
                self.port.unwrap_or(DEFAULT_REDIS_PORT)
            )
        };

        let mut params: Vec<(&str, String)> = Vec::new();
        if self.weight != defaults.weight {
            params.push(("weight", self.weight.to_string()));
        }
        if self.timeout != defaults.timeout {
            params.push(("timeout", self.timeout.to_string()));
        }
        if self.database != defaults.database {
            params.push(("database", self.database.to_string()));
        }
        if self.prefix != defaults.prefix && !self.prefix.is_empty() {
            params.push(("prefix", self.prefix.clone()));
        }
        if self.auth != defaults.auth {
            if let Some(auth) = self.auth.as_deref().filter(|a| !a.is_empty()) {
                params.push(("auth", auth.to_string()));
            }
        }
        if let Some(persistent) = self.persistent {
            params.push(("persistent", if persistent { "1" } else { "0" }.to_string()));
        }

        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }
}

fn prefix_from(map: &RawMap) -> Result<Option<String>> {
    let prefix = match map.get("prefix") {
        Some(value) => expect_optional_string("prefix", value)?,
        None => None,
    };
    Ok(prefix.filter(|p| !p.is_empty()))
}
