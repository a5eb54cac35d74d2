// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live connector adapter over the `redis` crate.
//!
//! This adapter implements the version-probe port with a synchronous
//! connection: resolution runs once at process bootstrap, so there is
//! no async machinery here. Each probe is a short-lived connect →
//! `INFO server` → close sequence bounded by the client's own
//! configured timeout.

use crate::domain::client::{ClientConfig, DEFAULT_REDIS_PORT};
use crate::domain::errors::{Result, WiringError};
use crate::ports::{RedisConnection, RedisConnector};
use once_cell::sync::Lazy;
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Minimum Redis server version the wiring accepts.
pub const MINIMUM_SERVER_VERSION: &str = "2.2.0";

static MINIMUM_VERSION: Lazy<(u64, u64, u64)> =
    Lazy::new(|| parse_version(MINIMUM_SERVER_VERSION).unwrap_or((2, 2, 0)));

/// A [`RedisConnector`] backed by the `redis` crate.
///
/// # Examples
///
/// ```rust,no_run
/// use rediswire::adapters::RedisProbe;
/// use rediswire::domain::client::ClientConfig;
/// use rediswire::ports::{RedisConnection, RedisConnector};
///
/// # fn main() -> rediswire::domain::errors::Result<()> {
/// let probe = RedisProbe::new();
/// let mut conn = probe.connect(&ClientConfig::default().normalize())?;
/// conn.assert_version()?;
/// conn.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RedisProbe;

impl RedisProbe {
    /// Creates a new probe connector.
    pub fn new() -> Self {
        Self
    }
}

impl RedisConnector for RedisProbe {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn RedisConnection>> {
        let endpoint = config.endpoint();
        let addr = if config.is_socket() {
            ConnectionAddr::Unix(PathBuf::from(&config.host))
        } else {
            ConnectionAddr::Tcp(
                config.host.clone(),
                config.port.unwrap_or(DEFAULT_REDIS_PORT),
            )
        };
        let info = ConnectionInfo {
            addr,
            redis: RedisConnectionInfo {
                db: config.database,
                username: None,
                password: config.auth.clone().filter(|auth| !auth.is_empty()),
            },
        };

        let client = Client::open(info).map_err(|e| connection_error(&endpoint, e))?;
        let timeout = Duration::from_secs(config.timeout);
        let connection = client
            .get_connection_with_timeout(timeout)
            .map_err(|e| connection_error(&endpoint, e))?;
        connection
            .set_read_timeout(Some(timeout))
            .map_err(|e| connection_error(&endpoint, e))?;
        connection
            .set_write_timeout(Some(timeout))
            .map_err(|e| connection_error(&endpoint, e))?;

        debug!(endpoint = %endpoint, "connected for version probe");
        Ok(Box::new(ProbeConnection {
            connection,
            endpoint,
        }))
    }
}

struct ProbeConnection {
    connection: redis::Connection,
    endpoint: String,
}

impl RedisConnection for ProbeConnection {
    fn assert_version(&mut self) -> Result<()> {
        let info: String = redis::cmd("INFO")
            .arg("server")
            .query(&mut self.connection)
            .map_err(|e| connection_error(&self.endpoint, e))?;

        let reported = parse_info_version(&info).ok_or_else(|| WiringError::Connection {
            endpoint: self.endpoint.clone(),
            message: "server did not report a redis_version".to_string(),
            source: None,
        })?;
        let version = parse_version(&reported).ok_or_else(|| WiringError::Connection {
            endpoint: self.endpoint.clone(),
            message: format!("unparseable server version '{}'", reported),
            source: None,
        })?;

        if version < *MINIMUM_VERSION {
            return Err(WiringError::IncompatibleVersion {
                endpoint: self.endpoint.clone(),
                reported,
                required: MINIMUM_SERVER_VERSION.to_string(),
            });
        }
        debug!(endpoint = %self.endpoint, version = %reported, "server version accepted");
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping the connection closes the underlying socket.
        drop(self);
        Ok(())
    }
}

fn connection_error(endpoint: &str, error: redis::RedisError) -> WiringError {
    WiringError::Connection {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Pulls the `redis_version` field out of an `INFO server` reply.
fn parse_info_version(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("redis_version:"))
        .map(|version| version.trim().to_string())
}

/// Parses a dotted version string into a comparable triple. Missing
/// components read as zero.
fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    Some((major, minor, patch))
}
