// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network-client port used by the pre-flight version gate.
//!
//! This is the boundary to the external Redis client collaborator:
//! the gate only ever connects, asserts the server version, and
//! closes. The wire protocol itself lives behind this port.

use crate::domain::client::ClientConfig;
use crate::domain::errors::Result;

/// A short-lived connection opened for a version probe.
///
/// Connections are used strictly as connect → assert → close; nothing
/// else crosses this boundary.
pub trait RedisConnection {
    /// Asserts that the remote server speaks a compatible protocol
    /// version.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the server version is supported
    /// * `Err(WiringError::IncompatibleVersion)` - the server is too old
    /// * `Err(WiringError::Connection)` - the probe itself failed
    fn assert_version(&mut self) -> Result<()>;

    /// Closes the connection.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A factory for version-probe connections.
///
/// Implementations must be `Send + Sync` so a connector can be shared
/// where needed, although resolution itself is single-threaded.
///
/// # Examples
///
/// ```rust
/// use rediswire::domain::client::ClientConfig;
/// use rediswire::domain::errors::Result;
/// use rediswire::ports::{RedisConnection, RedisConnector};
///
/// struct AlwaysCompatible;
///
/// struct NoopConnection;
///
/// impl RedisConnection for NoopConnection {
///     fn assert_version(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn close(self: Box<Self>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// impl RedisConnector for AlwaysCompatible {
///     fn connect(&self, _config: &ClientConfig) -> Result<Box<dyn RedisConnection>> {
///         Ok(Box::new(NoopConnection))
///     }
/// }
/// ```
pub trait RedisConnector: Send + Sync {
    /// Opens a connection to the endpoint described by the resolved
    /// client config (host, optional port, database, timeout, auth).
    ///
    /// The client's own timeout bounds the wait; there are no retries.
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn RedisConnection>>;
}
