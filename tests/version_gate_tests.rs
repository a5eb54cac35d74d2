// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the pre-flight version gate.
//!
//! The gate is exercised through fake connectors so the suite stays
//! hermetic; the live probe adapter is covered by its own unit tests.

#![cfg(feature = "yaml")]

use rediswire::domain::client::ClientConfig;
use rediswire::domain::errors::{Result, WiringError};
use rediswire::ports::{RedisConnection, RedisConnector};
use rediswire::service::{VersionGate, WiringLoader};
use std::sync::Mutex;

/// Records every endpoint it is asked to connect to.
struct RecordingConnector {
    endpoints: Mutex<Vec<String>>,
    reported_version: &'static str,
}

impl RecordingConnector {
    fn new(reported_version: &'static str) -> Self {
        Self {
            endpoints: Mutex::new(Vec::new()),
            reported_version,
        }
    }

    fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().unwrap().clone()
    }
}

struct RecordedConnection {
    endpoint: String,
    reported_version: &'static str,
}

impl RedisConnection for RecordedConnection {
    fn assert_version(&mut self) -> Result<()> {
        if self.reported_version < "2.2.0" {
            return Err(WiringError::IncompatibleVersion {
                endpoint: self.endpoint.clone(),
                reported: self.reported_version.to_string(),
                required: "2.2.0".to_string(),
            });
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

impl RedisConnector for RecordingConnector {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn RedisConnection>> {
        let endpoint = config.endpoint();
        self.endpoints.lock().unwrap().push(endpoint.clone());
        Ok(Box::new(RecordedConnection {
            endpoint,
            reported_version: self.reported_version,
        }))
    }
}

#[test]
fn test_gate_probes_every_checked_client() {
    let plan = WiringLoader::new()
        .load_yaml_str(concat!(
            "host: 127.0.0.1\n",
            "clients:\n",
            "  cache:\n",
            "    host: 10.0.0.5\n",
            "    port: 6380\n",
        ))
        .unwrap();

    let connector = RecordingConnector::new("7.2.4");
    VersionGate::new(&connector).validate_plan(&plan).unwrap();
    assert_eq!(
        connector.endpoints(),
        vec!["127.0.0.1:6379".to_string(), "10.0.0.5:6380".to_string()]
    );
}

#[test]
fn test_disabled_version_check_never_touches_the_network() {
    let plan = WiringLoader::new()
        .load_yaml_str("versionCheck: false\n")
        .unwrap();

    let connector = RecordingConnector::new("7.2.4");
    VersionGate::new(&connector).validate_plan(&plan).unwrap();
    assert!(connector.endpoints().is_empty());
}

#[test]
fn test_incompatible_server_rejects_the_plan() {
    let plan = WiringLoader::new().load_yaml_str("host: 127.0.0.1\n").unwrap();

    let connector = RecordingConnector::new("2.0.4");
    let err = VersionGate::new(&connector)
        .validate_plan(&plan)
        .unwrap_err();
    assert!(matches!(err, WiringError::IncompatibleVersion { .. }));
}

#[test]
fn test_version_check_flag_is_inherited() {
    let plan = WiringLoader::new()
        .load_yaml_str(concat!(
            "versionCheck: false\n",
            "clients:\n",
            "  cache:\n",
            "    extends: default\n",
            "  probed:\n",
            "    versionCheck: true\n",
        ))
        .unwrap();

    let connector = RecordingConnector::new("7.2.4");
    VersionGate::new(&connector).validate_plan(&plan).unwrap();
    // Only the client that opted back in is probed.
    assert_eq!(connector.endpoints(), vec!["127.0.0.1:6379".to_string()]);
}
