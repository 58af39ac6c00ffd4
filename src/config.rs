//! Configuration types for subip-dns.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::DnsError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// DNS responder configuration.
    pub dns: DnsConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// DNS responder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsConfig {
    /// Address for the DNS server to listen on (UDP and TCP).
    pub listen_addr: SocketAddr,

    /// Zones this responder is authoritative for, in match order
    /// (e.g. `["example.com"]`). Normalized to lower-case trailing-dot
    /// form when the responder is built.
    pub zones: Vec<String>,

    /// TTL for synthesized records in seconds, 1-65535.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// What to do with owned-zone queries that carry no address encoding.
    #[serde(default)]
    pub fallthrough: FallthroughConfig,
}

impl DnsConfig {
    /// Check the invariants serde cannot express.
    ///
    /// Runs once at startup; a failure here prevents the responder from
    /// being installed at all.
    pub fn validate(&self) -> Result<(), DnsError> {
        if self.zones.is_empty() {
            return Err(DnsError::Config(
                "at least one zone must be configured".to_string(),
            ));
        }
        if self.ttl == 0 || self.ttl > u32::from(u16::MAX) {
            return Err(DnsError::Config(format!(
                "ttl out of range (expect 1-65535, got {})",
                self.ttl
            )));
        }
        Ok(())
    }
}

/// Fallthrough configuration.
///
/// Disabled means unanswered owned-zone queries are failed with SERVFAIL.
/// Enabled with an empty zone list means every owned zone falls through to
/// the next handler; a non-empty list restricts fallthrough to those zones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FallthroughConfig {
    /// Hand unanswered owned-zone queries to the next handler.
    #[serde(default)]
    pub enabled: bool,

    /// Restrict fallthrough to these zones.
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Log level filter (e.g. "info", "debug", "subip_dns=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl() -> u32 {
    30
}
