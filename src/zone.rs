//! Zone ownership matching and the fallthrough policy.

use hickory_proto::rr::{LowerName, Name};

use crate::config::FallthroughConfig;
use crate::error::DnsError;

/// Ordered set of zones the responder is authoritative for.
///
/// Zones are normalized once at construction to their canonical lower-case
/// trailing-dot form and matched with label-aligned suffix comparison. The
/// first configured zone that owns a name wins, so matching is deterministic
/// even for overlapping zone sets.
#[derive(Debug, Clone)]
pub struct ZoneSet {
    zones: Vec<LowerName>,
}

impl ZoneSet {
    /// Parse and normalize a configured zone list.
    pub fn from_strs(zones: &[String]) -> Result<Self, DnsError> {
        if zones.is_empty() {
            return Err(DnsError::Config(
                "at least one zone must be configured".to_string(),
            ));
        }

        let mut normalized = Vec::with_capacity(zones.len());
        for zone in zones {
            let lower = normalize_zone(zone)?;
            if normalized.contains(&lower) {
                return Err(DnsError::Config(format!("duplicate zone '{zone}'")));
            }
            normalized.push(lower);
        }

        Ok(Self { zones: normalized })
    }

    /// Find the first configured zone owning `name`.
    ///
    /// Ownership means `name` ends with the zone's suffix on a label
    /// boundary; comparison is case-insensitive through the `LowerName`
    /// normalization. `None` means this responder has no authority over the
    /// name.
    pub fn matches(&self, name: &LowerName) -> Option<&LowerName> {
        self.zones.iter().find(|zone| zone.zone_of(name))
    }

    /// Number of configured zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// True when no zone is configured (never the case after `from_strs`).
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Iterate the normalized zones in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &LowerName> {
        self.zones.iter()
    }
}

/// Normalize a zone string to its canonical lower-case trailing-dot form.
fn normalize_zone(zone: &str) -> Result<LowerName, DnsError> {
    if zone.is_empty() {
        return Err(DnsError::Config("zone must not be empty".to_string()));
    }
    let mut name = Name::from_ascii(zone)
        .map_err(|e| DnsError::Config(format!("invalid zone '{zone}': {e}")))?;
    name.set_fqdn(true);
    Ok(LowerName::from(name))
}

/// Zones for which an unanswered owned-zone query is handed to the next
/// handler instead of failed.
#[derive(Debug, Clone, Default)]
pub struct Fallthrough {
    enabled: bool,
    /// Empty while enabled means every zone falls through.
    zones: Vec<LowerName>,
}

impl Fallthrough {
    /// Policy that never delegates.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Policy that delegates every unanswered owned-zone query.
    pub fn all() -> Self {
        Self {
            enabled: true,
            zones: Vec::new(),
        }
    }

    /// Policy restricted to the given zones.
    pub fn limited(zones: &[String]) -> Result<Self, DnsError> {
        let mut normalized = Vec::with_capacity(zones.len());
        for zone in zones {
            normalized.push(normalize_zone(zone)?);
        }
        Ok(Self {
            enabled: true,
            zones: normalized,
        })
    }

    /// Build the runtime policy from its configuration form.
    pub fn from_config(config: &FallthroughConfig) -> Result<Self, DnsError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        if config.zones.is_empty() {
            return Ok(Self::all());
        }
        Self::limited(&config.zones)
    }

    /// Whether an unanswered query for `name` should fall through.
    pub fn through(&self, name: &LowerName) -> bool {
        self.enabled && (self.zones.is_empty() || self.zones.iter().any(|z| z.zone_of(name)))
    }
}
