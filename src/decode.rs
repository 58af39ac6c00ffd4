//! Dash-encoded address extraction from query subdomains.
//!
//! The label immediately preceding the owning zone is the only place an
//! address may be encoded: `host.172-32-22-12.example.com.` in zone
//! `example.com.` encodes `172.32.22.12`, and the `host.` prefix is ignored.
//! IPv6 uses the standard colon-hex groups with `:` replaced by `-`
//! (`2001-db8--1` for `2001:db8::1`).

use hickory_proto::rr::LowerName;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Shortest dash-encoded IPv4 literal (`1-2-3-4`), also the shortest viable
/// subdomain once its trailing label separator is counted.
pub const MIN_IPV4_LEN: usize = 7;

/// Shortest fully-written IPv6 literal (`0-0-0-0-0-0-0-1`); candidates at
/// least this long can only be IPv6.
pub const MIN_IPV6_LEN: usize = 15;

/// Extract the address encoded in the label immediately preceding `zone`.
///
/// `zone` must own `name` (label-aligned suffix match); both sides are
/// rendered in their canonical lower-case trailing-dot form, so the suffix
/// strip below cannot misalign. Returns `None` whenever the subdomain does
/// not encode a valid address; malformed candidates are never an error.
pub fn decode_address(name: &LowerName, zone: &LowerName) -> Option<IpAddr> {
    let qname = name.to_string();
    let suffix = zone.to_string();

    // `foo.172-32-22-12.example.com.` in zone `example.com.` leaves the
    // subdomain `foo.172-32-22-12.`
    let subdomain = qname.strip_suffix(suffix.as_str())?;
    if subdomain.len() < MIN_IPV4_LEN {
        return None;
    }

    // ["foo", "172-32-22-12", ""]
    let parts: Vec<&str> = subdomain.split('.').collect();
    if parts.len() < 2 || !parts[parts.len() - 1].is_empty() {
        return None;
    }

    // The label adjacent to the zone is the candidate; anything before it is
    // free-form prefix (service names, instance names).
    let candidate = parts[parts.len() - 2];
    if candidate.is_empty() || candidate.ends_with('-') {
        return None;
    }
    if candidate.len() < MIN_IPV4_LEN {
        return None;
    }

    // At full-form length only IPv6 can fit. Below it, try the dotted quad
    // first; compressed IPv6 literals (`2001-db8--1`) fall back to colon-hex
    // parsing. A dash-quad never reads as valid IPv6, so the order is safe.
    if candidate.len() >= MIN_IPV6_LEN {
        return parse_v6(candidate);
    }
    parse_v4(candidate).or_else(|| parse_v6(candidate))
}

fn parse_v4(candidate: &str) -> Option<IpAddr> {
    candidate
        .replace('-', ".")
        .parse::<Ipv4Addr>()
        .ok()
        .map(IpAddr::V4)
}

fn parse_v6(candidate: &str) -> Option<IpAddr> {
    candidate
        .replace('-', ":")
        .parse::<Ipv6Addr>()
        .ok()
        .map(IpAddr::V6)
}
