//! subip-dns - A chainable authoritative DNS responder that answers address
//! queries from the query name itself.
//!
//! When a hostname encodes an IPv4 or IPv6 address as a dash-separated label
//! inside a zone this responder is authoritative for, the answer is
//! synthesized directly from that label:
//!
//! ```text
//! foo.172-32-22-12.example.com  →  A    172.32.22.12
//! 2001-db8--1.example.com       →  AAAA 2001:db8::1
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          subip-dns                          │
//! │                                                             │
//! │                  ┌──────────────────┐  owned zone with an   │
//! │  UDP/TCP :53 ──▶ │  SubIpResponder  │─ encoded address ──▶  │ A/AAAA answer
//! │                  └────────┬─────────┘                       │
//! │                           │ not ours, or fallthrough        │
//! │                           ▼                                 │
//! │                  ┌──────────────────┐                       │
//! │                  │   next handler   │  (rest of the chain)  │
//! │                  └──────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Handler chain
//!
//! The responder implements hickory's
//! [`RequestHandler`](hickory_server::server::RequestHandler) and takes the
//! next handler in the chain at construction time. Queries outside the
//! configured zones are always handed to the next handler; owned-zone queries
//! that do not decode to an address are either handed on (when the
//! fallthrough policy covers them) or failed with SERVFAIL. The [`chain`]
//! module ships terminals for deployments with nothing stacked behind the
//! responder.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use subip_dns::{chain::Refused, DnsConfig, SubIpResponder};
//! use hickory_server::ServerFuture;
//!
//! let config = DnsConfig {
//!     listen_addr: "[::]:5353".parse().unwrap(),
//!     zones: vec!["example.com".to_string()],
//!     ttl: 30,
//!     fallthrough: Default::default(),
//! };
//!
//! let responder = SubIpResponder::new(&config, Refused)?;
//! let mut server = ServerFuture::new(responder);
//! ```

#![warn(missing_docs)]

pub mod chain;
pub mod config;
pub mod decode;
pub mod error;
pub mod metrics;
pub mod responder;
pub mod server;
pub mod telemetry;
pub mod zone;

// Re-export main types
pub use config::{Config, DnsConfig, FallthroughConfig, TelemetryConfig};
pub use error::DnsError;
pub use responder::SubIpResponder;
pub use server::DnsServer;
pub use zone::{Fallthrough, ZoneSet};
