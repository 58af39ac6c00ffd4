//! DNS server setup and lifecycle management.

use hickory_server::ServerFuture;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chain::Refused;
use crate::config::DnsConfig;
use crate::error::DnsError;
use crate::metrics;
use crate::responder::SubIpResponder;

/// How long an idle TCP connection is kept open.
const TCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Standalone DNS server wrapping a responder chain.
///
/// The chain here is just the responder with a [`Refused`] terminal: queries
/// outside the configured zones are refused, since a standalone deployment
/// has nothing downstream to hand them to. Embedders that want a longer
/// chain build [`SubIpResponder`] themselves and register it with their own
/// `ServerFuture`.
pub struct DnsServer {
    config: DnsConfig,
}

impl DnsServer {
    /// Create a new DNS server with the given configuration.
    pub fn new(config: DnsConfig) -> Self {
        Self { config }
    }

    /// Run the DNS server until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), DnsError> {
        info!(
            listen_addr = %self.config.listen_addr,
            zones = ?self.config.zones,
            ttl = self.config.ttl,
            "Starting subip-dns server"
        );

        let responder = SubIpResponder::new(&self.config, Refused)?;
        metrics::record_zones_configured(responder.zones().len());

        let mut server = ServerFuture::new(responder);

        let udp_socket = UdpSocket::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "DNS UDP listening");
        server.register_socket(udp_socket);

        let tcp_listener = TcpListener::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "DNS TCP listening");
        server.register_listener(tcp_listener, TCP_TIMEOUT);

        info!("DNS server ready to serve queries");

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("DNS server shutdown requested");
            }
            result = server.block_until_done() => {
                if let Err(e) = result {
                    error!("DNS server error: {}", e);
                }
            }
        }

        let _ = server.shutdown_gracefully().await;

        info!("DNS server stopped");
        Ok(())
    }
}
