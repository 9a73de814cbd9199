//! Certificate probing.
//!
//! Workers only depend on the [`CertificateProber`] trait. [`TlsProber`] is the
//! real implementation: TCP connect, TLS handshake, leaf certificate, subject CN.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use asnrecon_common::config::ScanConfig;
use asnrecon_protocols::{tls, x509};
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::debug;

#[async_trait]
pub trait CertificateProber: Send + Sync {
    /// Returns the name the service at `addr` identifies as.
    ///
    /// `Ok(None)` covers every ordinary network outcome (refused, timed out, no
    /// TLS, unreadable certificate). `Err` is reserved for unexpected failures.
    async fn probe(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>>;
}

pub struct TlsProber {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
}

impl TlsProber {
    pub fn new(port: u16, timeout: Duration) -> anyhow::Result<Self> {
        let config = tls::probe_client_config()?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            port,
            timeout,
        })
    }

    pub fn from_config(cfg: &ScanConfig) -> anyhow::Result<Self> {
        Self::new(cfg.port, cfg.probe_timeout)
    }

    async fn handshake(&self, addr: Ipv4Addr) -> std::io::Result<TlsStream<TcpStream>> {
        let socket_addr: SocketAddr = SocketAddr::new(IpAddr::V4(addr), self.port);
        let tcp: TcpStream = TcpStream::connect(socket_addr).await?;
        let server_name: ServerName<'static> = ServerName::from(IpAddr::V4(addr));
        self.connector.connect(server_name, tcp).await
    }
}

#[async_trait]
impl CertificateProber for TlsProber {
    async fn probe(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        let stream: TlsStream<TcpStream> = match timeout(self.timeout, self.handshake(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!("{addr}: {e}");
                return Ok(None);
            }
            Err(_elapsed) => {
                debug!("{addr}: timed out after {:?}", self.timeout);
                return Ok(None);
            }
        };

        let (_, conn) = stream.get_ref();
        let Some(leaf) = conn.peer_certificates().and_then(|chain| chain.first()) else {
            debug!("{addr}: no certificate presented");
            return Ok(None);
        };

        match x509::common_name(leaf.as_ref()) {
            Ok(name) => Ok(name),
            Err(e) => {
                debug!("{addr}: {e}");
                Ok(None)
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
