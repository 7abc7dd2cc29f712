//! Plain-UDP upstream transport (RFC 1035 §4.2.1).
//!
//! Forwards the client's raw query bytes verbatim and returns the first
//! acceptable reply datagram. One transient socket per invocation; the retry
//! loop re-sends the identical bytes each attempt.

use super::MAX_UDP_RESPONSE_SIZE;
use async_trait::async_trait;
use relay_dns_application::UpstreamResolver;
use relay_dns_domain::config::UpstreamConfig;
use relay_dns_domain::{RelayError, RelayQuery};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

pub struct UdpUpstream {
    server_addr: SocketAddr,
    timeout: Duration,
    retries: u32,
}

impl UdpUpstream {
    pub fn new(server_addr: SocketAddr, timeout: Duration, retries: u32) -> Self {
        Self {
            server_addr,
            timeout,
            retries,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, RelayError> {
        let server_addr: SocketAddr = config
            .server
            .parse()
            .map_err(|e| RelayError::Io(format!("Invalid upstream address '{}': {}", config.server, e)))?;
        Ok(Self::new(
            server_addr,
            Duration::from_millis(config.query_timeout),
            config.retries.max(1),
        ))
    }

    /// Accepts a reply only when its transaction id matches the query's.
    /// Queries too short to carry an id (under 2 bytes) skip the check.
    fn id_matches(query: &[u8], reply: &[u8]) -> bool {
        query.len() < 2 || (reply.len() >= 2 && reply[0..2] == query[0..2])
    }
}

#[async_trait]
impl UpstreamResolver for UdpUpstream {
    async fn resolve(&self, query: &RelayQuery) -> Result<Vec<u8>, RelayError> {
        // Ephemeral port; the socket is dropped on every exit path.
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| RelayError::Transport {
            server: self.server_addr.to_string(),
            detail: format!("failed to bind upstream socket: {}", e),
        })?;

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        // Uniform retry policy: timeouts, send/recv errors and id mismatches
        // all consume one attempt.
        for attempt in 1..=self.retries {
            match tokio::time::timeout(self.timeout, socket.send_to(&query.raw, self.server_addr))
                .await
            {
                Err(_) => {
                    debug!(
                        server = %self.server_addr,
                        attempt,
                        retries = self.retries,
                        "Timeout sending to upstream"
                    );
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(
                        server = %self.server_addr,
                        attempt,
                        retries = self.retries,
                        error = %e,
                        "Failed to send to upstream"
                    );
                    continue;
                }
                Ok(Ok(_)) => {}
            }

            match tokio::time::timeout(self.timeout, socket.recv_from(&mut recv_buf)).await {
                Err(_) => {
                    debug!(
                        server = %self.server_addr,
                        attempt,
                        retries = self.retries,
                        "Upstream timeout"
                    );
                }
                Ok(Err(e)) => {
                    warn!(
                        server = %self.server_addr,
                        attempt,
                        retries = self.retries,
                        error = %e,
                        "Failed to receive from upstream"
                    );
                }
                Ok(Ok((n, from_addr))) => {
                    if from_addr.ip() != self.server_addr.ip() {
                        warn!(
                            expected = %self.server_addr,
                            received_from = %from_addr,
                            "Reply from unexpected source"
                        );
                    }

                    if !Self::id_matches(&query.raw, &recv_buf[..n]) {
                        warn!(
                            server = %self.server_addr,
                            attempt,
                            "Discarding reply with mismatched transaction id"
                        );
                        continue;
                    }

                    debug!(
                        server = %self.server_addr,
                        bytes_received = n,
                        attempt,
                        "Upstream reply received"
                    );
                    return Ok(recv_buf[..n].to_vec());
                }
            }
        }

        Err(RelayError::NoUpstreamReply {
            server: self.server_addr.to_string(),
            attempts: self.retries,
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
