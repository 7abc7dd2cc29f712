use relay_dns_application::ResolveQueryUseCase;
use relay_dns_domain::config::ServerConfig;
use relay_dns_domain::RelayQuery;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Receive buffer size; larger datagrams are truncated.
const MAX_DATAGRAM_SIZE: usize = 2048;

/// Request dispatcher: one task per received datagram, bounded by a
/// semaphore sized from `server.max_inflight`.
///
/// The listening socket is shared by all in-flight tasks for the send side;
/// datagram sockets keep concurrent sends from interleaving. Tasks run to
/// completion once spawned — the per-attempt upstream timeouts are the only
/// thing bounding a slow request.
pub async fn start_dns_server(
    config: &ServerConfig,
    use_case: Arc<ResolveQueryUseCase>,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = config.listen_addr().parse()?;
    let socket = Arc::new(create_udp_socket(socket_addr)?);
    let limiter = Arc::new(Semaphore::new(config.max_inflight));

    info!(
        bind_address = %socket_addr,
        max_inflight = config.max_inflight,
        "DNS proxy listening"
    );

    let mut recv_buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        let (n, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(pair) => pair,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                continue;
            }
        };

        // Admission control: waits here instead of spawning without bound.
        let permit = match limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break, // semaphore closed, shutting down
        };

        let query = RelayQuery::parse(recv_buf[..n].to_vec(), from);
        info!(query = %query.describe(), client = %from, "DNS query received");

        let use_case = use_case.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let response = use_case.execute(&query).await;

            if response.is_empty() {
                debug!(client = %query.source, "Suppressing empty response");
                return;
            }
            if let Err(e) = socket.send_to(&response, query.source).await {
                warn!(client = %query.source, error = %e, "Failed to send response");
            }
        });
    }

    Ok(())
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<tokio::net::UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(tokio::net::UdpSocket::from_std(std_socket)?)
}
