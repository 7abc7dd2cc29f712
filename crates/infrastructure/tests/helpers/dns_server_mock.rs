use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// In-process stub DNS upstream for transport tests.
///
/// Binds an ephemeral localhost port and answers each received datagram with
/// whatever the handler returns; `None` swallows the datagram (simulates a
/// dead upstream). The handler also sees the 1-based receive count so tests
/// can misbehave on early attempts only.
pub struct StubUpstream {
    pub addr: SocketAddr,
}

impl StubUpstream {
    pub async fn start<F>(mut handler: F) -> Self
    where
        F: FnMut(&[u8], u32) -> Option<Vec<u8>> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("stub upstream bind");
        let addr = socket.local_addr().expect("stub upstream local addr");

        tokio::spawn(async move {
            let mut buf = [0u8; 4096];
            let mut received: u32 = 0;
            loop {
                let Ok((n, from)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                received += 1;
                if let Some(reply) = handler(&buf[..n], received) {
                    let _ = socket.send_to(&reply, from).await;
                }
            }
        });

        Self { addr }
    }

    /// Stub that answers every query with a canned NOERROR reply echoing the
    /// query's transaction id and question section.
    pub async fn answering() -> Self {
        Self::start(|query, _| Some(canned_reply(query))).await
    }

    /// Stub that receives but never replies.
    pub async fn silent() -> Self {
        Self::start(|_, _| None).await
    }
}

/// Minimal NOERROR response: query id, QR|RD|RA flags, the original question
/// section, no records.
pub fn canned_reply(query: &[u8]) -> Vec<u8> {
    let mut reply = Vec::with_capacity(query.len());
    reply.extend_from_slice(&query[0..2]);
    reply.extend_from_slice(&[0x81, 0x80]);
    reply.extend_from_slice(&query[4..6]);
    reply.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    reply.extend_from_slice(&query[12..]);
    reply
}
