use relay_dns_application::UpstreamResolver;
use relay_dns_domain::{RelayError, RelayQuery};
use relay_dns_infrastructure::dns::transport::UdpUpstream;
use std::net::SocketAddr;
use std::time::Duration;

mod helpers;
use helpers::dns_server_mock::{canned_reply, StubUpstream};

fn client_addr() -> SocketAddr {
    "127.0.0.1:49152".parse().unwrap()
}

fn example_query(id: u16) -> RelayQuery {
    let mut raw = vec![
        (id >> 8) as u8,
        id as u8,
        0x01,
        0x00, // FLAGS: RD
        0x00,
        0x01, // QDCOUNT = 1
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
    ];
    raw.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
    RelayQuery::parse(raw, client_addr())
}

#[tokio::test]
async fn returns_upstream_reply_verbatim() {
    let stub = StubUpstream::answering().await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(500), 3);

    let query = example_query(0x1234);
    let response = upstream.resolve(&query).await.unwrap();

    assert_eq!(&response[0..2], &[0x12, 0x34]);
    assert_eq!(response, canned_reply(&query.raw));
    // question section preserved through the stub round trip
    assert_eq!(&response[12..], &query.raw[12..]);
}

#[tokio::test]
async fn idempotent_against_deterministic_upstream() {
    let stub = StubUpstream::answering().await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(500), 3);

    let query = example_query(0x4242);
    let first = upstream.resolve(&query).await.unwrap();
    let second = upstream.resolve(&query).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn silent_upstream_exhausts_retries() {
    let stub = StubUpstream::silent().await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(50), 2);

    let query = example_query(0x1111);
    let err = upstream.resolve(&query).await.unwrap_err();

    match err {
        RelayError::NoUpstreamReply { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected NoUpstreamReply, got {:?}", other),
    }
}

#[tokio::test]
async fn mismatched_id_reply_is_discarded_and_retried() {
    // First attempt gets a reply with a corrupted transaction id, second
    // attempt gets a correct one.
    let stub = StubUpstream::start(|query, received| {
        let mut reply = canned_reply(query);
        if received == 1 {
            reply[0] ^= 0xFF;
        }
        Some(reply)
    })
    .await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(500), 3);

    let query = example_query(0x2222);
    let response = upstream.resolve(&query).await.unwrap();

    assert_eq!(&response[0..2], &[0x22, 0x22]);
}

#[tokio::test]
async fn only_mismatched_replies_fails_after_retries() {
    let stub = StubUpstream::start(|query, _| {
        let mut reply = canned_reply(query);
        reply[0] ^= 0xFF;
        Some(reply)
    })
    .await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(100), 2);

    let query = example_query(0x3333);
    let err = upstream.resolve(&query).await.unwrap_err();

    assert!(matches!(err, RelayError::NoUpstreamReply { attempts: 2, .. }));
}

#[tokio::test]
async fn recovers_on_second_attempt_after_timeout() {
    // Swallow the first datagram, answer the second.
    let stub = StubUpstream::start(|query, received| {
        if received == 1 {
            None
        } else {
            Some(canned_reply(query))
        }
    })
    .await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(100), 3);

    let query = example_query(0x5555);
    let response = upstream.resolve(&query).await.unwrap();

    assert_eq!(&response[0..2], &[0x55, 0x55]);
}

#[tokio::test]
async fn forwards_raw_bytes_even_when_question_is_unparseable() {
    // Truncated question: decode fails, forwarding must still happen.
    let stub = StubUpstream::start(|query, _| {
        // echo the received bytes back so the test can see what arrived
        Some(query.to_vec())
    })
    .await;
    let upstream = UdpUpstream::new(stub.addr, Duration::from_millis(500), 3);

    let mut raw = vec![0u8; 12];
    raw[0] = 0xAB;
    raw[1] = 0xCD;
    raw[5] = 0x01;
    raw.push(0x07); // dangling label length
    let query = RelayQuery::parse(raw.clone(), client_addr());
    assert!(query.question.is_none());

    let response = upstream.resolve(&query).await.unwrap();
    assert_eq!(response, raw, "upstream must receive the raw bytes verbatim");
}
