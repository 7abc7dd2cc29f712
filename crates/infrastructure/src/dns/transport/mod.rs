pub mod doh;
pub mod rdata;
pub mod udp;

pub use doh::DohUpstream;
pub use udp::UdpUpstream;

/// Maximum UDP DNS response size accepted from an upstream.
pub const MAX_UDP_RESPONSE_SIZE: usize = 4096;
