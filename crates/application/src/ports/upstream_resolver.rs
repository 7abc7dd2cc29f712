use async_trait::async_trait;
use relay_dns_domain::{RelayError, RelayQuery};

/// One way of asking an upstream for an answer to a query.
///
/// Implementations return complete wire-format response bytes. Any failure is
/// reported as a `RelayError`, which the orchestrator treats as the signal to
/// fall through to the next resolver in the preference order.
#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    async fn resolve(&self, query: &RelayQuery) -> Result<Vec<u8>, RelayError>;

    fn protocol_name(&self) -> &'static str;
}
