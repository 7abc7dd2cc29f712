use crate::ports::UpstreamResolver;
use relay_dns_domain::{wire, RelayQuery};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolution orchestrator: one instance serves all requests, one `execute`
/// call per request.
///
/// Fixed preference order, terminal on first success:
/// 1. DoH, when wired in and the question decoded
/// 2. plain-UDP upstream (its own bounded retry loop)
/// 3. synthesized SERVFAIL from the original raw bytes
///
/// Every path terminates with response bytes; only a request too short for
/// the DNS header produces an empty buffer, which the dispatcher suppresses.
pub struct ResolveQueryUseCase {
    doh: Option<Arc<dyn UpstreamResolver>>,
    udp: Arc<dyn UpstreamResolver>,
}

impl ResolveQueryUseCase {
    pub fn new(doh: Option<Arc<dyn UpstreamResolver>>, udp: Arc<dyn UpstreamResolver>) -> Self {
        Self { doh, udp }
    }

    pub async fn execute(&self, query: &RelayQuery) -> Vec<u8> {
        if let Some(doh) = &self.doh {
            if query.question.is_some() {
                match doh.resolve(query).await {
                    Ok(bytes) if !bytes.is_empty() => {
                        info!(query = %query.describe(), "Resolved via DoH");
                        return bytes;
                    }
                    Ok(_) => {
                        debug!(query = %query.describe(), "DoH produced empty response, falling back");
                    }
                    Err(e) => {
                        debug!(
                            query = %query.describe(),
                            reason = e.kind(),
                            error = %e,
                            "DoH attempt failed, falling back to UDP"
                        );
                    }
                }
            } else {
                debug!("Question did not decode, skipping DoH");
            }
        }

        match self.udp.resolve(query).await {
            Ok(bytes) => {
                debug!(query = %query.describe(), "Resolved via UDP upstream");
                return bytes;
            }
            Err(e) => {
                warn!(
                    query = %query.describe(),
                    reason = e.kind(),
                    error = %e,
                    "UDP upstream exhausted, synthesizing SERVFAIL"
                );
            }
        }

        let servfail = wire::encode_servfail(&query.raw);
        if servfail.is_empty() {
            warn!(source = %query.source, "Request too short for SERVFAIL synthesis, returning nothing");
        }
        servfail
    }
}
