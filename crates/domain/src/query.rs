use crate::wire::{self, QuestionInfo};
use std::net::SocketAddr;

/// One inbound request: the raw datagram, where it came from, and the decoded
/// question when the buffer parsed.
///
/// Decode failure is recorded as `None` rather than an error — an unparseable
/// question only disables the DoH path and logging detail; the raw bytes are
/// still forwarded verbatim upstream.
#[derive(Debug, Clone)]
pub struct RelayQuery {
    pub raw: Vec<u8>,
    pub source: SocketAddr,
    pub question: Option<QuestionInfo>,
}

impl RelayQuery {
    pub fn parse(raw: Vec<u8>, source: SocketAddr) -> Self {
        let question = wire::decode_query(&raw).ok();
        Self {
            raw,
            source,
            question,
        }
    }

    /// `"<name> <TYPE>"` for log lines, or a placeholder when the question
    /// did not decode.
    pub fn describe(&self) -> String {
        match &self.question {
            Some(q) => format!(
                "{} {}",
                q.name,
                crate::record_type::RecordType::mnemonic(q.qtype)
            ),
            None => "<unparseable>".to_string(),
        }
    }
}
