//! DNS-over-HTTPS JSON transport.
//!
//! Resolves through a JSON API of the `https://dns.google/resolve` family:
//! an HTTPS GET carrying `name` and `type` query parameters, answered with a
//! JSON body. The reply is rebuilt into wire format preserving the client's
//! transaction id and question section.
//!
//! ```text
//! GET /resolve?name=example.com&type=1 HTTP/2
//!
//! {"Status":0,"Answer":[{"name":"example.com","type":1,"TTL":60,"data":"..."}]}
//! ```

use super::rdata;
use async_trait::async_trait;
use relay_dns_application::UpstreamResolver;
use relay_dns_domain::config::DohConfig;
use relay_dns_domain::{wire, RelayError, RelayQuery, ResourceRecord, ResponseFlags};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

pub struct DohUpstream {
    endpoint: String,
    timeout: Duration,
}

/// JSON body of a DoH `/resolve`-style answer. All fields are optional on
/// the wire; absent flags default to false and an absent `Status` to 0.
#[derive(Debug, Deserialize)]
pub struct DohJsonBody {
    #[serde(rename = "Status", default)]
    pub status: u16,
    #[serde(rename = "TC", default)]
    pub tc: bool,
    #[serde(rename = "RD", default)]
    pub rd: bool,
    #[serde(rename = "RA", default)]
    pub ra: bool,
    #[serde(rename = "AD", default)]
    pub ad: bool,
    #[serde(rename = "CD", default)]
    pub cd: bool,
    #[serde(rename = "Answer")]
    pub answer: Option<Vec<DohJsonRecord>>,
    #[serde(rename = "Authority")]
    pub authority: Option<Vec<DohJsonRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct DohJsonRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: u16,
    #[serde(rename = "TTL", default)]
    pub ttl: u32,
    pub data: String,
}

impl DohUpstream {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn from_config(config: &DohConfig, timeout: Duration) -> Self {
        Self::new(config.endpoint.clone(), timeout)
    }
}

/// Rebuilds a wire-format response from a parsed JSON body.
///
/// Answer entries (then Authority, when present) become answer records in the
/// order received, each under its own declared owner name — a CNAME chain
/// keeps the intermediate names. Entries whose data does not parse for their
/// declared type are skipped individually; only a body that yields zero
/// records fails, with `EmptyAnswer`, so the orchestrator can fall back.
pub fn build_wire_response(
    query: &RelayQuery,
    body: &DohJsonBody,
) -> Result<Vec<u8>, RelayError> {
    let question = query
        .question
        .as_ref()
        .ok_or_else(|| RelayError::MalformedQuery("no decoded question".into()))?;

    let answer = body.answer.as_ref().ok_or(RelayError::EmptyAnswer)?;

    let mut records: Vec<ResourceRecord> = Vec::with_capacity(answer.len());
    let authority = body.authority.iter().flatten();
    for entry in answer.iter().chain(authority) {
        match rdata::from_presentation(entry.rtype, &entry.data) {
            Some(rdata) => records.push(ResourceRecord {
                name: entry.name.clone(),
                rtype: entry.rtype,
                ttl: entry.ttl,
                rdata,
            }),
            None => {
                trace!(
                    name = %entry.name,
                    rtype = entry.rtype,
                    "Skipping answer entry with unparseable data"
                );
            }
        }
    }

    if records.is_empty() {
        return Err(RelayError::EmptyAnswer);
    }

    let flags = ResponseFlags {
        tc: body.tc,
        rd: body.rd,
        ra: body.ra,
        ad: body.ad,
        cd: body.cd,
        rcode: (body.status & 0x0F) as u8,
    };

    wire::encode_response(&query.raw, question, flags, &records)
}

#[async_trait]
impl UpstreamResolver for DohUpstream {
    async fn resolve(&self, query: &RelayQuery) -> Result<Vec<u8>, RelayError> {
        let question = query
            .question
            .as_ref()
            .ok_or_else(|| RelayError::MalformedQuery("no decoded question".into()))?;

        debug!(
            endpoint = %self.endpoint,
            name = %question.name,
            qtype = question.qtype,
            "Sending DoH JSON query"
        );

        // Per-request client: upstream HTTP connections are not shared
        // across concurrent requests, mirroring the transient UDP socket.
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RelayError::Transport {
                server: self.endpoint.clone(),
                detail: format!("failed to build HTTP client: {}", e),
            })?;

        let qtype = question.qtype.to_string();
        let response = client
            .get(&self.endpoint)
            .query(&[
                ("name", question.name.as_str()),
                ("type", qtype.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::QueryTimeout
                } else {
                    RelayError::Transport {
                        server: self.endpoint.clone(),
                        detail: e.to_string(),
                    }
                }
            })?;

        if response.status().as_u16() != 200 {
            debug!(
                endpoint = %self.endpoint,
                status = response.status().as_u16(),
                "DoH endpoint returned non-200 status"
            );
            return Err(RelayError::EmptyAnswer);
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::QueryTimeout
            } else {
                RelayError::Transport {
                    server: self.endpoint.clone(),
                    detail: format!("failed to read body: {}", e),
                }
            }
        })?;

        let body: DohJsonBody = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "Unparseable DoH JSON body");
                return Err(RelayError::EmptyAnswer);
            }
        };

        build_wire_response(query, &body)
    }

    fn protocol_name(&self) -> &'static str {
        "DoH"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let upstream = DohUpstream::from_config(&DohConfig::default(), Duration::from_secs(2));
        assert_eq!(upstream.endpoint, "https://dns.google/resolve");
        assert_eq!(upstream.protocol_name(), "DoH");
    }

    #[test]
    fn test_body_deserializes_with_missing_fields() {
        let body: DohJsonBody = serde_json::from_str(r#"{"Status":0}"#).unwrap();
        assert_eq!(body.status, 0);
        assert!(!body.tc);
        assert!(body.answer.is_none());
        assert!(body.authority.is_none());
    }

    #[test]
    fn test_record_deserializes_renamed_fields() {
        let record: DohJsonRecord = serde_json::from_str(
            r#"{"name":"example.com.","type":1,"TTL":60,"data":"93.184.216.34"}"#,
        )
        .unwrap();
        assert_eq!(record.name, "example.com.");
        assert_eq!(record.rtype, 1);
        assert_eq!(record.ttl, 60);
    }
}
