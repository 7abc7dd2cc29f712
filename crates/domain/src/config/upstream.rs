use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Upstream DNS server, `ip:port`.
    #[serde(default = "default_server")]
    pub server: String,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,

    /// Total attempts per query (timeouts, transport errors and id
    /// mismatches all consume one attempt).
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            query_timeout: default_query_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_server() -> String {
    "8.8.8.8:53".to_string()
}

fn default_query_timeout() -> u64 {
    2000
}

fn default_retries() -> u32 {
    3
}
