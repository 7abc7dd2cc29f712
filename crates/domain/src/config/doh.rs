use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DohConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// DNS-over-HTTPS JSON endpoint queried with `?name=...&type=...`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for DohConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://dns.google/resolve".to_string()
}
