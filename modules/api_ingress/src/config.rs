use serde::{Deserialize, Serialize};

/// HTTP host settings; read from `modules.api_ingress`, with the listen
/// address and handler timeout filled in from the `server` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    pub bind_addr: String,
    pub cors_enabled: bool,
    /// Handler timeout in seconds; 0 (the default) disables it.
    pub request_timeout_sec: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_string(),
            cors_enabled: false,
            request_timeout_sec: 0,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}
