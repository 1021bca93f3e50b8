//! ureq-based HTTP transport

use super::{HttpRequest, Transport};
use crate::config::RequestConfig;
use crate::error::RequestError;
use std::time::Duration;

/// Blocking HTTP transport with an explicit whole-request timeout
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(config: &RequestConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        if config.endpoint.starts_with("http://")
            && !config.endpoint.contains("localhost")
            && !config.endpoint.contains("127.0.0.1")
        {
            tracing::warn!("Completion endpoint uses HTTP without TLS. The API key will be sent unencrypted!");
        }

        Self { agent, timeout }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, request: &HttpRequest) -> Result<String, RequestError> {
        let mut call = self
            .agent
            .post(&request.url)
            .set("Content-Type", "application/json");
        for (name, value) in &request.query {
            call = call.query(name, value);
        }

        let response = call.send_string(&request.body).map_err(|e| match e {
            ureq::Error::Status(code, resp) => {
                let body = resp.into_string().unwrap_or_default();
                RequestError::new(format!("Server returned {}: {}", code, body.trim()))
            }
            ureq::Error::Transport(t) => {
                let msg = t.to_string();
                if msg.contains("timed out") || msg.contains("timeout") {
                    RequestError::new(format!(
                        "No response within {}s (request.timeout_secs)",
                        self.timeout.as_secs()
                    ))
                } else {
                    RequestError::new(redact_query(&msg, &request.query))
                }
            }
        })?;

        response
            .into_string()
            .map_err(|e| RequestError::new(format!("Failed to read response body: {}", e)))
    }
}

/// Transport errors quote the full URL, API key included
fn redact_query(message: &str, query: &[(String, String)]) -> String {
    query
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(message.to_string(), |msg, (_, value)| msg.replace(value.as_str(), "***"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_config() {
        let config = RequestConfig {
            endpoint: "https://example.com".to_string(),
            timeout_secs: 7,
        };
        assert_eq!(UreqTransport::new(&config).timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_redact_query() {
        let query = vec![("key".to_string(), "AIzaSecret".to_string())];
        assert_eq!(
            redact_query("https://h/x?key=AIzaSecret: Connection Failed", &query),
            "https://h/x?key=***: Connection Failed"
        );
    }

    #[test]
    fn test_unreachable_host_is_request_error() {
        let config = RequestConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        };
        let transport = UreqTransport::new(&config);
        let request = HttpRequest {
            url: "http://127.0.0.1:9/v1beta/models/m:generateContent".to_string(),
            query: vec![("key".to_string(), "k".to_string())],
            body: "{}".to_string(),
        };
        assert!(transport.post_json(&request).is_err());
    }
}
