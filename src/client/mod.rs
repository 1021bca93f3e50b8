//! Completion client
//!
//! Wraps the prompt in the provider's `generateContent` request shape,
//! POSTs it through a [`Transport`] and turns the reply body into plain text.

mod transport;

pub use transport::UreqTransport;

use crate::config::RequestConfig;
use crate::error::RequestError;
use crate::text;
use serde::Serialize;

/// One outbound HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// URL without query string
    pub url: String,
    /// Query parameters, encoded by the transport
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: String,
}

/// Trait for the HTTP layer, so the client can run against a fake server
pub trait Transport {
    /// POST a JSON body and return the full response body
    ///
    /// Transport failures and non-success statuses are both a
    /// `RequestError` carrying the diagnostic text.
    fn post_json(&self, request: &HttpRequest) -> Result<String, RequestError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Client for the `generateContent` endpoint
pub struct CompletionClient {
    transport: Box<dyn Transport>,
    endpoint: String,
}

impl CompletionClient {
    pub fn new(transport: Box<dyn Transport>, config: &RequestConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Send one prompt and return the cleaned answer
    ///
    /// A body that cannot be parsed is still a successful request; the
    /// returned text then describes the extraction failure.
    pub fn ask(&self, prompt: &str, api_key: &str, model: &str) -> Result<String, RequestError> {
        let request = self.build_request(prompt, api_key, model)?;

        tracing::debug!(
            "POST {} ({} prompt chars)",
            request.url,
            prompt.chars().count()
        );
        let start = std::time::Instant::now();

        let body = self.transport.post_json(&request)?;

        tracing::debug!(
            "Response received in {:.2}s ({} bytes)",
            start.elapsed().as_secs_f32(),
            body.len()
        );

        Ok(text::extract(&body))
    }

    fn build_request(
        &self,
        prompt: &str,
        api_key: &str,
        model: &str,
    ) -> Result<HttpRequest, RequestError> {
        let body = serde_json::to_string(&GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        })
        .map_err(|e| RequestError::new(format!("Failed to encode request: {}", e)))?;

        Ok(HttpRequest {
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint, model
            ),
            query: vec![("key".to_string(), api_key.to_string())],
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Transport that records requests and replays a canned result
    struct FakeTransport {
        reply: Result<String, RequestError>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl Transport for FakeTransport {
        fn post_json(&self, request: &HttpRequest) -> Result<String, RequestError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn client(reply: Result<String, RequestError>) -> (CompletionClient, Arc<Mutex<Vec<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = FakeTransport {
            reply,
            seen: seen.clone(),
        };
        (
            CompletionClient::new(Box::new(transport), &RequestConfig::default()),
            seen,
        )
    }

    const OK_BODY: &str =
        r#"{"candidates":[{"content":{"parts":[{"text":"  **Hi** there  "}],"role":"model"}}]}"#;

    #[test]
    fn test_request_shape() {
        let (client, seen) = client(Ok(OK_BODY.to_string()));
        client.ask("What is \"Rust\"?", "k3y", "gemini-2.0-flash").unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let request = &seen[0];
        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(request.query, vec![("key".to_string(), "k3y".to_string())]);

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "What is \"Rust\"?"}]}]})
        );
    }

    #[test]
    fn test_successful_reply_is_extracted() {
        let (client, _) = client(Ok(OK_BODY.to_string()));
        assert_eq!(client.ask("hi", "k", "m").unwrap(), "Hi there");
    }

    #[test]
    fn test_transport_failure_is_request_error() {
        let (client, _) = client(Err(RequestError::new(
            "curl: (6) Could not resolve host",
        )));

        let err = client.ask("hi", "k", "m").unwrap_err();
        assert!(err.diagnostic.contains("Could not resolve host"));
        assert!(err.to_string().contains("Could not resolve host"));
    }

    #[test]
    fn test_unparseable_body_is_still_success() {
        let (client, _) = client(Ok("<html>oops</html>".to_string()));
        let text = client.ask("hi", "k", "m").unwrap();
        assert!(text.starts_with("Error extracting response: "));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let config = RequestConfig {
            endpoint: "http://localhost:9000/".to_string(),
            timeout_secs: 5,
        };
        let transport = FakeTransport {
            reply: Ok(OK_BODY.to_string()),
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let client = CompletionClient::new(Box::new(transport), &config);
        let request = client.build_request("p", "k", "gemini-pro").unwrap();
        assert_eq!(
            request.url,
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
        );
    }
}
