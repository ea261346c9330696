// ABOUTME: Streamable HTTP transport for MCP communication.
// ABOUTME: POSTs JSON-RPC and accepts JSON or SSE replies, with session tracking.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Transport;
use crate::auth::CredentialProvider;
use crate::error::McpError;
use crate::mcp::{McpNotification, McpRequest, McpResponse};

const SESSION_HEADER: &str = "Mcp-Session-Id";

/// Options for building the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("mcp-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP transport - MCP "streamable HTTP".
///
/// - POST with JSON-RPC request body
/// - Reply is either `application/json` or a `text/event-stream` carrying the response
/// - Server may assign an `Mcp-Session-Id`, echoed on later requests and
///   released with DELETE on shutdown
pub struct HttpTransport {
    endpoint_url: String,
    http_client: reqwest::Client,
    authorization: Option<String>,
    session_id: Mutex<Option<String>>,
}

impl HttpTransport {
    /// Connect to an HTTP MCP server.
    ///
    /// The credential provider is asked for a header once per connection.
    pub async fn connect(
        url: &str,
        credentials: Option<&dyn CredentialProvider>,
        options: &HttpOptions,
    ) -> Result<Self, McpError> {
        reqwest::Url::parse(url).map_err(|e| McpError::Connection(format!("Invalid URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| McpError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let authorization = match credentials {
            Some(provider) => Some(provider.authorization().await?),
            None => None,
        };

        Ok(Self {
            endpoint_url: url.to_string(),
            http_client,
            authorization,
            session_id: Mutex::new(None),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Current session id, if the server assigned one.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.lock().await.clone()
    }

    async fn post(&self, body: String) -> Result<reqwest::Response, McpError> {
        let mut req_builder = self
            .http_client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/event-stream");

        if let Some(auth) = &self.authorization {
            req_builder = req_builder.header("Authorization", auth);
        }
        if let Some(session_id) = self.session_id.lock().await.as_ref() {
            req_builder = req_builder.header(SESSION_HEADER, session_id.clone());
        }

        let response = req_builder
            .body(body)
            .send()
            .await
            .map_err(|e| McpError::Connection(format!("HTTP request failed: {}", e)))?;

        if let Some(id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.lock().await = Some(id.to_string());
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint_url
    }

    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError> {
        let request_id = request.id;
        let response = self.post(serde_json::to_string(&request)?).await?;

        let is_stream = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let body = response
            .text()
            .await
            .map_err(|e| McpError::Protocol(format!("Failed to read response: {}", e)))?;

        let mcp_response = if is_stream {
            parse_event_stream(&body, request_id)?
        } else {
            serde_json::from_str::<McpResponse>(&body)
                .map_err(|e| McpError::Protocol(format!("Invalid JSON-RPC response: {}", e)))?
        };

        if mcp_response.id != request_id {
            return Err(McpError::Protocol(format!(
                "Response ID {} does not match request ID {}",
                mcp_response.id, request_id
            )));
        }

        Ok(mcp_response)
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError> {
        self.post(serde_json::to_string(&notification)?).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        let Some(session_id) = self.session_id.lock().await.take() else {
            return Ok(());
        };

        let mut req_builder = self
            .http_client
            .delete(&self.endpoint_url)
            .header(SESSION_HEADER, session_id);
        if let Some(auth) = &self.authorization {
            req_builder = req_builder.header("Authorization", auth);
        }

        // Servers may refuse explicit termination (405); the session is gone either way.
        if let Err(e) = req_builder.send().await {
            tracing::debug!(endpoint = %self.endpoint_url, error = %e, "Session DELETE failed");
        }
        Ok(())
    }
}

/// Pull the JSON-RPC response for `request_id` out of an SSE body.
///
/// Events are separated by blank lines; multiple `data:` lines in one event
/// are joined with newlines. Events that are not the awaited response
/// (server notifications, other ids) are skipped.
fn parse_event_stream(body: &str, request_id: u64) -> Result<McpResponse, McpError> {
    let normalized = body.replace("\r\n", "\n");

    for raw_event in normalized.split("\n\n") {
        let data = raw_event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.strip_prefix(' ').unwrap_or(d))
            .collect::<Vec<_>>()
            .join("\n");

        if data.is_empty() {
            continue;
        }

        if let Ok(response) = serde_json::from_str::<McpResponse>(&data) {
            if response.id == request_id {
                return Ok(response);
            }
        }
    }

    Err(McpError::Protocol(format!(
        "No response for request {} in event stream",
        request_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedToken;

    #[async_trait]
    impl CredentialProvider for FixedToken {
        async fn authorization(&self) -> Result<String, crate::error::AuthError> {
            Ok("Bearer test-token".to_string())
        }
    }

    #[tokio::test]
    async fn test_connect_valid_url() {
        let result =
            HttpTransport::connect("http://localhost:8080/mcp", None, &HttpOptions::default()).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().endpoint_url(), "http://localhost:8080/mcp");
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let result = HttpTransport::connect("not-a-valid-url", None, &HttpOptions::default()).await;
        assert!(matches!(result, Err(McpError::Connection(_))));
    }

    #[test]
    fn test_parse_event_stream_skips_other_events() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n\
                    event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{\"ok\":true}}\n\n";
        let response = parse_event_stream(body, 7).unwrap();
        assert_eq!(response.id, 7);
        assert_eq!(response.result.unwrap()["ok"], true);
    }

    #[test]
    fn test_parse_event_stream_missing_response() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\r\n\r\n";
        assert!(matches!(
            parse_event_stream(body, 2),
            Err(McpError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_send_json_reply_with_auth_and_session() {
        let server = MockServer::start().await;
        let request = McpRequest::new("ping", None);

        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(SESSION_HEADER, "sess-1")
                    .set_body_json(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": request.id,
                        "result": {}
                    })),
            )
            .mount(&server)
            .await;

        let transport =
            HttpTransport::connect(&server.uri(), Some(&FixedToken), &HttpOptions::default())
                .await
                .unwrap();
        let response = transport.send(request).await.unwrap();

        assert!(response.error.is_none());
        assert_eq!(transport.session_id().await.as_deref(), Some("sess-1"));
    }

    #[tokio::test]
    async fn test_send_event_stream_reply() {
        let server = MockServer::start().await;
        let request = McpRequest::new("tools/list", None);
        let body = format!(
            "event: message\ndata: {{\"jsonrpc\":\"2.0\",\"id\":{},\"result\":{{\"tools\":[]}}}}\n\n",
            request.id
        );

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::connect(&server.uri(), None, &HttpOptions::default())
            .await
            .unwrap();
        let response = transport.send(request).await.unwrap();
        assert!(response.result.unwrap()["tools"].is_array());
    }

    #[tokio::test]
    async fn test_send_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let transport = HttpTransport::connect(&server.uri(), None, &HttpOptions::default())
            .await
            .unwrap();
        let result = transport.send(McpRequest::new("ping", None)).await;

        match result {
            Err(McpError::Http { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("Expected McpError::Http, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_releases_session() {
        let server = MockServer::start().await;
        let request = McpRequest::new("ping", None);

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(SESSION_HEADER, "sess-9")
                    .set_body_json(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": request.id,
                        "result": {}
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(header(SESSION_HEADER, "sess-9"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::connect(&server.uri(), None, &HttpOptions::default())
            .await
            .unwrap();
        transport.send(request).await.unwrap();
        transport.shutdown().await.unwrap();

        assert!(transport.session_id().await.is_none());
    }
}
