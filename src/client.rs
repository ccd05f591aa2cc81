use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GatewayError, FALLBACK_DETAIL};
use crate::state::VerseCitation;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub language: &'a str,
    pub mood: &'a str,
}

/// Successful reply from `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub relevant_verses: Vec<VerseCitation>,
    pub language: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// One request/response exchange with the guidance backend.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_turn(
        &self,
        message: &str,
        language: &str,
        mood: &str,
    ) -> Result<ChatReply, GatewayError>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `GET /health`, returning the reported status
    pub async fn health(&self) -> Result<String, GatewayError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(GatewayError::Transport)?;

        if !response.status().is_success() {
            return Err(classify_failure(response, "health").await);
        }

        let health: HealthResponse = response.json().await.map_err(GatewayError::MalformedReply)?;
        Ok(health.status)
    }
}

#[async_trait]
impl ChatGateway for ChatClient {
    async fn send_turn(
        &self,
        message: &str,
        language: &str,
        mood: &str,
    ) -> Result<ChatReply, GatewayError> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            message,
            language,
            mood,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat request did not get a response");
                GatewayError::Transport(e)
            })?;

        if !response.status().is_success() {
            return Err(classify_failure(response, "chat").await);
        }

        let reply: ChatReply = response.json().await.map_err(|e| {
            warn!(error = %e, "chat reply could not be decoded");
            GatewayError::MalformedReply(e)
        })?;

        debug!(verses = reply.relevant_verses.len(), "chat reply received");
        Ok(reply)
    }
}

/// Map a non-success response from `endpoint` to the error taxonomy
async fn classify_failure(response: reqwest::Response, endpoint: &str) -> GatewayError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(endpoint, "backend is rate limiting");
        return GatewayError::RateLimited;
    }

    // Body is optional and may not be JSON at all
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .filter(|detail| !detail.trim().is_empty());

    warn!(
        endpoint,
        %status,
        detail = detail.as_deref().unwrap_or("<none>"),
        "backend rejected request"
    );
    GatewayError::ServerRejected(detail.unwrap_or_else(|| FALLBACK_DETAIL.to_string()))
}
