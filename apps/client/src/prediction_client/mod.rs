/// Prediction client — the single point of entry for calls to the prediction service.
///
/// Two endpoints, both `POST` with JSON bodies, addressed relative to the configured base:
/// - `/predict` takes `BirthDetails`, answers `{message}`
/// - `/chat` takes `{message}`, answers `{reply}`
///
/// Failures answer `{error?}` with a non-success status. No retries, no backoff.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::BirthDetails;

#[cfg(test)]
pub mod fake;

/// The prediction service seen from the session controller. Implement this to
/// swap transports without touching the handlers.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Returns the human-readable prediction for a birth chart.
    async fn predict(&self, details: &BirthDetails) -> Result<String, ClientError>;

    /// Returns the reply to a follow-up question.
    async fn chat(&self, message: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    message: String,
}

/// `reply` is the documented field; the development stub answers `message`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpPredictionService {
    client: Client,
    predict_url: String,
    chat_url: String,
}

impl HttpPredictionService {
    pub fn new(endpoint_base: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base = endpoint_base.trim_end_matches('/');
        Ok(Self {
            client: builder.build()?,
            predict_url: format!("{base}/predict"),
            chat_url: format!("{base}/chat"),
        })
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            warn!("{} returned {}: {:?}", url, status, message);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        debug!("{} returned {} ({} bytes)", url, status, text.len());
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn predict(&self, details: &BirthDetails) -> Result<String, ClientError> {
        let response: PredictionResponse = self.post_json(&self.predict_url, details).await?;
        Ok(response.message)
    }

    async fn chat(&self, message: &str) -> Result<String, ClientError> {
        let response: ChatResponse = self
            .post_json(&self.chat_url, &ChatRequest { message })
            .await?;
        response.reply.or(response.message).ok_or_else(|| {
            ClientError::MalformedResponse("response has no `reply` field".to_string())
        })
    }
}

/// Pulls the server's explanation out of a failure body.
///
/// Accepts `{"error": "..."}` and `{"error": {"message": "..."}}`; anything else,
/// including a body that is not JSON at all, yields `None`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(text) => Some(text.clone()),
        Value::Object(obj) => obj.get("message")?.as_str().map(str::to_string),
        _ => None,
    }
}
