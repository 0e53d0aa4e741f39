//! HTTP client for the Groq chat-completions API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::EstimateError;
use super::request::{preset_calorie_prompt, EstimateRequest, SYSTEM_PROMPT};
use super::response::{parse_calorie_answer, parse_estimate, Estimate};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

const TEMPERATURE: f64 = 0.3;
const ESTIMATE_MAX_TOKENS: u32 = 500;
const CALORIE_MAX_TOKENS: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Estimation gateway backed by Groq.
///
/// Construction fails without an API key, so no request is ever attempted
/// unauthenticated.
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl GroqClient {
    pub fn new(api_key: Option<&str>) -> Result<Self, EstimateError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(EstimateError::GatewayUnavailable)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EstimateError::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Estimates a meal or activity. Requests with an image go to the vision
    /// model.
    pub async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate, EstimateError> {
        if request.is_empty() {
            return Err(EstimateError::EmptyRequest);
        }

        let body = self.estimate_body(request);
        tracing::debug!(
            model = body.model,
            image = request.attachment().is_some(),
            "Requesting estimate"
        );
        let reply = self.complete(&body).await?;
        parse_estimate(&reply)
    }

    /// Asks for the calories in one `unit` of `name`.
    pub async fn estimate_preset_calories(
        &self,
        name: &str,
        unit: &str,
    ) -> Result<u32, EstimateError> {
        let body = ChatRequest {
            model: &self.text_model,
            messages: vec![
                ChatMessage::text(
                    "system",
                    "You are a nutrition expert. Respond with valid JSON only.",
                ),
                ChatMessage::text("user", preset_calorie_prompt(name, unit)),
            ],
            temperature: TEMPERATURE,
            max_completion_tokens: CALORIE_MAX_TOKENS,
        };
        let reply = self.complete(&body).await?;
        parse_calorie_answer(&reply)
    }

    fn estimate_body(&self, request: &EstimateRequest) -> ChatRequest<'_> {
        let prompt = request.user_prompt();
        let (model, user) = match request.attachment() {
            Some(image) => (
                self.vision_model.as_str(),
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text { text: prompt },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: image.data_url(),
                            },
                        },
                    ]),
                },
            ),
            None => (self.text_model.as_str(), ChatMessage::text("user", prompt)),
        };

        ChatRequest {
            model,
            messages: vec![ChatMessage::text("system", SYSTEM_PROMPT), user],
            temperature: TEMPERATURE,
            max_completion_tokens: ESTIMATE_MAX_TOKENS,
        }
    }

    /// Sends a completion request and returns the first choice's text.
    async fn complete(&self, body: &ChatRequest<'_>) -> Result<String, EstimateError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| EstimateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Estimation request failed");
            return Err(classify_status(status, &text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EstimateError::GatewayParseError(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| EstimateError::GatewayParseError("empty response".into()))
    }
}

/// Maps a failed HTTP status to an error. Rejected credentials get their own
/// variant so the user knows to fix the key.
fn classify_status(status: StatusCode, body: &str) -> EstimateError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return EstimateError::GatewayAuthError;
    }
    let lowered = body.to_ascii_lowercase();
    if lowered.contains("api key") || lowered.contains("invalid_api_key") {
        return EstimateError::GatewayAuthError;
    }
    EstimateError::Http(format!("HTTP {}: {}", status, body.trim()))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

impl ChatMessage {
    fn text(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::Attachment;

    fn client() -> GroqClient {
        // Port 9 (discard): nothing in these tests should reach the network.
        GroqClient::new(Some("gsk_test"))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/")
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        assert_eq!(
            GroqClient::new(None).unwrap_err(),
            EstimateError::GatewayUnavailable
        );
        assert_eq!(
            GroqClient::new(Some("   ")).unwrap_err(),
            EstimateError::GatewayUnavailable
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(client().base_url(), "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn test_empty_request_rejected_before_network() {
        let err = client()
            .estimate(&EstimateRequest::new(None))
            .await
            .unwrap_err();
        assert_eq!(err, EstimateError::EmptyRequest);
    }

    #[test]
    fn test_text_body() {
        let client = client();
        let request = EstimateRequest::new(Some("2 boiled eggs".into()));
        let body = serde_json::to_value(client.estimate_body(&request)).unwrap();

        assert_eq!(body["model"], DEFAULT_TEXT_MODEL);
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["max_completion_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("2 boiled eggs"));
    }

    #[test]
    fn test_image_body_uses_vision_model() {
        let client = client().with_vision_model("vision-test");
        let image = Attachment::new(b"abc".to_vec(), "image/png").unwrap();
        let request = EstimateRequest::new(None).with_attachment(image);
        let body = serde_json::to_value(client.estimate_body(&request)).unwrap();

        assert_eq!(body["model"], "vision-test");
        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, ""),
            EstimateError::GatewayAuthError
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, ""),
            EstimateError::GatewayAuthError
        );
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST, r#"{"error":{"code":"invalid_api_key"}}"#),
            EstimateError::GatewayAuthError
        );
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            EstimateError::Http(_)
        ));
    }

    #[test]
    fn test_chat_response_shape() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("{}"));
    }
}
