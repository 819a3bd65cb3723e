use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

/// One unit of a multimodal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }

    pub fn is_image(&self) -> bool {
        self.inline_data.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Joined text of the first candidate.
    pub fn text(&self) -> Result<String, ApiError> {
        let text: Option<String> = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            });

        match text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ApiError::EmptyResponse(
                self.prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.clone()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "No error message".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// The remote side of a conversation.
pub trait ChatBackend: Send + Sync {
    /// Confirms the model exists and the credentials are accepted.
    fn check_model<'a>(&'a self, model: &'a str) -> BoxFuture<'a, Result<(), ApiError>>;

    /// Sends the whole conversation and returns the model's reply text.
    fn generate<'a>(
        &'a self,
        model: &'a str,
        contents: &'a [Content],
    ) -> BoxFuture<'a, Result<String, ApiError>>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: Endpoint,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: Endpoint, api_key: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("medmed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    async fn check_model_inner(&self, model: &str) -> Result<(), ApiError> {
        let url = self.endpoint.model_url(model);
        tracing::debug!(%url, "looking up model");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(())
    }

    async fn generate_inner(&self, model: &str, contents: &[Content]) -> Result<String, ApiError> {
        let url = self.endpoint.generate_url(model);
        tracing::debug!(%url, turns = contents.len(), "sending generateContent");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed.text()
    }
}

impl ChatBackend for GeminiClient {
    fn check_model<'a>(&'a self, model: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(self.check_model_inner(model))
    }

    fn generate<'a>(
        &'a self,
        model: &'a str,
        contents: &'a [Content],
    ) -> BoxFuture<'a, Result<String, ApiError>> {
        Box::pin(self.generate_inner(model, contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_parts_in_order() {
        let contents = vec![Content::user(vec![
            Part::image("image/png", "AAAA".to_string()),
            Part::text("what is this?"),
        ])];
        let json = serde_json::to_value(GenerateContentRequest { contents: &contents }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                        { "text": "what is this?" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn joins_text_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().unwrap(), "Hello, world");
    }

    #[test]
    fn empty_candidates_report_block_reason() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = response.text().unwrap_err();
        assert_eq!(err.to_string(), "response contained no text (blocked: SAFETY)");
    }

    #[test]
    fn extracts_error_message_from_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid.");
        assert_eq!(error_message("  "), "No error message");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
