use std::path::Path;

use crate::attachment;
use crate::error::{ApiError, AttachmentError};
use crate::gemini::Part;
use crate::session::ChatSession;

pub const EMPTY_PROMPT_REPLY: &str = "Please enter a question or instruction.";
pub const API_ERROR_PREFIX: &str = "API error: ";

/// Turns user input into a request on the conversation and always answers
/// with a displayable string.
pub struct Relay {
    session: Option<ChatSession>,
}

impl Relay {
    pub fn new(session: Option<ChatSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub async fn send(&mut self, text: &str, image_path: Option<&Path>) -> String {
        let mut parts = Vec::with_capacity(2);

        if let Some(path) = image_path {
            match attachment::load_image(path) {
                Ok(part) => parts.push(part),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not load attachment");
                    return attachment_error_reply(path, &e);
                }
            }
        }

        let text = text.trim();
        if text.is_empty() {
            return EMPTY_PROMPT_REPLY.to_string();
        }
        parts.push(Part::text(text));

        let Some(session) = self.session.as_mut() else {
            tracing::warn!("send attempted without a chat session");
            return api_error_reply(&ApiError::NoSession);
        };

        tracing::info!(
            parts = parts.len(),
            with_image = parts.iter().any(|p| p.is_image()),
            "sending turn"
        );
        match session.send_message(parts).await {
            Ok(reply) => {
                tracing::debug!(history = session.history().len(), "turn completed");
                reply
            }
            Err(e) => {
                tracing::error!(error = %e, "model call failed");
                api_error_reply(&e)
            }
        }
    }
}

fn attachment_error_reply(path: &Path, err: &AttachmentError) -> String {
    match err {
        AttachmentError::NotFound(_) => format!(
            "Error: image file not found at path: {}. Check the path.",
            path.display()
        ),
        other => format!("Error opening the image: {other}"),
    }
}

fn api_error_reply(err: &ApiError) -> String {
    format!("{API_ERROR_PREFIX}{err}")
}
