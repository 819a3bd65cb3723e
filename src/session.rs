use std::sync::Arc;

use crate::error::ApiError;
use crate::gemini::{ChatBackend, Content, Part};

pub const GREETING: &str =
    "Hello! I'm medmed, your multimodal medical assistant. How can I help you today?";

/// Client-side handle to one conversation with the model.
///
/// The hosted API keeps no state between calls, so the handle carries the
/// turns exchanged so far and resends them with every message.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    model: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Sends one user turn. History only grows when the model answers.
    pub async fn send_message(&mut self, parts: Vec<Part>) -> Result<String, ApiError> {
        self.history.push(Content::user(parts));

        match self.backend.generate(&self.model, &self.history).await {
            Ok(reply) => {
                self.history.push(Content::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }
}

/// Result of opening the conversation at startup.
pub struct SessionStart {
    pub session: Option<ChatSession>,
    /// Greeting on success, otherwise the failure text; shown as the first message.
    pub message: String,
}

pub struct SessionManager;

impl SessionManager {
    pub async fn initialize(backend: Arc<dyn ChatBackend>, model: &str) -> SessionStart {
        match backend.check_model(model).await {
            Ok(()) => {
                tracing::info!(model, "chat session created");
                SessionStart {
                    session: Some(ChatSession {
                        backend,
                        model: model.to_string(),
                        history: Vec::new(),
                    }),
                    message: GREETING.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(model, error = %e, "failed to create chat session");
                SessionStart {
                    session: None,
                    message: format!("Error creating the chat session: {e}"),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    /// Records every call and answers from a fixed script.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub fail_check: bool,
        pub fail_generate: bool,
        pub calls: Mutex<Vec<Vec<Content>>>,
    }

    impl FakeBackend {
        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Parts of the newest user turn of the most recent call.
        pub(crate) fn last_parts(&self) -> Vec<Part> {
            let calls = self.calls.lock().unwrap();
            calls
                .last()
                .and_then(|contents| contents.last())
                .map(|c| c.parts.clone())
                .unwrap_or_default()
        }
    }

    impl ChatBackend for FakeBackend {
        fn check_model<'a>(&'a self, _model: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(async move {
                if self.fail_check {
                    Err(ApiError::Status {
                        status: 403,
                        message: "API key not valid.".to_string(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn generate<'a>(
            &'a self,
            _model: &'a str,
            contents: &'a [Content],
        ) -> BoxFuture<'a, Result<String, ApiError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(contents.to_vec());
                if self.fail_generate {
                    Err(ApiError::Status {
                        status: 429,
                        message: "Resource has been exhausted".to_string(),
                    })
                } else {
                    Ok(format!("reply #{}", self.call_count()))
                }
            })
        }
    }

    pub(crate) async fn open_session(backend: Arc<FakeBackend>) -> ChatSession {
        SessionManager::initialize(backend, "gemini-2.5-flash")
            .await
            .session
            .expect("session")
    }

    #[tokio::test]
    async fn initialize_returns_greeting() {
        let start = SessionManager::initialize(Arc::new(FakeBackend::default()), "gemini-2.5-flash").await;
        assert_eq!(start.message, GREETING);
        let session = start.session.unwrap();
        assert_eq!(session.model(), "gemini-2.5-flash");
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn initialize_failure_is_reported_not_fatal() {
        let backend = FakeBackend {
            fail_check: true,
            ..Default::default()
        };
        let start = SessionManager::initialize(Arc::new(backend), "gemini-2.5-flash").await;
        assert!(start.session.is_none());
        assert_eq!(
            start.message,
            "Error creating the chat session: server returned 403: API key not valid."
        );
    }

    #[tokio::test]
    async fn successful_turns_accumulate_history() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = open_session(backend.clone()).await;

        assert_eq!(session.send_message(vec![Part::text("hi")]).await.unwrap(), "reply #1");
        assert_eq!(session.send_message(vec![Part::text("again")]).await.unwrap(), "reply #2");

        assert_eq!(session.history().len(), 4);
        assert_eq!(session.history()[1], Content::model("reply #1"));
        // second call carried the first exchange plus the new turn
        assert_eq!(backend.calls.lock().unwrap()[1].len(), 3);
    }

    #[tokio::test]
    async fn failed_turn_leaves_history_untouched() {
        let backend = Arc::new(FakeBackend {
            fail_generate: true,
            ..Default::default()
        });
        let mut session = open_session(backend.clone()).await;

        assert!(session.send_message(vec![Part::text("hi")]).await.is_err());
        assert!(session.history().is_empty());
        assert_eq!(backend.call_count(), 1);
    }
}
