use std::path::PathBuf;

use crate::attachment::PendingAttachment;
use crate::message::Message;
use crate::relay::Relay;

pub const DEFAULT_IMAGE_QUESTION: &str = "Describe this image.";

/// What the view asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Attach(PathBuf),
    ClearAttachment,
    Send(String),
}

/// One completed exchange, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub user: Message,
    pub reply: Message,
}

/// Owns the relay and the staged attachment; the view only talks to this.
pub struct ChatController {
    relay: Relay,
    pending: PendingAttachment,
}

impl ChatController {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay,
            pending: PendingAttachment::default(),
        }
    }

    pub fn pending(&self) -> &PendingAttachment {
        &self.pending
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Applies an intent. Only `Send` with something to say produces a turn.
    pub async fn handle(&mut self, intent: Intent) -> Option<Turn> {
        match intent {
            Intent::Attach(path) => {
                tracing::debug!(path = %path.display(), "attachment staged");
                self.pending.set(path);
                None
            }
            Intent::ClearAttachment => {
                self.pending.clear();
                None
            }
            Intent::Send(text) => self.send(&text).await,
        }
    }

    async fn send(&mut self, text: &str) -> Option<Turn> {
        let text = text.trim();
        if text.is_empty() && !self.pending.is_set() {
            return None;
        }

        // Cleared before the call so a failed turn never leaves it staged.
        let image = self.pending.take();
        let question = if text.is_empty() {
            DEFAULT_IMAGE_QUESTION
        } else {
            text
        };

        let reply = self.relay.send(question, image.as_deref()).await;
        Some(Turn {
            user: Message::user(question, image),
            reply: Message::assistant(reply),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::tests::write_image;
    use crate::session::tests::{open_session, FakeBackend};
    use image::ImageFormat;
    use std::sync::Arc;

    async fn controller(backend: Arc<FakeBackend>) -> ChatController {
        ChatController::new(Relay::new(Some(open_session(backend).await)))
    }

    #[tokio::test]
    async fn blank_send_without_attachment_is_ignored() {
        let backend = Arc::new(FakeBackend::default());
        let mut controller = controller(backend.clone()).await;

        assert_eq!(controller.handle(Intent::Send("  ".into())).await, None);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn attachment_cleared_after_successful_send() {
        let backend = Arc::new(FakeBackend::default());
        let mut controller = controller(backend.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "mole.png", ImageFormat::Png);

        controller.handle(Intent::Attach(path.clone())).await;
        assert!(controller.pending().is_set());

        let turn = controller.handle(Intent::Send(String::new())).await.unwrap();
        assert_eq!(turn.user, Message::user(DEFAULT_IMAGE_QUESTION, Some(path)));
        assert_eq!(turn.reply, Message::assistant("reply #1"));
        assert_eq!(backend.last_parts().len(), 2);
        assert!(!controller.pending().is_set());
    }

    #[tokio::test]
    async fn attachment_cleared_after_failed_send() {
        let backend = Arc::new(FakeBackend::default());
        let mut controller = controller(backend.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");

        controller.handle(Intent::Attach(missing)).await;
        let turn = controller.handle(Intent::Send("look".into())).await.unwrap();
        assert!(turn.reply.text.starts_with("Error: image file not found"));
        assert!(!controller.pending().is_set());

        // next turn goes out as text only
        controller.handle(Intent::Send("and now?".into())).await.unwrap();
        assert_eq!(backend.last_parts().len(), 1);
    }

    #[tokio::test]
    async fn clear_attachment_drops_staged_file() {
        let mut controller = controller(Arc::new(FakeBackend::default())).await;
        controller.handle(Intent::Attach(PathBuf::from("a.png"))).await;
        controller.handle(Intent::ClearAttachment).await;
        assert!(!controller.pending().is_set());
    }

    #[tokio::test]
    async fn remote_failure_still_produces_turn() {
        let backend = Arc::new(FakeBackend {
            fail_generate: true,
            ..Default::default()
        });
        let mut controller = controller(backend).await;

        let turn = controller.handle(Intent::Send("hello".into())).await.unwrap();
        assert!(turn.user.is_user());
        assert!(turn.reply.text.starts_with(crate::relay::API_ERROR_PREFIX));
    }
}
