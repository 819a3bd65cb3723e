use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// A line in the conversation view.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub image: Option<PathBuf>,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<PathBuf>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            image,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            image: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
