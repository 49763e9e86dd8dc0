use serde::{Deserialize, Serialize};

use crate::types::Role;

/// A single role-tagged message in the conversation.
///
/// The same shape is sent to the server as an element of the `messages`
/// array of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,

    /// The text of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serialization() {
        let message = Message::user("Why is the sky blue?");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": "Why is the sky blue?"
            })
        );
    }

    #[test]
    fn message_deserialization() {
        let message: Message = serde_json::from_value(json!({
            "role": "assistant",
            "content": "Rayleigh scattering."
        }))
        .unwrap();
        assert_eq!(message, Message::assistant("Rayleigh scattering."));
    }

    #[test]
    fn from_str_is_user() {
        let message = Message::from("hi");
        assert_eq!(message.role, Role::User);
    }
}
