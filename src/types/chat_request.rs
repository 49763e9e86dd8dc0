use serde::{Deserialize, Serialize};

use crate::types::{Message, Temperature};

/// Sampling options forwarded to the model runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Sampling temperature.
    pub temperature: Temperature,
}

/// Body of a `POST /api/chat` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to chat with, e.g. `gemma3:270m`.
    pub model: String,

    /// The prompt context, oldest first.
    pub messages: Vec<Message>,

    /// Whether the server should stream newline-delimited chunks.
    pub stream: bool,

    /// Sampling options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

impl ChatRequest {
    /// Create a new streaming request.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            options: None,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.options = Some(ChatOptions { temperature });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn chat_request_serialization() {
        let request = ChatRequest::new("gemma3:270m", vec![Message::user("hello")])
            .with_temperature(Temperature::new(0.5).unwrap());
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "model": "gemma3:270m",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": true,
                "options": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn options_are_optional() {
        let request = ChatRequest::new("m", vec![]);
        let json = to_value(&request).unwrap();
        assert!(json.get("options").is_none());
    }
}
