use serde::{Deserialize, Serialize};

use crate::Error;

/// The message payload carried by a streamed chat chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkMessage {
    /// Role reported by the server; always `assistant` for chat output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The text fragment.
    #[serde(default)]
    pub content: String,
}

/// One line of the newline-delimited JSON stream returned by `POST /api/chat`.
///
/// Intermediate chunks carry a fragment in `message.content`; the final chunk
/// has `done: true` and timing statistics.  A chunk with `error` set reports a
/// failure that happened after the response headers were sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatChunk {
    /// The model producing the stream.
    #[serde(default)]
    pub model: String,

    /// Creation timestamp as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// The fragment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChunkMessage>,

    /// Whether this is the last chunk.
    #[serde(default)]
    pub done: bool,

    /// Why generation stopped, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,

    /// Number of prompt tokens evaluated, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,

    /// Number of tokens generated, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,

    /// Wall time of the whole request in nanoseconds, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,

    /// In-band error reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatChunk {
    /// Converts the chunk into the text fragment it carries.
    ///
    /// Chunks without text (such as the final statistics chunk) yield
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a streaming error if the server reported one in-band.
    pub fn into_fragment(self) -> Result<Option<String>, Error> {
        if let Some(error) = self.error {
            return Err(Error::streaming(error, None));
        }
        Ok(self
            .message
            .map(|message| message.content)
            .filter(|content| !content.is_empty()))
    }
}
