//! The inference backend seam.
//!
//! Chat sessions never talk HTTP directly.  They go through [`Backend`], which
//! lists the installed models and opens a stream of text fragments for one
//! turn.  [`Ollama`] is the production implementation; tests substitute
//! scripted backends.

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};

use crate::{ChatRequest, Error, Message, Ollama, Temperature};

/// A lazily produced sequence of text fragments for a single assistant turn.
///
/// Any item may be an error; consumers stop at the first one.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// An inference server that can list models and stream completions.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Returns the identifiers of the installed models, in server order.
    async fn list_models(&self) -> Result<Vec<String>, Error>;

    /// Opens a completion stream for `prompt` using `model` and `temperature`.
    ///
    /// Fragments with no text are never yielded.
    async fn stream_completion(
        &self,
        model: &str,
        temperature: Temperature,
        prompt: &[Message],
    ) -> Result<FragmentStream, Error>;
}

#[async_trait::async_trait]
impl Backend for Ollama {
    async fn list_models(&self) -> Result<Vec<String>, Error> {
        Ok(self.list().await?.ids())
    }

    async fn stream_completion(
        &self,
        model: &str,
        temperature: Temperature,
        prompt: &[Message],
    ) -> Result<FragmentStream, Error> {
        let request = ChatRequest::new(model, prompt.to_vec()).with_temperature(temperature);
        let chunks = self.stream_chat(request).await?;
        let fragments = chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) => chunk.into_fragment().transpose(),
                Err(err) => Some(Err(err)),
            }
        });
        Ok(Box::pin(fragments))
    }
}
