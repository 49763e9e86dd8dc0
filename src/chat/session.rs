//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! the model selection and the last-fetched model catalog, and runs one
//! streaming turn at a time against the backend.

use std::sync::Arc;

use crate::backend::Backend;
use crate::chat::accumulator::{TurnOutcome, interrupted, interruptible, stream_turn};
use crate::chat::config::{ChatConfig, ContextMode};
use crate::chat::conversation::Conversation;
use crate::chat::model_session::ModelSession;
use crate::{Error, Message, Renderer, Result, Temperature};

/// A chat session: one conversation with one model selection.
///
/// All mutation goes through `&mut self`, so a session has a single writer.
/// Event-driven front-ends share a session through a
/// [`SessionHandle`](crate::chat::SessionHandle).
#[derive(Debug)]
pub struct ChatSession {
    model: ModelSession,
    conversation: Conversation,
    catalog: Vec<String>,
    context: ContextMode,
}

impl ChatSession {
    /// Creates a session using the model, temperature and context mode of
    /// `config`.
    pub fn new(backend: Arc<dyn Backend>, config: &ChatConfig) -> Self {
        Self {
            model: ModelSession::new(backend, config.model.clone(), config.temperature),
            conversation: Conversation::new(),
            catalog: Vec::new(),
            context: config.context,
        }
    }

    /// Verifies the backend is reachable, fetching the catalog as a side effect.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the model list cannot be fetched.
    pub async fn check_connection(&mut self) -> Result<()> {
        self.refresh_catalog().await
    }

    /// Sends `line` as a user message and streams the reply into the
    /// conversation.
    ///
    /// The user message is always recorded.  Failures end up as an error
    /// marker on the assistant message and in the returned outcome; they are
    /// never propagated.
    pub async fn send_streaming(
        &mut self,
        line: &str,
        renderer: &mut dyn Renderer,
    ) -> TurnOutcome {
        let message = Message::user(line);
        let prompt = match self.context {
            ContextMode::Latest => vec![message.clone()],
            ContextMode::Full => {
                let mut prompt = self.conversation.snapshot().to_vec();
                prompt.push(message.clone());
                prompt
            }
        };
        self.conversation.append(message);

        let stream = interruptible(&mut *renderer, self.model.handle().stream(&prompt))
            .await
            .unwrap_or_else(|| Err(interrupted()));
        stream_turn(
            &mut self.conversation,
            self.model.model_id(),
            stream,
            renderer,
        )
        .await
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        self.model.model_id()
    }

    /// Returns the current temperature.
    pub fn temperature(&self) -> Temperature {
        self.model.temperature()
    }

    /// The model selection and its connection handle.
    pub fn model_session(&self) -> &ModelSession {
        &self.model
    }

    /// Which messages are sent as prompt context.
    pub fn context(&self) -> ContextMode {
        self.context
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.model.set_temperature(temperature);
    }

    /// Fetches the installed models and remembers them as the catalog.
    ///
    /// On failure the previous catalog is kept.
    pub async fn refresh_catalog(&mut self) -> Result<()> {
        self.catalog = self.model.list_models().await?;
        Ok(())
    }

    /// The most recently fetched catalog.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Switches to a model from the catalog.
    ///
    /// `choice` is either a 1-based index into [`catalog`](Self::catalog) or
    /// an exact model name.  Returns the newly selected model.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range index or a name that
    /// is not in the catalog; the selection is left unchanged.
    pub fn switch_model(&mut self, choice: &str) -> Result<&str> {
        let choice = choice.trim();
        let model = if !choice.is_empty() && choice.bytes().all(|b| b.is_ascii_digit()) {
            choice
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| self.catalog.get(idx))
                .ok_or_else(|| {
                    Error::validation(
                        format!("Invalid model number: {choice}"),
                        Some("model".to_string()),
                    )
                })?
        } else {
            self.catalog
                .iter()
                .find(|model| model.as_str() == choice)
                .ok_or_else(|| {
                    Error::validation(
                        format!("Model not found: {choice}"),
                        Some("model".to_string()),
                    )
                })?
        };
        let model = model.clone();
        self.model.set_model(model);
        Ok(self.model.model_id())
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::backend::FragmentStream;

    struct Fixed;

    #[async_trait::async_trait]
    impl Backend for Fixed {
        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["m1".to_string(), "m2".to_string(), "m3".to_string()])
        }

        async fn stream_completion(
            &self,
            _model: &str,
            _temperature: Temperature,
            prompt: &[Message],
        ) -> Result<FragmentStream> {
            let echo = format!("{} message(s)", prompt.len());
            Ok(Box::pin(stream::iter(vec![Ok(echo)])))
        }
    }

    struct Quiet;

    impl Renderer for Quiet {
        fn render_partial(&mut self, _content: &str) {}
        fn finish_response(&mut self, _message: &Message) {}
        fn render_transcript(&mut self, _messages: &[Message]) {}
        fn print_error(&mut self, _error: &str) {}
        fn print_info(&mut self, _info: &str) {}
    }

    fn session(config: ChatConfig) -> ChatSession {
        ChatSession::new(Arc::new(Fixed), &config)
    }

    #[tokio::test]
    async fn switch_by_index_and_name() {
        let mut session = session(ChatConfig::new());
        session.refresh_catalog().await.unwrap();

        assert_eq!(session.switch_model("2").unwrap(), "m2");
        assert_eq!(session.model_session().handle().model(), "m2");
        assert_eq!(session.switch_model(" m3 ").unwrap(), "m3");

        for bad in ["9", "0", "99999999999999999999999", "M1", "llama"] {
            let err = session.switch_model(bad).unwrap_err();
            assert!(err.is_validation(), "{bad}: {err}");
            assert_eq!(session.model(), "m3");
        }
    }

    #[tokio::test]
    async fn latest_context_sends_only_the_new_line() {
        let mut session = session(ChatConfig::new());
        session.send_streaming("one", &mut Quiet).await;
        let outcome = session.send_streaming("two", &mut Quiet).await;
        assert_eq!(outcome.message.unwrap().content, "1 message(s)");
        assert_eq!(session.message_count(), 4);
    }

    #[tokio::test]
    async fn full_context_sends_the_whole_history() {
        let mut session = session(ChatConfig::new().with_context(ContextMode::Full));
        session.send_streaming("one", &mut Quiet).await;
        let outcome = session.send_streaming("two", &mut Quiet).await;
        assert_eq!(outcome.message.unwrap().content, "3 message(s)");
    }

    struct Unresponsive;

    #[async_trait::async_trait]
    impl Backend for Unresponsive {
        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn stream_completion(
            &self,
            _model: &str,
            _temperature: Temperature,
            _prompt: &[Message],
        ) -> Result<FragmentStream> {
            futures::future::pending().await
        }
    }

    struct Interrupted;

    impl Renderer for Interrupted {
        fn render_partial(&mut self, _content: &str) {}
        fn finish_response(&mut self, _message: &Message) {}
        fn render_transcript(&mut self, _messages: &[Message]) {}
        fn print_error(&mut self, _error: &str) {}
        fn print_info(&mut self, _info: &str) {}
        fn should_interrupt(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn interrupt_while_opening_the_stream() {
        let mut session = ChatSession::new(Arc::new(Unresponsive), &ChatConfig::new());
        let outcome = session.send_streaming("hello", &mut Interrupted).await;

        assert!(outcome.error.as_ref().is_some_and(Error::is_abort));
        assert_eq!(session.message_count(), 2);
        assert!(
            session.conversation().snapshot()[1]
                .content
                .contains("[Error: ")
        );
    }

    #[tokio::test]
    async fn clear_resets_history() {
        let mut session = session(ChatConfig::new());
        session.send_streaming("hello", &mut Quiet).await;
        assert_eq!(session.message_count(), 2);
        session.clear();
        assert_eq!(session.message_count(), 0);
    }
}
