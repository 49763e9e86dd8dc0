//! A chat session owned by one task and driven by events.
//!
//! Front-ends that are event driven (a web page, a TUI) cannot hold
//! `&mut ChatSession` across callbacks.  They send [`SessionEvent`]s to a
//! [`SessionHandle`] instead; one task applies them in arrival order and
//! reports back with [`SessionUpdate`]s.  All mutation happens on that task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::chat::dispatch::{Flow, handle_line, refresh_for_switch};
use crate::chat::prompt::NoPrompt;
use crate::chat::session::ChatSession;
use crate::{Error, Message, Renderer, Result, Temperature};

/// Input to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A line typed by the user: chat text or an inline command.
    Input(String),
    /// Select a model by name or 1-based catalog index.
    SelectModel(String),
    /// Set the sampling temperature.
    SetTemperature(Temperature),
    /// Clear the conversation.
    Clear,
    /// Re-fetch the model catalog.
    Refresh,
}

/// Output from a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The whole conversation, after it changed wholesale.
    Transcript(Vec<Message>),
    /// The full content of the in-progress assistant message.
    Partial(String),
    /// An informational notice.
    Info(String),
    /// An error notice.
    Error(String),
    /// The installed models.
    Catalog(Vec<String>),
    /// The assistant message became terminal.
    TurnFinished(Message),
}

/// Forwards renderer calls as [`SessionUpdate`]s.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    updates: mpsc::UnboundedSender<SessionUpdate>,
}

impl ChannelRenderer {
    /// Creates a renderer that sends on `updates`.
    pub fn new(updates: mpsc::UnboundedSender<SessionUpdate>) -> Self {
        Self { updates }
    }

    fn send(&self, update: SessionUpdate) {
        // A dropped receiver only means nobody is watching.
        let _ = self.updates.send(update);
    }
}

impl Renderer for ChannelRenderer {
    fn render_partial(&mut self, content: &str) {
        self.send(SessionUpdate::Partial(content.to_string()));
    }

    fn finish_response(&mut self, message: &Message) {
        self.send(SessionUpdate::TurnFinished(message.clone()));
    }

    fn render_transcript(&mut self, messages: &[Message]) {
        self.send(SessionUpdate::Transcript(messages.to_vec()));
    }

    fn print_error(&mut self, error: &str) {
        self.send(SessionUpdate::Error(error.to_string()));
    }

    fn print_info(&mut self, info: &str) {
        self.send(SessionUpdate::Info(info.to_string()));
    }
}

/// A [`ChatSession`] running on its own task.
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    task: JoinHandle<ChatSession>,
}

impl SessionHandle {
    /// Moves `session` onto a new task.
    ///
    /// Returns the handle and the receiver of the session's updates.
    pub fn spawn(session: ChatSession) -> (Self, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, events_rx, ChannelRenderer::new(updates_tx)));
        let handle = Self {
            events: events_tx,
            task,
        };
        (handle, updates_rx)
    }

    /// Queues an event.
    ///
    /// # Errors
    ///
    /// Returns an abort error if the session has already ended.
    pub fn send(&self, event: SessionEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| Error::abort("chat session has ended"))
    }

    /// Stops accepting events, waits for queued ones, and returns the session.
    ///
    /// # Errors
    ///
    /// Returns an abort error if the session task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<ChatSession> {
        drop(self.events);
        self.task
            .await
            .map_err(|err| Error::abort(format!("chat session task failed: {err}")))
    }
}

async fn run(
    mut session: ChatSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    mut renderer: ChannelRenderer,
) -> ChatSession {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Input(line) => {
                let flow = handle_line(&mut session, &line, &mut NoPrompt, &mut renderer).await;
                if flow == Flow::Quit {
                    renderer.print_info("Chat session ended.");
                    break;
                }
            }
            SessionEvent::SelectModel(choice) => {
                if !refresh_for_switch(&mut session, &mut renderer).await {
                    continue;
                }
                match session.switch_model(&choice) {
                    Ok(model) => {
                        let notice = format!("Switched to model: {model}");
                        renderer.print_info(&notice);
                    }
                    Err(err) => renderer.print_error(&err.to_string()),
                }
            }
            SessionEvent::SetTemperature(temperature) => {
                session.set_temperature(temperature);
                renderer.print_info(&format!("Temperature set to: {temperature}"));
            }
            SessionEvent::Clear => {
                session.clear();
                renderer.render_transcript(session.conversation().snapshot());
                renderer.print_info("Chat history cleared.");
            }
            SessionEvent::Refresh => match session.refresh_catalog().await {
                Ok(()) => renderer.send(SessionUpdate::Catalog(session.catalog().to_vec())),
                Err(err) => renderer.print_error(&format!("Could not fetch models: {err}")),
            },
        }
    }
    session
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::stream;

    use super::*;
    use crate::backend::{Backend, FragmentStream};
    use crate::chat::ChatConfig;

    struct Echo;

    #[async_trait::async_trait]
    impl Backend for Echo {
        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["m1".to_string(), "m2".to_string()])
        }

        async fn stream_completion(
            &self,
            _model: &str,
            _temperature: Temperature,
            prompt: &[Message],
        ) -> Result<FragmentStream> {
            let last = prompt.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(Box::pin(stream::iter(vec![
                Ok("echo: ".to_string()),
                Ok(last),
            ])))
        }
    }

    struct Offline;

    #[async_trait::async_trait]
    impl Backend for Offline {
        async fn list_models(&self) -> Result<Vec<String>> {
            Err(Error::connection("connection refused", None))
        }

        async fn stream_completion(
            &self,
            _model: &str,
            _temperature: Temperature,
            _prompt: &[Message],
        ) -> Result<FragmentStream> {
            Err(Error::connection("connection refused", None))
        }
    }

    /// Lists models from a catalog that grows after the first fetch.
    #[derive(Default)]
    struct Growing {
        fetches: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Backend for Growing {
        async fn list_models(&self) -> Result<Vec<String>> {
            let fetches = self
                .fetches
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok((0..=fetches).map(|i| format!("m{}", i + 1)).collect())
        }

        async fn stream_completion(
            &self,
            _model: &str,
            _temperature: Temperature,
            _prompt: &[Message],
        ) -> Result<FragmentStream> {
            Ok(Box::pin(stream::iter(Vec::<Result<String>>::new())))
        }
    }

    fn spawn() -> (SessionHandle, mpsc::UnboundedReceiver<SessionUpdate>) {
        SessionHandle::spawn(ChatSession::new(Arc::new(Echo), &ChatConfig::new()))
    }

    fn drain(updates: &mut mpsc::UnboundedReceiver<SessionUpdate>) -> Vec<SessionUpdate> {
        let mut received = Vec::new();
        while let Ok(update) = updates.try_recv() {
            received.push(update);
        }
        received
    }

    #[tokio::test]
    async fn select_model_reports_an_unreachable_server() {
        let session = ChatSession::new(Arc::new(Offline), &ChatConfig::new());
        let before = session.model().to_string();
        let (handle, mut updates) = SessionHandle::spawn(session);
        handle.send(SessionEvent::SelectModel("1".to_string())).unwrap();
        let session = handle.shutdown().await.unwrap();
        assert_eq!(session.model(), before);

        let received = drain(&mut updates);
        assert!(matches!(
            &received[0],
            SessionUpdate::Error(error) if error.starts_with("Could not fetch models: ")
        ));
        assert!(received.iter().any(|update| matches!(
            update,
            SessionUpdate::Info(info) if info.contains("ollama serve")
        )));
        assert!(!received.iter().any(|update| matches!(
            update,
            SessionUpdate::Error(error) if error.contains("Invalid model number")
        )));
    }

    #[tokio::test]
    async fn select_model_refreshes_like_switch() {
        let mut session = ChatSession::new(Arc::new(Growing::default()), &ChatConfig::new());
        session.refresh_catalog().await.unwrap();
        assert_eq!(session.catalog(), ["m1"]);

        let (handle, _updates) = SessionHandle::spawn(session);
        handle.send(SessionEvent::SelectModel("2".to_string())).unwrap();
        let session = handle.shutdown().await.unwrap();
        assert_eq!(session.model(), "m2");
    }

    #[tokio::test]
    async fn events_are_applied_in_order() {
        let (handle, mut updates) = spawn();
        handle.send(SessionEvent::Input("hi".to_string())).unwrap();
        handle.send(SessionEvent::SelectModel("2".to_string())).unwrap();
        handle
            .send(SessionEvent::SetTemperature(Temperature::new(0.3).unwrap()))
            .unwrap();
        let session = handle.shutdown().await.unwrap();

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.model(), "m2");
        assert_eq!(session.temperature().value(), 0.3);

        let received = drain(&mut updates);
        assert_eq!(
            received[..3],
            [
                SessionUpdate::Partial("echo: ".to_string()),
                SessionUpdate::Partial("echo: hi".to_string()),
                SessionUpdate::TurnFinished(Message::assistant("echo: hi")),
            ]
        );
        assert!(received.contains(&SessionUpdate::Info("Switched to model: m2".to_string())));
    }

    #[tokio::test]
    async fn quit_ends_the_session() {
        let (handle, _updates) = spawn();
        handle.send(SessionEvent::Input("/quit".to_string())).unwrap();
        tokio::task::yield_now().await;
        let session = handle.shutdown().await.unwrap();
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn clear_and_refresh() {
        let (handle, mut updates) = spawn();
        handle.send(SessionEvent::Input("hello".to_string())).unwrap();
        handle.send(SessionEvent::Clear).unwrap();
        handle.send(SessionEvent::Refresh).unwrap();
        let session = handle.shutdown().await.unwrap();
        assert_eq!(session.message_count(), 0);

        let received = drain(&mut updates);
        assert!(received.contains(&SessionUpdate::Transcript(Vec::new())));
        assert!(received.contains(&SessionUpdate::Catalog(vec![
            "m1".to_string(),
            "m2".to_string()
        ])));
    }
}
