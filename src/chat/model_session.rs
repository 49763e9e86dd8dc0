//! The selected model and sampling temperature, plus the handle derived from them.

use std::fmt;
use std::sync::Arc;

use crate::backend::{Backend, FragmentStream};
use crate::{Error, Message, Temperature};

/// A backend proxy bound to one `(model, temperature)` pair.
///
/// Handles are cheap to clone and hold no connection state of their own.
#[derive(Clone)]
pub struct ConnectionHandle {
    backend: Arc<dyn Backend>,
    model: String,
    temperature: Temperature,
}

impl ConnectionHandle {
    /// The model this handle sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The temperature this handle samples with.
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Opens a completion stream for `prompt`.
    pub async fn stream(&self, prompt: &[Message]) -> Result<FragmentStream, Error> {
        self.backend
            .stream_completion(&self.model, self.temperature, prompt)
            .await
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Current model selection for a chat session.
///
/// Every setter re-derives the connection handle, so the handle always agrees
/// with `model_id` and `temperature`.
pub struct ModelSession {
    backend: Arc<dyn Backend>,
    model_id: String,
    temperature: Temperature,
    handle: ConnectionHandle,
}

impl ModelSession {
    /// Creates a session for `model_id` at `temperature`.
    pub fn new(
        backend: Arc<dyn Backend>,
        model_id: impl Into<String>,
        temperature: Temperature,
    ) -> Self {
        let model_id = model_id.into();
        let handle = derive_handle(&backend, &model_id, temperature);
        Self {
            backend,
            model_id,
            temperature,
            handle,
        }
    }

    /// The selected model.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The selected temperature.
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// The handle for the current selection.
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Selects a different model.
    pub fn set_model(&mut self, model_id: impl Into<String>) {
        self.model_id = model_id.into();
        self.rederive();
    }

    /// Selects a different temperature.
    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.temperature = temperature;
        self.rederive();
    }

    /// Asks the backend for its installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, Error> {
        self.backend.list_models().await
    }

    fn rederive(&mut self) {
        self.handle = derive_handle(&self.backend, &self.model_id, self.temperature);
    }
}

impl fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSession")
            .field("model_id", &self.model_id)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn derive_handle(
    backend: &Arc<dyn Backend>,
    model_id: &str,
    temperature: Temperature,
) -> ConnectionHandle {
    ConnectionHandle {
        backend: Arc::clone(backend),
        model: model_id.to_string(),
        temperature,
    }
}
