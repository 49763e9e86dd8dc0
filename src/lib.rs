// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Internal modules
mod ndjson;

// Re-exports
pub use backend::{Backend, FragmentStream};
pub use client::{ChatChunkStream, DEFAULT_HOST, HOST_ENV_VAR, Ollama};
pub use client_logger::{ClientLogger, JsonLinesLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
