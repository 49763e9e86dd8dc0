// Public modules
pub mod chat_chunk;
pub mod chat_request;
pub mod message;
pub mod model_list_response;
pub mod role;
pub mod temperature;

// Re-exports
pub use chat_chunk::{ChatChunk, ChunkMessage};
pub use chat_request::{ChatOptions, ChatRequest};
pub use message::Message;
pub use model_list_response::{ModelInfo, ModelListResponse};
pub use role::Role;
pub use temperature::Temperature;
