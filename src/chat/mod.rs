//! Chat application module for interactive conversations with a local model.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! Ollama client. It supports:
//!
//! - Streaming responses with real-time token display
//! - Slash commands for session control
//! - Switching models and sampling temperature mid-session
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`Conversation`]: the ordered transcript and its open-turn lifecycle
//! - [`StreamingAccumulator`] and [`stream_turn`]: fold fragments into the
//!   assistant message, re-rendering after each one
//! - [`ModelSession`]: model and temperature plus the derived backend handle
//! - [`parse_command`], [`classify`] and [`handle_line`]: command dispatch
//! - [`ChatSession`]: the session context object tying these together
//! - [`SessionHandle`]: a single-writer task for event-driven front-ends
//! - [`ChatArgs`] and [`ChatConfig`]: CLI argument parsing and configuration

mod accumulator;
mod commands;
mod config;
mod conversation;
mod dispatch;
mod handle;
mod model_session;
mod prompt;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use accumulator::{StreamingAccumulator, TurnOutcome, error_marker, stream_turn};
pub use commands::{
    COMMAND_SIGIL, ChatCommand, Input, classify, help_text, parse_command, welcome_text,
};
pub use config::{ChatArgs, ChatArgsError, ChatConfig, ContextMode, DEFAULT_MODEL};
pub use conversation::{Conversation, OpenTurn};
pub use dispatch::{Flow, handle_line};
pub use handle::{ChannelRenderer, SessionEvent, SessionHandle, SessionUpdate};
pub use model_session::{ConnectionHandle, ModelSession};
pub use prompt::{EditorPrompt, LinePrompt, NoPrompt, ReadLine};
pub use session::ChatSession;
