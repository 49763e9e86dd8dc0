//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use arrrg_derive::CommandLine;

use crate::{Error, Temperature};

/// Model used when none is given on the command line.
pub const DEFAULT_MODEL: &str = "gemma3:270m";

/// Command-line arguments for the ollama-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Ollama model to use (default: gemma3:270m)", "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature, validated before the session starts.
    #[arrrg(optional, "Temperature setting 0.0-1.0 (default: 0.7)", "TEMP")]
    pub temperature: Option<String>,

    /// Ollama server address.
    #[arrrg(optional, "Ollama host (default: $OLLAMA_HOST or localhost:11434)", "HOST")]
    pub host: Option<String>,

    /// Which messages are sent as context on each turn.
    #[arrrg(optional, "Prompt context: latest or full (default: latest)", "MODE")]
    pub context: Option<String>,

    /// Append requests and stream chunks to this file as JSON lines.
    #[arrrg(optional, "Log client traffic to a JSON-lines file", "PATH")]
    pub log_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Which part of the conversation is sent to the backend on each turn.
///
/// The visible transcript is always cumulative; this only controls the
/// prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMode {
    /// Send only the line the user just entered.
    #[default]
    Latest,
    /// Send the whole conversation so far.
    Full,
}

impl FromStr for ContextMode {
    type Err = ChatArgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(ContextMode::Latest),
            "full" => Ok(ContextMode::Full),
            _ => Err(ChatArgsError::InvalidContext(s.to_string())),
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextMode::Latest => write!(f, "latest"),
            ContextMode::Full => write!(f, "full"),
        }
    }
}

/// Errors raised while turning [`ChatArgs`] into a [`ChatConfig`].
#[derive(Debug)]
pub enum ChatArgsError {
    /// The temperature was not a number in `[0.0, 1.0]`.
    InvalidTemperature(Error),
    /// The context mode was not `latest` or `full`.
    InvalidContext(String),
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidTemperature(_) => {
                write!(f, "Temperature must be between 0.0 and 1.0")
            }
            ChatArgsError::InvalidContext(mode) => {
                write!(f, "Unknown context mode '{mode}' (expected latest or full)")
            }
        }
    }
}

impl std::error::Error for ChatArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatArgsError::InvalidTemperature(err) => Some(err),
            ChatArgsError::InvalidContext(_) => None,
        }
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Sampling temperature.
    pub temperature: Temperature,

    /// Server address; `None` defers to `OLLAMA_HOST` and then localhost.
    pub host: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Which messages are sent as prompt context.
    pub context: ContextMode,

    /// Where to log client traffic, if anywhere.
    pub log_file: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemma3:270m
    /// - Temperature: 0.7
    /// - Color: enabled
    /// - Context: latest line only
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Temperature::default(),
            host: None,
            use_color: true,
            context: ContextMode::default(),
            log_file: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the server address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the prompt context mode.
    pub fn with_context(mut self, context: ContextMode) -> Self {
        self.context = context;
        self
    }

    /// Sets the traffic log path.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let temperature = match args.temperature {
            Some(value) => value
                .parse::<Temperature>()
                .map_err(ChatArgsError::InvalidTemperature)?,
            None => Temperature::default(),
        };
        let context = match args.context {
            Some(mode) => mode.parse::<ContextMode>()?,
            None => ContextMode::default(),
        };

        Ok(ChatConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            host: args.host,
            use_color: !args.no_color,
            context,
            log_file: args.log_file.map(PathBuf::from),
        })
    }
}
