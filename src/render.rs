//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the same chat
//! session can drive a terminal, a test harness, or an event-driven front-end.
//! The default implementation writes to stdout with optional ANSI styling.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Message, Role};

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for blue text (used for the user label).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for green text (used for the assistant label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape codes to clear the screen and home the cursor.
const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Trait for rendering chat output.
///
/// Streaming output is delivered as the *complete* text of the in-progress
/// assistant message after every fragment, never as a delta.  Implementations
/// that can only append (like a terminal) are responsible for working out what
/// is new.
pub trait Renderer: Send {
    /// Called when an assistant response begins.
    fn start_response(&mut self, model: &str) {
        _ = model;
    }

    /// Render the full content of the in-progress assistant message.
    ///
    /// This is called once per fragment, with everything received so far.
    fn render_partial(&mut self, content: &str);

    /// Called when the assistant message has become terminal.
    fn finish_response(&mut self, message: &Message);

    /// Render the whole conversation, e.g. after it was cleared.
    fn render_transcript(&mut self, messages: &[Message]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout.  Because a terminal cannot
/// rewrite what it already printed, `render_partial` prints only the suffix
/// that extends the previously rendered content.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    shown: String,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            shown: String::new(),
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn label(&self, role: Role) -> String {
        if self.use_color {
            let color = match role {
                Role::User => ANSI_BLUE,
                Role::Assistant => ANSI_GREEN,
            };
            format!("{ANSI_BOLD}{color}{}:{ANSI_RESET}", role.label())
        } else {
            format!("{}:", role.label())
        }
    }

    /// Returns the part of `content` that has not been printed yet.
    ///
    /// If `content` does not extend what was shown (which the accumulator
    /// never does), the whole content is returned on a fresh line.
    fn unseen<'a>(&mut self, content: &'a str) -> std::borrow::Cow<'a, str> {
        if let Some(suffix) = content.strip_prefix(self.shown.as_str()) {
            self.shown.push_str(suffix);
            std::borrow::Cow::Borrowed(suffix)
        } else {
            self.shown.clear();
            self.shown.push_str(content);
            std::borrow::Cow::Owned(format!("\n{content}"))
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_response(&mut self, _model: &str) {
        self.shown.clear();
        println!("\n{}", self.label(Role::Assistant));
        self.flush();
    }

    fn render_partial(&mut self, content: &str) {
        let unseen = self.unseen(content);
        print!("{unseen}");
        self.flush();
    }

    fn finish_response(&mut self, _message: &Message) {
        self.shown.clear();
        println!();
        self.flush();
    }

    fn render_transcript(&mut self, messages: &[Message]) {
        if self.use_color {
            print!("{ANSI_CLEAR_SCREEN}");
        }
        for message in messages {
            println!("{}\n{}\n", self.label(message.role), message.content);
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error:{ANSI_RESET} {error}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.label(Role::User), "You:");
    }

    #[test]
    fn unseen_prints_only_the_new_suffix() {
        let mut renderer = PlainTextRenderer::with_color(false);
        assert_eq!(renderer.unseen("He"), "He");
        assert_eq!(renderer.unseen("Hello"), "llo");
        assert_eq!(renderer.unseen("Hello"), "");
        assert_eq!(renderer.unseen("Hello, world"), ", world");
    }

    #[test]
    fn unseen_restarts_when_content_diverges() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.unseen("abc");
        assert_eq!(renderer.unseen("xyz"), "\nxyz");
        assert_eq!(renderer.unseen("xyz!"), "!");
    }

    #[test]
    fn interrupt_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let renderer = PlainTextRenderer::with_color(false).with_interrupt(flag.clone());
        assert!(!renderer.should_interrupt());
        flag.store(true, Ordering::Relaxed);
        assert!(renderer.should_interrupt());
    }
}
