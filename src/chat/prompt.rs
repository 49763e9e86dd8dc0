//! Line input for the chat loop and its sub-prompts.

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::Error;

/// The result of asking the user for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line of input, without its newline.
    Line(String),
    /// The user pressed Ctrl-C.
    Interrupted,
    /// The input was closed (Ctrl-D).
    Eof,
}

/// A source of input lines.
pub trait LinePrompt {
    /// Shows `prompt` and blocks until the user enters a line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine, Error>;

    /// Records a line in the input history, if the prompt keeps one.
    fn add_history(&mut self, line: &str) {
        _ = line;
    }
}

/// A [`LinePrompt`] backed by a rustyline editor.
pub struct EditorPrompt {
    editor: DefaultEditor,
}

impl EditorPrompt {
    /// Creates a prompt on the controlling terminal.
    pub fn new() -> Result<Self, Error> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }
}

impl LinePrompt for EditorPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine, Error> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadLine::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(err) => Err(readline_error(err)),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

fn readline_error(err: ReadlineError) -> Error {
    Error::io("Input error", io::Error::other(err.to_string()))
}

/// A prompt that is always at end of input.
///
/// Used where no interactive sub-prompt exists, so commands must carry their
/// arguments inline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl LinePrompt for NoPrompt {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadLine, Error> {
        Ok(ReadLine::Eof)
    }
}
