//! Logging trait for Ollama client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`Ollama`](crate::Ollama)
//! client, plus [`JsonLinesLogger`], which appends every interaction to a file
//! as one JSON object per line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::{ChatChunk, ChatRequest, Error, ModelListResponse, Result};

/// A trait for logging Ollama client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including each chunk of a streaming chat response.
pub trait ClientLogger: Send + Sync {
    /// Log a chat request just before it is sent.
    fn log_request(&self, request: &ChatRequest);

    /// Log an individual decoded streaming chunk.
    ///
    /// This method is called for every line of the response stream that
    /// decoded successfully, including the final `done` chunk.
    fn log_stream_chunk(&self, chunk: &ChatChunk);

    /// Log the response of a model listing.
    fn log_model_list(&self, response: &ModelListResponse);
}

/// A [`ClientLogger`] that appends JSON lines to a file.
///
/// Each line is an object with a `kind` (`request`, `chunk` or `models`) and
/// the logged value under `body`.  Write failures are swallowed so logging
/// can never break a chat session.
pub struct JsonLinesLogger {
    file: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
struct LogLine<'a, T: Serialize> {
    kind: &'a str,
    body: &'a T,
}

impl JsonLinesLogger {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|err| Error::io("failed to open log file", err))?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write<T: Serialize>(&self, kind: &str, body: &T) {
        let Ok(line) = serde_json::to_string(&LogLine { kind, body }) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

impl ClientLogger for JsonLinesLogger {
    fn log_request(&self, request: &ChatRequest) {
        self.write("request", request);
    }

    fn log_stream_chunk(&self, chunk: &ChatChunk) {
        self.write("chunk", chunk);
    }

    fn log_model_list(&self, response: &ModelListResponse) {
        self.write("models", response);
    }
}
