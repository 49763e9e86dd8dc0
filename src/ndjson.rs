//! Newline-delimited JSON processing for streaming responses.
//!
//! Ollama streams chat output as one JSON object per line.  This module turns
//! the raw byte stream of an HTTP response into a stream of decoded values,
//! buffering partial lines (and partial UTF-8 sequences) across chunks.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::{Error, Result};

/// Process a stream of bytes into a stream of decoded JSON lines.
///
/// Blank lines are skipped.  A trailing line without a newline is decoded when
/// the byte stream ends.  Transport errors and undecodable lines are yielded
/// in place; decoding continues with the next line.
pub fn process_ndjson<S, T>(byte_stream: S) -> impl Stream<Item = Result<T>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
    T: DeserializeOwned + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut exhausted)| async move {
            loop {
                // First check if we have a complete line in the buffer
                if let Some((line, remaining)) = extract_line(&buffer) {
                    buffer = remaining;
                    match decode_line::<T>(&line) {
                        Some(item) => return Some((item, (stream, buffer, exhausted))),
                        None => continue,
                    }
                }

                if exhausted {
                    if buffer.is_empty() {
                        return None;
                    }
                    let line = std::mem::take(&mut buffer);
                    match decode_line::<T>(&line) {
                        Some(item) => return Some((item, (stream, buffer, exhausted))),
                        None => return None,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, exhausted)));
                    }
                    None => {
                        exhausted = true;
                    }
                }
            }
        },
    )
}

/// Split the first complete line off the buffer.
///
/// Returns the line without its terminator (`\n` or `\r\n`) and the remainder.
fn extract_line(buffer: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let pos = buffer.iter().position(|b| *b == b'\n')?;
    let mut line = &buffer[..pos];
    if let Some(stripped) = line.strip_suffix(b"\r") {
        line = stripped;
    }
    Some((line.to_vec(), buffer[pos + 1..].to_vec()))
}

/// Decode one line; `None` means the line was blank.
fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<Result<T>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            STREAM_ERRORS.click();
            return Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<T>(text) {
        Ok(value) => {
            STREAM_CHUNKS.click();
            Some(Ok(value))
        }
        Err(e) => {
            STREAM_ERRORS.click();
            Some(Err(Error::serialization(
                format!("Failed to parse stream line: {e}"),
                Some(Box::new(e)),
            )))
        }
    }
}
