//! Folds a stream of text fragments into one growing assistant message.

use std::future::Future;
use std::time::{Duration, Instant};

use futures::StreamExt;

use crate::backend::FragmentStream;
use crate::chat::conversation::{Conversation, OpenTurn};
use crate::observability::{CHAT_FRAGMENTS, CHAT_TURN_DURATION, CHAT_TURN_FAILURES, CHAT_TURNS};
use crate::{Error, Message, Renderer};

/// Accumulates fragments into the in-progress tail of a [`Conversation`].
///
/// `start` opens the turn, `push` and `fail` extend it, and `finish` freezes
/// it.  Every extension returns the full content accumulated so far.
pub struct StreamingAccumulator<'a> {
    conversation: &'a mut Conversation,
    turn: OpenTurn,
    fragments: usize,
}

impl<'a> StreamingAccumulator<'a> {
    /// Begins an empty assistant message at the end of `conversation`.
    pub fn start(conversation: &'a mut Conversation) -> Self {
        let turn = conversation.begin_turn();
        Self {
            conversation,
            turn,
            fragments: 0,
        }
    }

    /// Appends one fragment and returns the cumulative content.
    pub fn push(&mut self, fragment: &str) -> Option<&str> {
        self.fragments += 1;
        self.conversation.extend_turn(&self.turn, fragment)
    }

    /// Appends a bracketed error marker and returns the cumulative content.
    pub fn fail(&mut self, error: &Error) -> Option<&str> {
        let marker = error_marker(error);
        self.conversation.extend_turn(&self.turn, &marker)
    }

    /// The number of fragments pushed so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Freezes the message and returns a copy of it.
    pub fn finish(self) -> Option<Message> {
        self.conversation.finish_turn(self.turn).cloned()
    }
}

/// How often a pending request or stream checks for an interrupt.
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// The error recorded when the user interrupts a turn.
pub(crate) fn interrupted() -> Error {
    Error::abort("interrupted by user")
}

/// Awaits `future` unless `renderer` reports an interrupt first.
///
/// The interrupt is checked before `future` is first polled and then every
/// [`INTERRUPT_POLL`] while it is pending.  Returns `None` on interrupt,
/// dropping `future`.
pub(crate) async fn interruptible<F: Future>(
    renderer: &mut dyn Renderer,
    future: F,
) -> Option<F::Output> {
    tokio::pin!(future);
    let mut ticks = tokio::time::interval(INTERRUPT_POLL);
    loop {
        tokio::select! {
            biased;
            _ = ticks.tick() => {
                if renderer.should_interrupt() {
                    return None;
                }
            }
            output = &mut future => return Some(output),
        }
    }
}

/// The text appended to a message whose stream failed.
pub fn error_marker(error: &Error) -> String {
    format!("\n[Error: {error}]")
}

/// The result of streaming one assistant turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Fragments received before the stream ended.
    pub fragments: usize,
    /// The failure that ended the stream early, if any.
    pub error: Option<Error>,
    /// The terminal assistant message.
    pub message: Option<Message>,
}

impl TurnOutcome {
    /// True when the stream ran to completion.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Drains `stream` into a new assistant turn, rendering after every fragment.
///
/// A failure to open the stream, a failure mid-stream, or an interrupt
/// reported by the renderer all end the turn with an error marker; content
/// received before the failure is kept.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use ollama_chat::chat::{Conversation, stream_turn};
/// use ollama_chat::{FragmentStream, Message, PlainTextRenderer};
///
/// # tokio_test::block_on(async {
/// let fragments: FragmentStream = Box::pin(stream::iter(vec![
///     Ok("Hello".to_string()),
///     Ok(", world".to_string()),
/// ]));
/// let mut conversation = Conversation::new();
/// let mut renderer = PlainTextRenderer::with_color(false);
/// let outcome = stream_turn(&mut conversation, "gemma3:270m", Ok(fragments), &mut renderer).await;
///
/// assert!(outcome.is_success());
/// assert_eq!(conversation.snapshot(), [Message::assistant("Hello, world")]);
/// # });
/// ```
pub async fn stream_turn(
    conversation: &mut Conversation,
    model: &str,
    stream: Result<FragmentStream, Error>,
    renderer: &mut dyn Renderer,
) -> TurnOutcome {
    CHAT_TURNS.click();
    let start = Instant::now();
    renderer.start_response(model);

    let mut accumulator = StreamingAccumulator::start(conversation);
    let error = match stream {
        Ok(mut fragments) => loop {
            let Some(next) = interruptible(&mut *renderer, fragments.next()).await else {
                break Some(interrupted());
            };
            match next {
                Some(Ok(fragment)) => {
                    CHAT_FRAGMENTS.click();
                    if let Some(content) = accumulator.push(&fragment) {
                        renderer.render_partial(content);
                    }
                }
                Some(Err(err)) => break Some(err),
                None => break None,
            }
        },
        Err(err) => Some(err),
    };

    if let Some(err) = &error {
        CHAT_TURN_FAILURES.click();
        if let Some(content) = accumulator.fail(err) {
            renderer.render_partial(content);
        }
    }

    let fragments = accumulator.fragments();
    let message = accumulator.finish();
    if let Some(message) = &message {
        renderer.finish_response(message);
    }
    CHAT_TURN_DURATION.add(start.elapsed().as_secs_f64());

    TurnOutcome {
        fragments,
        error,
        message,
    }
}
