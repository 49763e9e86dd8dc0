//! The ordered transcript of a chat session.

use crate::{Message, Role};

/// Handle to the assistant message that is currently receiving fragments.
///
/// Returned by [`Conversation::begin_turn`] and consumed by
/// [`Conversation::finish_turn`].  The handle is deliberately not `Clone`:
/// exactly one writer can extend a turn.  A handle whose turn was cleared or
/// frozen by [`Conversation::append`] becomes inert.
#[derive(Debug)]
pub struct OpenTurn {
    id: u64,
}

/// An ordered, append-only sequence of role-tagged messages.
///
/// Insertion order is display order.  At most one message is in progress and,
/// while it is, it is the last element.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    open: Option<u64>,
    next_turn: u64,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a complete message to the end of the conversation.
    ///
    /// An in-progress turn is frozen first, so its handle stops accepting
    /// fragments.
    pub fn append(&mut self, message: Message) {
        self.open = None;
        self.messages.push(message);
    }

    /// Removes every message, including one still in progress.
    pub fn clear(&mut self) {
        self.open = None;
        self.messages.clear();
    }

    /// The messages in order, including partial in-progress content.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// The number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The message currently receiving fragments, if any.
    pub fn in_progress(&self) -> Option<&Message> {
        self.open.and(self.messages.last())
    }

    /// Starts an empty assistant message as the in-progress tail.
    pub fn begin_turn(&mut self) -> OpenTurn {
        let id = self.next_turn;
        self.next_turn += 1;
        self.messages.push(Message::new(Role::Assistant, String::new()));
        self.open = Some(id);
        OpenTurn { id }
    }

    /// Returns true if `turn` still refers to the in-progress message.
    pub fn is_open(&self, turn: &OpenTurn) -> bool {
        self.open == Some(turn.id)
    }

    /// Appends `fragment` to the in-progress message.
    ///
    /// Returns the full content accumulated so far, or `None` if the turn is
    /// no longer open.
    pub fn extend_turn(&mut self, turn: &OpenTurn, fragment: &str) -> Option<&str> {
        if !self.is_open(turn) {
            return None;
        }
        let message = self.messages.last_mut()?;
        message.content.push_str(fragment);
        Some(&message.content)
    }

    /// Freezes the in-progress message and returns it.
    ///
    /// Returns `None` if the turn was cleared or frozen in the meantime.
    pub fn finish_turn(&mut self, turn: OpenTurn) -> Option<&Message> {
        if !self.is_open(&turn) {
            return None;
        }
        self.open = None;
        self.messages.last()
    }
}
