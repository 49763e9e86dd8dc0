use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("ollama_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("ollama_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("ollama_chat.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("ollama_chat.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("ollama_chat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("ollama_chat.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("ollama_chat.stream.ttfb_seconds");

pub(crate) static CHAT_TURNS: Counter = Counter::new("ollama_chat.chat.turns");
pub(crate) static CHAT_TURN_FAILURES: Counter = Counter::new("ollama_chat.chat.turn_failures");
pub(crate) static CHAT_FRAGMENTS: Counter = Counter::new("ollama_chat.chat.fragments");
pub(crate) static CHAT_TURN_DURATION: Moments =
    Moments::new("ollama_chat.chat.turn_duration_seconds");
pub(crate) static CHAT_COMMANDS: Counter = Counter::new("ollama_chat.chat.commands");
pub(crate) static CHAT_VALIDATION_ERRORS: Counter =
    Counter::new("ollama_chat.chat.validation_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_FAILURES);
    collector.register_counter(&CHAT_FRAGMENTS);
    collector.register_moments(&CHAT_TURN_DURATION);
    collector.register_counter(&CHAT_COMMANDS);
    collector.register_counter(&CHAT_VALIDATION_ERRORS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all() {
        register_biometrics(Collector::new());
    }
}
