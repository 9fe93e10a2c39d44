use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gemchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("gemchat.client.request_errors");
pub(crate) static CLIENT_EMPTY_RESPONSES: Counter = Counter::new("gemchat.client.empty_responses");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("gemchat.client.request_duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("gemchat.chat.sends");
pub(crate) static CHAT_SENDS_IGNORED: Counter = Counter::new("gemchat.chat.sends_ignored");
pub(crate) static CHAT_REPLAYS: Counter = Counter::new("gemchat.chat.replays");
pub(crate) static CHAT_FAILURES: Counter = Counter::new("gemchat.chat.failures");
pub(crate) static CHAT_CLEARS: Counter = Counter::new("gemchat.chat.clears");

pub(crate) static REVEAL_WORDS: Counter = Counter::new("gemchat.reveal.words");
pub(crate) static REVEAL_CANCELLED: Counter = Counter::new("gemchat.reveal.cancelled");

pub(crate) static STORAGE_WRITES: Counter = Counter::new("gemchat.storage.writes");
pub(crate) static STORAGE_ERRORS: Counter = Counter::new("gemchat.storage.errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_EMPTY_RESPONSES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SENDS_IGNORED);
    collector.register_counter(&CHAT_REPLAYS);
    collector.register_counter(&CHAT_FAILURES);
    collector.register_counter(&CHAT_CLEARS);

    collector.register_counter(&REVEAL_WORDS);
    collector.register_counter(&REVEAL_CANCELLED);

    collector.register_counter(&STORAGE_WRITES);
    collector.register_counter(&STORAGE_ERRORS);
}
