use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("atlas_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("atlas_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("atlas_chat.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("atlas_chat.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("atlas_chat.stream.errors");
pub(crate) static STREAM_TIMEOUTS: Counter = Counter::new("atlas_chat.stream.timeouts");

pub(crate) static EXCHANGES_STARTED: Counter = Counter::new("atlas_chat.exchange.started");
pub(crate) static EXCHANGES_COMPLETED: Counter = Counter::new("atlas_chat.exchange.completed");
pub(crate) static EXCHANGES_FAILED: Counter = Counter::new("atlas_chat.exchange.failed");
pub(crate) static EXCHANGES_REJECTED: Counter = Counter::new("atlas_chat.exchange.rejected");
pub(crate) static EXCHANGE_DURATION: Moments =
    Moments::new("atlas_chat.exchange.duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_TIMEOUTS);

    collector.register_counter(&EXCHANGES_STARTED);
    collector.register_counter(&EXCHANGES_COMPLETED);
    collector.register_counter(&EXCHANGES_FAILED);
    collector.register_counter(&EXCHANGES_REJECTED);
    collector.register_moments(&EXCHANGE_DURATION);
}
