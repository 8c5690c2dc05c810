//! Observability for orgdir
//!
//! - Structured JSON logging ([`Logger`])
//! - Typed events ([`Event`])
//! - Monotonic counters ([`MetricsRegistry`])
//!
//! ```ignore
//! use orgdir::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryExecuted, &[("kind", "radius"), ("rows", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event(Event::ShutdownComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("store", "memory")]);
    }
}
