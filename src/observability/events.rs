//! Observable events
//!
//! Every log line the service emits names one of these.

use std::fmt;

/// Observable events in orgdir
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Entity store reachable
    StoreConnected,
    /// Schema bootstrap applied
    SchemaInitialized,
    /// HTTP listener bound, ready for requests
    ServerListening,
    /// Shutdown signal received
    ShutdownStart,
    /// Listener drained
    ShutdownComplete,
    /// Startup aborted
    BootFailed,

    // Requests
    /// One HTTP request finished
    RequestComplete,
    /// Request refused by the API key check
    AuthRejected,

    // Queries
    /// Store query succeeded
    QueryExecuted,
    /// Filter parameters failed validation
    QueryRejected,
    /// Store error while serving a query
    StoreFailure,
    /// Store returned data that broke an integrity invariant
    MappingFailure,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "ORGDIR_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreConnected => "STORE_CONNECTED",
            Event::SchemaInitialized => "SCHEMA_INITIALIZED",
            Event::ServerListening => "ORGDIR_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::BootFailed => "ORGDIR_STARTUP_FAILED",

            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::AuthRejected => "AUTH_REJECTED",

            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::StoreFailure => "STORE_FAILURE",
            Event::MappingFailure => "MAPPING_FAILURE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> super::Severity {
        use super::Severity;

        match self {
            Event::BootFailed => Severity::Fatal,
            Event::StoreFailure | Event::MappingFailure => Severity::Error,
            Event::AuthRejected | Event::QueryRejected => Severity::Warn,
            Event::QueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
