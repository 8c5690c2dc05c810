//! API key check
//!
//! Every `/organizations` request must carry the configured header with the
//! configured key. Missing header → 401, wrong value → 403. Comparison is
//! constant-time.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::config::{ApiKeyConfig, ConfigError, ConfigResult};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::rest_api::RestError;

/// Expected key plus the header it travels in
#[derive(Clone)]
pub struct ApiKeyState {
    key: Arc<str>,
    header: HeaderName,
    metrics: Arc<MetricsRegistry>,
}

impl ApiKeyState {
    pub fn new(config: &ApiKeyConfig, metrics: Arc<MetricsRegistry>) -> ConfigResult<Self> {
        let header = HeaderName::from_bytes(config.key_header.as_bytes()).map_err(|_| {
            ConfigError::Invalid {
                field: "api.key_header",
                reason: format!("'{}' is not a valid header name", config.key_header),
            }
        })?;

        Ok(Self {
            key: Arc::from(config.key.as_str()),
            header,
            metrics,
        })
    }

    fn check(&self, presented: Option<&[u8]>) -> Result<(), RestError> {
        match presented {
            None => Err(RestError::MissingApiKey(self.header.as_str().to_string())),
            Some(value) if bool::from(value.ct_eq(self.key.as_bytes())) => Ok(()),
            Some(_) => Err(RestError::InvalidApiKey),
        }
    }
}

/// Middleware rejecting requests without a valid key
pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req.headers().get(&state.header).map(|v| v.as_bytes());

    match state.check(presented) {
        Ok(()) => next.run(req).await,
        Err(err) => {
            state.metrics.increment_auth_rejections();
            let reason = if matches!(err, RestError::MissingApiKey(_)) {
                "missing"
            } else {
                "invalid"
            };
            log_event_with_fields(
                Event::AuthRejected,
                &[("path", req.uri().path()), ("reason", reason)],
            );
            err.into_response()
        }
    }
}
