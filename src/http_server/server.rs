//! # HTTP Server
//!
//! Combines the organization routes, the API key check, request logging,
//! CORS and the unauthenticated health/metrics routes into one Axum server.

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{ConfigResult, ServiceConfig};
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::rest_api::{organization_routes, OrganizationHandler};
use crate::store::OrganizationStore;

use super::auth::{require_api_key, ApiKeyState};
use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;
use super::observe::log_request;

/// HTTP server for the organization directory
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Build the server around an already connected store
    pub fn new(config: &ServiceConfig, store: Arc<dyn OrganizationStore>) -> ConfigResult<Self> {
        let metrics = Arc::new(MetricsRegistry::new());
        let api_key = ApiKeyState::new(&config.api, metrics.clone())?;
        let handler = OrganizationHandler::new(store, metrics.clone());

        let router = Self::build_router(&config.http, handler, api_key, metrics);
        Ok(Self {
            config: config.http.clone(),
            router,
        })
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        handler: OrganizationHandler,
        api_key: ApiKeyState,
        metrics: Arc<MetricsRegistry>,
    ) -> Router {
        // Configure CORS from config
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let organizations = organization_routes(handler)
            .layer(middleware::from_fn_with_state(api_key, require_api_key));

        Router::new()
            .merge(observability_routes(metrics.clone()))
            .merge(organizations)
            .layer(middleware::from_fn_with_state(metrics, log_request))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C or SIGTERM, then drain in-flight requests
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves, then drain
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        log_event_with_fields(Event::ServerListening, &[("addr", &addr.to_string())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    // If a handler cannot be installed, that source never fires
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log_event_with_fields(Event::ShutdownStart, &[("signal", "SIGINT")]),
        _ = terminate => log_event_with_fields(Event::ShutdownStart, &[("signal", "SIGTERM")]),
    }
}
