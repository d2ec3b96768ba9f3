//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request to the dispatcher
//! - Wire up middleware (tracing, timeout, request ID, panic capture)
//! - Complete the WebSocket upgrade for the single upgrade target
//! - Await pending handler replies inside the request's own task
//! - Convert handler and middleware failures into 500 responses
//! - Bind server to listener and shut down gracefully

use std::any::Any;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Request, State,
    },
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{request_id_of, MakeRequestUuidV4};
use crate::http::response::{internal_error, panic_response};
use crate::http::websocket::UpgradeTarget;
use crate::observability::metrics::{self, Outcome};
use crate::routing::{Dispatcher, RouteTable};

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub upgrade: Option<UpgradeTarget>,
    pub dev_mode: bool,
}

/// Transport host: owns the listener and hands requests to the dispatcher.
pub struct HttpServer {
    config: ServerConfig,
    dispatcher: Dispatcher,
    upgrade: Option<UpgradeTarget>,
}

impl HttpServer {
    /// Create a server over a frozen route table.
    pub fn new(config: ServerConfig, table: RouteTable) -> Self {
        tracing::debug!(routes = table.len(), "Route table frozen");
        Self {
            config,
            dispatcher: Dispatcher::new(table),
            upgrade: None,
        }
    }

    /// Set the WebSocket upgrade target.
    ///
    /// Only one target is supported; a second call replaces the first.
    pub fn with_websocket(mut self, target: UpgradeTarget) -> Self {
        if let Some(previous) = &self.upgrade {
            tracing::warn!(
                previous = %previous.pattern(),
                replacement = %target.pattern(),
                "Replacing WebSocket upgrade target"
            );
        }
        self.upgrade = Some(target);
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let state = AppState {
            dispatcher: self.dispatcher.clone(),
            upgrade: self.upgrade.clone(),
            dev_mode: self.config.serve.dev_mode,
        };
        let dev_mode = state.dev_mode;

        Router::new()
            .fallback(host_handler)
            .with_state(state)
            .layer(CatchPanicLayer::custom(
                move |payload: Box<dyn Any + Send + 'static>| panic_response(payload, dev_mode),
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id_of(request),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        if self.config.serve.log_start {
            tracing::info!("Server started on port {}", addr.port());
        }
        tracing::debug!(
            address = %addr,
            websocket = ?self.upgrade.as_ref().map(|t| t.pattern().as_str()),
            "HTTP server starting"
        );

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Catch-all handler: upgrade decision first, then dispatch.
async fn host_handler(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    request: Request,
) -> Response {
    if let (Some(target), Ok(upgrade)) = (&state.upgrade, upgrade) {
        if let Some(params) = target.matches(request.uri().path()) {
            tracing::debug!(path = %request.uri().path(), "Upgrading connection");
            return target.accept(upgrade, params);
        }
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id_of(&request).to_string();

    let result = match state.dispatcher.dispatch(request) {
        Ok(outcome) => {
            let decision = outcome.decision();
            outcome
                .into_response()
                .await
                .map(|response| (decision, response))
        }
        Err(e) => Err(e),
    };

    match result {
        Ok((decision, response)) => {
            metrics::record_dispatch(decision.into(), method.as_str(), start);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = e.route(),
                error = %e,
                "Dispatch failed"
            );
            metrics::record_dispatch(Outcome::Error, method.as_str(), start);
            internal_error(&e, state.dev_mode)
        }
    }
}
