//! Prime server
//!
//! Serves a small demo application on top of the dispatcher.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌────────┐    ┌──────────────┐    ┌───────────────┐
//!     ───────────────────▶│  http  │───▶│  dispatcher  │───▶│   matcher     │
//!                         │ server │    │ (route scan) │    │ (segments)    │
//!                         └───┬────┘    └──────┬───────┘    └───────────────┘
//!                             │                │
//!                   upgrade?  ▼                ▼
//!                      ┌───────────┐   middleware │ handler │ 404 fallback
//!                      │ websocket │
//!                      └───────────┘
//! ```

use std::path::PathBuf;

use axum::extract::ws::Message;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::BoxError;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;

use prime_router::config::validation::validate_config;
use prime_router::config::{load_config, ConfigError, ServerConfig};
use prime_router::http::{request_id_of, HttpServer, UpgradeTarget};
use prime_router::observability::{logging, metrics};
use prime_router::routing::{Flow, Params, PatternError, Reply, RouteTable};
use prime_router::Shutdown;

/// Largest request body the demo handlers buffer.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "prime-server")]
#[command(about = "Minimal HTTP router with ordered routes and global middleware", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the route table and exit
    #[arg(long)]
    print_routes: bool,
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    logging::init_logging(&config.observability);

    let table = build_routes()?;
    if cli.print_routes {
        for line in table.describe() {
            println!("{line}");
        }
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = table.len(),
        dev_mode = config.serve.dev_mode,
        "Configuration loaded"
    );
    if config.serve.dev_mode {
        tracing::warn!("Development mode: error details are sent to clients");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let echo = UpgradeTarget::new("/ws", |mut socket, _params| async move {
        while let Some(Ok(message)) = socket.recv().await {
            match message {
                Message::Text(_) | Message::Binary(_) => {
                    if socket.send(message).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    })?;

    let server = HttpServer::new(config, table).with_websocket(echo);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load the config file (if any) and apply CLI overrides on top of it.
fn resolve_config(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

fn build_routes() -> Result<RouteTable, PatternError> {
    let mut routes = RouteTable::builder();

    routes.add_middleware(
        prime_router::routing::MethodFilter::Any,
        |req: &Request| -> Result<Flow, BoxError> {
            tracing::debug!(
                request_id = %request_id_of(req),
                method = %req.method(),
                path = %req.uri().path(),
                "Incoming request"
            );
            Ok(Flow::Continue)
        },
    );

    routes
        .get("/", |_req: Request, _params: Params| Reply::ok("OK"))?
        .get("/blog/:id", |_req: Request, params: Params| {
            Reply::ok(format!("Blog post {}", params.get("id").unwrap_or_default()))
        })?
        .get("/users/:uid/posts/:pid", |_req: Request, params: Params| {
            Reply::ok(Json(serde_json::json!({
                "user": params.get("uid"),
                "post": params.get("pid"),
            })))
        })?
        .post("/login", |req: Request, _params: Params| {
            Reply::pending(async move {
                let body = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await?;
                let credentials: Credentials = serde_json::from_slice(&body)?;
                if credentials.username == "admin" && credentials.password == "admin" {
                    Ok((StatusCode::CREATED, "OK").into_response())
                } else {
                    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
                }
            })
        })?
        .put("/items/:id", |req: Request, params: Params| {
            let id = params.get("id").unwrap_or_default().to_string();
            Reply::pending(async move {
                let body = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await?;
                Ok(format!("Stored {} bytes at item {id}", body.len()).into_response())
            })
        })?
        .delete("/items/:id", |_req: Request, _params: Params| {
            Reply::ok(StatusCode::NO_CONTENT)
        })?;

    Ok(routes.build())
}
