//! Request dispatcher with an Axum transport host.
//!
//! Routes are registered in order on a [`RouteTableBuilder`], frozen into a
//! [`RouteTable`], and served by [`HttpServer`]. Each request is matched
//! against the table by the [`Dispatcher`]: first match wins, middleware
//! may terminate the scan, and unmatched requests get a 404 `Not found`.
//!
//! ```
//! use axum::extract::Request;
//! use prime_router::routing::{Params, Reply, RouteTable};
//!
//! let mut routes = RouteTable::builder();
//! routes
//!     .get("/blog/:id", |_req: Request, params: Params| {
//!         Reply::ok(format!("post {}", params.get("id").unwrap_or_default()))
//!     })
//!     .unwrap();
//! let table = routes.build();
//! assert_eq!(table.len(), 1);
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, RouteTable, RouteTableBuilder};
