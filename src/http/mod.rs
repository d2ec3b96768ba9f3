//! HTTP transport host.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (assign request ID)
//!     → websocket.rs (single upgrade target) | routing dispatcher
//!     → response.rs (500 on handler/middleware failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::{request_id_of, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use websocket::UpgradeTarget;
