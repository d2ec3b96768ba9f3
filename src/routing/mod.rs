//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup phase:
//!     RouteTableBuilder::add_route / add_middleware
//!     → matcher.rs (parse + validate pattern)
//!     → build() freezes an immutable RouteTable
//!
//! Per request:
//!     Request (method, path)
//!     → dispatcher.rs (linear scan in registration order)
//!     → middleware: Continue or Terminate(Response)
//!     → matcher.rs (segment comparison, parameter capture)
//!     → handler Reply (ready or pending) | fallback.rs (404)
//! ```
//!
//! # Design Decisions
//! - Routes validated at registration, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same request and table always take the same decision
//! - First match wins (registration order)

pub mod dispatcher;
pub mod error;
pub mod fallback;
pub mod handler;
pub mod matcher;
pub mod method;
pub mod table;

pub use dispatcher::{dispatch, Decision, Dispatch, Dispatcher};
pub use error::{DispatchError, PatternError};
pub use fallback::not_found;
pub use handler::{Flow, Handler, HandlerResult, Middleware, Reply};
pub use matcher::{Params, PathPattern, Segment};
pub use method::{Method, MethodFilter};
pub use table::{Route, RouteTable, RouteTableBuilder};
