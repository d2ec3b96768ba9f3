//! Handler and middleware contracts.
//!
//! Handlers answer with a [`Reply`]: either a response that is already
//! computed or a pending future the host awaits inside the request's own
//! task. Middleware answers with a [`Flow`]: terminate with a response, or
//! let the route scan continue.

use std::future::Future;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::matcher::Params;

/// Outcome of running a handler to completion.
pub type HandlerResult = Result<Response, BoxError>;

/// What a handler hands back to the dispatcher.
pub enum Reply {
    Ready(HandlerResult),
    Pending(BoxFuture<'static, HandlerResult>),
}

impl Reply {
    pub fn ok(response: impl IntoResponse) -> Self {
        Reply::Ready(Ok(response.into_response()))
    }

    pub fn err(error: impl Into<BoxError>) -> Self {
        Reply::Ready(Err(error.into()))
    }

    /// Wrap an async computation.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        Reply::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Reply::Pending(_))
    }

    /// Drive the reply to its final result.
    pub async fn resolve(self) -> HandlerResult {
        match self {
            Reply::Ready(result) => result,
            Reply::Pending(future) => future.await,
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Ready(Ok(response))
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Ready(Ok(response)) => f
                .debug_tuple("Ready")
                .field(&response.status())
                .finish(),
            Reply::Ready(Err(e)) => f.debug_tuple("Ready").field(&e.to_string()).finish(),
            Reply::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// What a middleware hands back to the dispatcher.
#[derive(Debug)]
pub enum Flow {
    /// Keep scanning the remaining routes.
    Continue,
    /// Stop dispatch and answer with this response.
    Terminate(Response),
}

impl Flow {
    pub fn terminate(response: impl IntoResponse) -> Self {
        Flow::Terminate(response.into_response())
    }
}

/// Request handler bound to a concrete route.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request, params: Params) -> Reply;
}

impl<F> Handler for F
where
    F: Fn(Request, Params) -> Reply + Send + Sync + 'static,
{
    fn call(&self, request: Request, params: Params) -> Reply {
        self(request, params)
    }
}

/// Global interceptor consulted during the route scan.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, request: &Request) -> Result<Flow, BoxError>;
}

impl<F> Middleware for F
where
    F: Fn(&Request) -> Result<Flow, BoxError> + Send + Sync + 'static,
{
    fn call(&self, request: &Request) -> Result<Flow, BoxError> {
        self(request)
    }
}
