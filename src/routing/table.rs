//! Route table construction.
//!
//! # Responsibilities
//! - Accumulate routes during setup, in registration order
//! - Validate patterns at registration time
//! - Freeze the routes into an immutable, shareable snapshot
//!
//! # Design Decisions
//! - Append only: no removal or reordering
//! - Registration order is precedence order, middleware included
//! - `build()` consumes the builder, so nothing can be registered once
//!   serving starts

use std::fmt;
use std::sync::Arc;

use crate::routing::error::PatternError;
use crate::routing::handler::{Handler, Middleware};
use crate::routing::matcher::PathPattern;
use crate::routing::method::{Method, MethodFilter};

/// Pattern shown for middleware routes.
pub const MIDDLEWARE_PATTERN: &str = "*";

/// A route answered by a handler.
pub struct HandlerRoute {
    pub method: Method,
    pub pattern: PathPattern,
    pub(crate) handler: Arc<dyn Handler>,
}

/// A global middleware entry (pattern `*`).
pub struct MiddlewareRoute {
    pub methods: MethodFilter,
    pub(crate) middleware: Arc<dyn Middleware>,
}

/// One entry of the route table.
pub enum Route {
    Handler(HandlerRoute),
    Middleware(MiddlewareRoute),
}

impl Route {
    pub fn pattern(&self) -> &str {
        match self {
            Route::Handler(route) => route.pattern.as_str(),
            Route::Middleware(_) => MIDDLEWARE_PATTERN,
        }
    }

    pub fn method(&self) -> MethodFilter {
        match self {
            Route::Handler(route) => MethodFilter::Only(route.method),
            Route::Middleware(route) => route.methods,
        }
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self, Route::Middleware(_))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method().to_string())
            .field("pattern", &self.pattern())
            .field("middleware", &self.is_middleware())
            .finish()
    }
}

/// Collects routes during setup.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler route.
    ///
    /// Fails if the pattern is malformed; nothing is appended in that case.
    pub fn add_route<H: Handler>(
        &mut self,
        pattern: &str,
        method: Method,
        handler: H,
    ) -> Result<&mut Self, PatternError> {
        let pattern = PathPattern::parse(pattern)?;
        tracing::debug!(
            route = self.routes.len(),
            method = %method,
            pattern = %pattern,
            "Route registered"
        );
        self.routes.push(Route::Handler(HandlerRoute {
            method,
            pattern,
            handler: Arc::new(handler),
        }));
        Ok(self)
    }

    /// Append a middleware route for the given method filter.
    pub fn add_middleware<M: Middleware>(
        &mut self,
        methods: impl Into<MethodFilter>,
        middleware: M,
    ) -> &mut Self {
        let methods = methods.into();
        tracing::debug!(
            route = self.routes.len(),
            method = %methods,
            "Middleware registered"
        );
        self.routes.push(Route::Middleware(MiddlewareRoute {
            methods,
            middleware: Arc::new(middleware),
        }));
        self
    }

    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
        self.add_route(pattern, Method::Get, handler)
    }

    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
        self.add_route(pattern, Method::Post, handler)
    }

    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
        self.add_route(pattern, Method::Put, handler)
    }

    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
        self.add_route(pattern, Method::Delete, handler)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the table.
    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes.into(),
        }
    }
}

impl fmt::Debug for RouteTableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}

/// Immutable, ordered route snapshot. Cloning shares the same routes.
#[derive(Clone)]
pub struct RouteTable {
    routes: Arc<[Route]>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            routes: Arc::from(Vec::new()),
        }
    }
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// One line per route, in registration order: index, method, pattern.
    pub fn describe(&self) -> Vec<String> {
        self.routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                format!("{index:>3}  {:<6} {}", route.method().to_string(), route.pattern())
            })
            .collect()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
