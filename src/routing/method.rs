//! Request methods understood by the route table.
//!
//! Handler routes are registered for one concrete [`Method`]. Middleware
//! routes carry a [`MethodFilter`], whose `Any` variant is the wildcard
//! method (`*`) and admits every incoming method, including ones outside
//! the enumeration (HEAD, PATCH, ...).

use std::fmt;

use axum::http;

/// Concrete method a handler route is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Map an incoming HTTP method onto the enumeration.
    ///
    /// Returns `None` for methods no handler route can be registered for.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::GET => Some(Method::Get),
            http::Method::POST => Some(Method::Post),
            http::Method::PUT => Some(Method::Put),
            http::Method::DELETE => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// True if `method` is this exact method.
    pub fn is(&self, method: &http::Method) -> bool {
        Self::from_http(method) == Some(*self)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method condition of a middleware route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodFilter {
    /// Wildcard (`*`): every method applies.
    #[default]
    Any,
    Only(Method),
}

impl MethodFilter {
    pub fn admits(&self, method: &http::Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(m) => m.is(method),
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Only(method)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(m) => m.fmt(f),
        }
    }
}
