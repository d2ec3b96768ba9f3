//! Request dispatch.
//!
//! # Responsibilities
//! - Scan the route table in registration order
//! - Run middleware routes whose method filter admits the request
//! - Hand the request to the first handler route that matches
//! - Fall back to the 404 response when the scan runs out
//!
//! # Design Decisions
//! - Single linear pass, one winner
//! - Table is read-only here, so concurrent dispatches need no locks
//! - Middleware and handler failures are returned, never swallowed
//! - Pending replies are awaited by the caller, not by the scan

use axum::extract::Request;
use axum::response::Response;

use crate::routing::error::DispatchError;
use crate::routing::fallback;
use crate::routing::handler::{Flow, Reply};
use crate::routing::table::{Route, RouteTable};

/// Which entry (if any) decided the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Handler(usize),
    Middleware(usize),
    Fallback,
}

/// Result of a dispatch.
#[derive(Debug)]
pub enum Dispatch {
    /// A handler route matched; its reply may still be pending.
    Handled { route: usize, reply: Reply },
    /// A middleware route terminated the scan.
    Intercepted { route: usize, response: Response },
    /// Nothing matched.
    NotFound(Response),
}

impl Dispatch {
    pub fn decision(&self) -> Decision {
        match self {
            Dispatch::Handled { route, .. } => Decision::Handler(*route),
            Dispatch::Intercepted { route, .. } => Decision::Middleware(*route),
            Dispatch::NotFound(_) => Decision::Fallback,
        }
    }

    /// Produce the final response, awaiting a pending handler reply.
    pub async fn into_response(self) -> Result<Response, DispatchError> {
        match self {
            Dispatch::Handled { route, reply } => reply
                .resolve()
                .await
                .map_err(|source| DispatchError::Handler { route, source }),
            Dispatch::Intercepted { response, .. } => Ok(response),
            Dispatch::NotFound(response) => Ok(response),
        }
    }
}

/// Dispatches requests against a frozen route table.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: RouteTable,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn dispatch(&self, request: Request) -> Result<Dispatch, DispatchError> {
        dispatch(request, &self.table)
    }
}

/// Route a single request through `table`.
pub fn dispatch(request: Request, table: &RouteTable) -> Result<Dispatch, DispatchError> {
    for (index, route) in table.iter().enumerate() {
        match route {
            Route::Middleware(entry) => {
                if !entry.methods.admits(request.method()) {
                    continue;
                }
                let flow = entry
                    .middleware
                    .call(&request)
                    .map_err(|source| DispatchError::Middleware { route: index, source })?;
                match flow {
                    Flow::Continue => continue,
                    Flow::Terminate(response) => {
                        tracing::debug!(
                            route = index,
                            method = %request.method(),
                            path = %request.uri().path(),
                            status = response.status().as_u16(),
                            "Middleware terminated dispatch"
                        );
                        return Ok(Dispatch::Intercepted { route: index, response });
                    }
                }
            }
            Route::Handler(entry) => {
                if !entry.method.is(request.method()) {
                    continue;
                }
                let Some(params) = entry.pattern.matches(request.uri().path()) else {
                    continue;
                };
                tracing::debug!(
                    route = index,
                    method = %entry.method,
                    pattern = %entry.pattern,
                    params = params.len(),
                    "Route matched"
                );
                let reply = entry.handler.call(request, params);
                return Ok(Dispatch::Handled { route: index, reply });
            }
        }
    }

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        "No route matched"
    );
    Ok(Dispatch::NotFound(fallback::not_found()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::Params;
    use crate::routing::method::{Method, MethodFilter};
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::BoxError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request(method: &str, path: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn echo(tag: &'static str) -> impl Fn(Request, Params) -> Reply + Send + Sync + 'static {
        move |_req, params| {
            let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            pairs.sort();
            Reply::ok(format!("{tag}:{}", pairs.join(",")))
        }
    }

    #[tokio::test]
    async fn test_literal_route_has_empty_params() {
        let mut builder = RouteTable::builder();
        builder.get("/about", echo("about")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("GET", "/about")).unwrap();
        assert_eq!(outcome.decision(), Decision::Handler(0));
        let response = outcome.into_response().await.unwrap();
        assert_eq!(body_text(response).await, "about:");
    }

    #[tokio::test]
    async fn test_method_must_match() {
        let mut builder = RouteTable::builder();
        builder.post("/items", echo("create")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("GET", "/items")).unwrap();
        assert_eq!(outcome.decision(), Decision::Fallback);
    }

    #[tokio::test]
    async fn test_params_extracted() {
        let mut builder = RouteTable::builder();
        builder.get("/users/:uid/posts/:pid", echo("post")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let response = dispatcher
            .dispatch(request("GET", "/users/1/posts/2"))
            .unwrap()
            .into_response()
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "post:pid=2,uid=1");
    }

    #[tokio::test]
    async fn test_query_string_ignored() {
        let mut builder = RouteTable::builder();
        builder.get("/blog/:id", echo("blog")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let response = dispatcher
            .dispatch(request("GET", "/blog/42?draft=true"))
            .unwrap()
            .into_response()
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "blog:id=42");
    }

    #[tokio::test]
    async fn test_first_registered_wins() {
        let mut builder = RouteTable::builder();
        builder.get("/blog/:id", echo("param")).unwrap();
        builder.get("/blog/latest", echo("literal")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("GET", "/blog/latest")).unwrap();
        assert_eq!(outcome.decision(), Decision::Handler(0));
    }

    #[tokio::test]
    async fn test_middleware_terminates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = calls.clone();

        let mut builder = RouteTable::builder();
        builder.add_middleware(MethodFilter::Any, |_req: &Request| -> Result<Flow, BoxError> {
            Ok(Flow::terminate((StatusCode::UNAUTHORIZED, "denied")))
        });
        builder
            .get("/secret", move |_req: Request, _params: Params| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Reply::ok("secret")
            })
            .unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("GET", "/secret")).unwrap();
        assert_eq!(outcome.decision(), Decision::Middleware(0));
        let response = outcome.into_response().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_middleware_continue_falls_through() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();

        let mut builder = RouteTable::builder();
        builder.add_middleware(MethodFilter::Any, move |_req: &Request| -> Result<Flow, BoxError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });
        builder.get("/", echo("home")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("GET", "/")).unwrap();
        assert_eq!(outcome.decision(), Decision::Handler(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_middleware_method_filter() {
        let mut builder = RouteTable::builder();
        builder.add_middleware(Method::Post, |_req: &Request| -> Result<Flow, BoxError> {
            Ok(Flow::terminate(StatusCode::FORBIDDEN))
        });
        builder.get("/x", echo("x")).unwrap();
        builder.post("/x", echo("x")).unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let get = dispatcher.dispatch(request("GET", "/x")).unwrap();
        assert_eq!(get.decision(), Decision::Handler(1));
        let post = dispatcher.dispatch(request("POST", "/x")).unwrap();
        assert_eq!(post.decision(), Decision::Middleware(0));
    }

    #[tokio::test]
    async fn test_wildcard_middleware_sees_unlisted_methods() {
        let mut builder = RouteTable::builder();
        builder.add_middleware(MethodFilter::Any, |req: &Request| -> Result<Flow, BoxError> {
            if req.method() == axum::http::Method::OPTIONS {
                return Ok(Flow::terminate(StatusCode::NO_CONTENT));
            }
            Ok(Flow::Continue)
        });
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("OPTIONS", "/anything")).unwrap();
        assert_eq!(outcome.decision(), Decision::Middleware(0));
        let outcome = dispatcher.dispatch(request("PATCH", "/anything")).unwrap();
        assert_eq!(outcome.decision(), Decision::Fallback);
    }

    #[tokio::test]
    async fn test_middleware_after_handler_not_reached() {
        let mut builder = RouteTable::builder();
        builder.get("/a", echo("a")).unwrap();
        builder.add_middleware(MethodFilter::Any, |_req: &Request| -> Result<Flow, BoxError> {
            Ok(Flow::terminate(StatusCode::IM_A_TEAPOT))
        });
        let dispatcher = Dispatcher::new(builder.build());

        assert_eq!(
            dispatcher.dispatch(request("GET", "/a")).unwrap().decision(),
            Decision::Handler(0)
        );
        assert_eq!(
            dispatcher.dispatch(request("GET", "/b")).unwrap().decision(),
            Decision::Middleware(1)
        );
    }

    #[tokio::test]
    async fn test_middleware_error_propagates() {
        let mut builder = RouteTable::builder();
        builder.add_middleware(MethodFilter::Any, |_req: &Request| -> Result<Flow, BoxError> {
            Err("session store down".into())
        });
        let dispatcher = Dispatcher::new(builder.build());

        let err = dispatcher.dispatch(request("GET", "/")).unwrap_err();
        assert!(matches!(err, DispatchError::Middleware { route: 0, .. }));
        assert!(err.to_string().contains("session store down"));
    }

    #[tokio::test]
    async fn test_handler_error_surfaces_on_resolve() {
        let mut builder = RouteTable::builder();
        builder
            .delete("/items/:id", |_req: Request, _params: Params| Reply::err("locked"))
            .unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("DELETE", "/items/9")).unwrap();
        let err = outcome.into_response().await.unwrap_err();
        assert_eq!(err.route(), 0);
        assert!(matches!(err, DispatchError::Handler { .. }));
    }

    #[tokio::test]
    async fn test_pending_reply_not_awaited_by_dispatch() {
        let (tx, rx) = tokio::sync::oneshot::channel::<&'static str>();
        let rx = std::sync::Mutex::new(Some(rx));

        let mut builder = RouteTable::builder();
        builder
            .put("/slow", move |_req: Request, _params: Params| {
                let rx = rx.lock().unwrap().take().unwrap();
                Reply::pending(async move {
                    let body = rx.await?;
                    Ok(body.into_response())
                })
            })
            .unwrap();
        let dispatcher = Dispatcher::new(builder.build());

        let outcome = dispatcher.dispatch(request("PUT", "/slow")).unwrap();
        match &outcome {
            Dispatch::Handled { reply, .. } => assert!(reply.is_pending()),
            other => panic!("unexpected outcome: {other:?}"),
        }

        tx.send("done").unwrap();
        let response = outcome.into_response().await.unwrap();
        assert_eq!(body_text(response).await, "done");
    }

    #[tokio::test]
    async fn test_fallback_when_empty() {
        let dispatcher = Dispatcher::default();
        let response = dispatcher
            .dispatch(request("GET", "/"))
            .unwrap()
            .into_response()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not found");
    }
}
