//! Error responses produced by the host.
//!
//! # Design Decisions
//! - Handler and middleware failures become 500
//! - Diagnostic bodies only in development mode; production gets a fixed body

use std::any::Any;
use std::error::Error;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// 500 response for a failed dispatch.
pub fn internal_error(error: &(dyn Error + 'static), dev_mode: bool) -> Response {
    if !dev_mode {
        return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response();
    }

    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        detail.push_str("\ncaused by: ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail.push('\n');
    detail.push_str(&format!("{error:?}"));

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<pre>{}</pre>", escape_html(&detail))),
    )
        .into_response()
}

/// 500 response for a handler panic.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, dev_mode: bool) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %message, "Handler panicked");

    if dev_mode {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<pre>panic: {}</pre>", escape_html(&message))),
        )
            .into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::DispatchError;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn failure() -> DispatchError {
        DispatchError::Handler {
            route: 2,
            source: "db <closed>".into(),
        }
    }

    #[tokio::test]
    async fn test_production_body_is_fixed() {
        let response = internal_error(&failure(), false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_dev_body_has_detail() {
        let response = internal_error(&failure(), true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.starts_with("<pre>handler at route 2 failed"));
        assert!(body.contains("db &lt;closed&gt;"));
    }

    #[tokio::test]
    async fn test_panic_payloads() {
        let response = panic_response(Box::new("bad state"), true);
        assert_eq!(body_text(response).await, "<pre>panic: bad state</pre>");

        let response = panic_response(Box::new(String::from("owned")), false);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }
}
