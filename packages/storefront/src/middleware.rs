//! Request correlation and per-surface accounting.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{warn, Instrument};

use crate::metrics::METRICS;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Which part of the storefront a path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Page,
    Api,
    Ops,
}

impl Surface {
    pub fn of(path: &str) -> Self {
        match path {
            "/health" | "/metrics" => Self::Ops,
            p if p.starts_with("/api/") => Self::Api,
            _ => Self::Page,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Api => "api",
            Self::Ops => "ops",
        }
    }
}

/// A caller id is kept only when it is short and made of token characters,
/// since it lands in logs and the response header.
fn caller_request_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'));
    valid.then(|| raw.to_string())
}

fn generate_request_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    format!("sf-{:016x}", rng.gen::<u64>())
}

/// Propagate or generate `x-request-id`, tag the request span with its
/// surface and count API traffic and 5xx responses.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let request_id = caller_request_id(&request).unwrap_or_else(generate_request_id);
    let surface = Surface::of(request.uri().path());
    if surface == Surface::Api {
        METRICS.api_requests.fetch_add(1, Ordering::Relaxed);
    }

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", req_id = %request_id, surface = surface.as_str());
    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    if status.is_server_error() {
        METRICS.server_errors.fetch_add(1, Ordering::Relaxed);
        span.in_scope(|| {
            warn!(
                status = status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request failed"
            );
        });
    }

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    response
}

/// Request correlation ID, extractable from `Request::extensions()`.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);
