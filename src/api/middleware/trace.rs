use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Extension type for storing trace ID in request extensions
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reuse a caller-supplied UUID trace id, otherwise mint one
fn incoming_trace_id(request: &Request) -> String {
    request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
        .to_string()
}

/// Runs each request inside an `http_request` span carrying its trace id, and
/// echoes the id back in the `X-Trace-Id` response header.
pub async fn trace_id_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = incoming_trace_id(&request);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let mut response = async move {
        let started = std::time::Instant::now();
        let response = next.run(request).await;
        tracing::info!(
            status = %response.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
