use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// The API only ever returns JSON, so nothing may be loaded or framed
const API_CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

/// Configuration for security headers
#[derive(Clone, Debug, Default)]
pub struct SecurityHeadersConfig {
    /// Emit `Strict-Transport-Security`
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
}

impl SecurityHeadersConfig {
    pub fn new(enable_hsts: bool, hsts_max_age: u64) -> Self {
        Self {
            enable_hsts,
            hsts_max_age,
        }
    }
}

/// Adds nosniff, frame-deny, CSP, no-store and (optionally) HSTS headers to every response
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(API_CONTENT_SECURITY_POLICY),
    );
    // Responses carry patient data
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if config.enable_hsts {
        let hsts = format!("max-age={}; includeSubDomains", config.hsts_max_age);
        if let Ok(value) = HeaderValue::from_str(&hsts) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
        }
    }

    response
}
