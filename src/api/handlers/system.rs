use crate::api::models::HealthResponse;
use axum::Json;

pub const SERVICE_NAME: &str = "DGH Care API";

/// Handler for GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let Json(health) = health_check().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, SERVICE_NAME);
        assert!(!health.version.is_empty());
    }
}
