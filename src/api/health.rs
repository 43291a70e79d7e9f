use axum::{response::IntoResponse, Json};
use serde_json::json;

/// 健康检查端点，不访问上游
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "TMDb API service is running"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_body() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "TMDb API service is running");
    }
}
