use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::external::TmdbError;
use crate::models::ValidationError;

/// 统一的 API 错误类型
///
/// 校验器与上游客户端抛出的所有错误都经由这里转换成
/// `{"error": true, "message": ..., "code": ...}` 响应，
/// HTTP 状态码与 code 字段一致
#[derive(Debug)]
pub enum ApiError {
    /// 请求参数校验错误
    Validation(String),
    /// 未找到资源
    NotFound(String),
    /// 触发限流（网关自身或上游）
    RateLimited(String),
    /// 上游错误，状态码原样回传
    Upstream { status: u16, message: String },
    /// 配置错误（缺少 API key）
    Configuration(String),
    /// 内部服务器错误，对外不泄露细节
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            ApiError::Upstream { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            ApiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// 从校验错误转换
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// 从上游错误转换
impl From<TmdbError> for ApiError {
    fn from(err: TmdbError) -> Self {
        let message = err.to_string();
        match err {
            TmdbError::MissingApiKey => ApiError::Configuration(message),
            TmdbError::RateLimited => ApiError::RateLimited(message),
            TmdbError::Status(code) => ApiError::Upstream {
                status: code,
                message,
            },
            TmdbError::Network(_) | TmdbError::Decode(_) => ApiError::Internal(message),
        }
    }
}

/// 实现 IntoResponse，将错误转换为 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Upstream { status, message } => {
                tracing::error!("Upstream error ({}): {}", status, message);
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    message,
                )
            }
            ApiError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// 未匹配路由的兜底处理
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
