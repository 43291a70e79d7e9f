pub mod actors;
pub mod error;
pub mod health;
pub mod media;
pub mod rate_limit;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::external::TmdbService;
use error::ApiError;
use rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub tmdb: TmdbService,
    pub limiter: RateLimiter,
}

/// 查询参数提取器
///
/// 包装 axum 的 Query，解析失败时返回统一的校验错误响应，
/// 未声明的参数会被直接忽略
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Params(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}
