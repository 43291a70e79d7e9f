use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::error::ApiError;
use super::AppState;

/// 限流窗口长度
pub const RATE_WINDOW: Duration = Duration::from_secs(60);
/// /api/ 路由每窗口允许的请求数
pub const API_ROUTE_LIMIT: usize = 60;
/// 其余路由的进程默认配额
pub const DEFAULT_ROUTE_LIMIT: usize = 100;

/// 限流检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

/// 滑动窗口限流器
///
/// 以 "客户端地址:路由模板" 为键记录窗口内每次请求的时刻，
/// 检查时丢弃窗口外的记录，满额则拒绝
#[derive(Clone)]
pub struct RateLimiter {
    hits: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    window: Duration,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            hits: Arc::new(RwLock::new(HashMap::new())),
            window,
        }
    }

    /// 检查并记录一次请求，满额时给出建议的重试等待秒数
    pub fn check(&self, key: &str, max_requests: usize) -> RateDecision {
        let now = Instant::now();
        let mut hits = match self.hits.write() {
            Ok(hits) => hits,
            Err(_) => return RateDecision::Allowed,
        };

        let stamps = hits.entry(key.to_string()).or_default();
        stamps.retain(|hit| now.duration_since(*hit) < self.window);

        if stamps.len() >= max_requests {
            // 时间戳按到达顺序排列，首个即最早，等它滑出窗口后才有余量
            let retry_after = stamps
                .first()
                .map(|oldest| {
                    let wait = self.window.saturating_sub(now.duration_since(*oldest));
                    let mut secs = wait.as_secs();
                    if wait.subsec_nanos() > 0 {
                        secs += 1;
                    }
                    secs
                })
                .unwrap_or(1)
                .max(1);
            return RateDecision::Limited { retry_after };
        }

        stamps.push(now);
        RateDecision::Allowed
    }

    /// 清理窗口外的记录，空键一并移除
    pub fn prune_idle(&self) {
        if let Ok(mut hits) = self.hits.write() {
            let now = Instant::now();
            hits.retain(|_, stamps| {
                stamps.retain(|hit| now.duration_since(*hit) < self.window);
                !stamps.is_empty()
            });
        }
    }

    /// 当前跟踪的键数量
    pub fn tracked_keys(&self) -> usize {
        self.hits.read().map(|hits| hits.len()).unwrap_or(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_WINDOW)
    }
}

/// 路由配额，/api/ 前缀的路由使用更严格的专属配额
fn limit_for(route: &str) -> usize {
    if route.starts_with("/api/") {
        API_ROUTE_LIMIT
    } else {
        DEFAULT_ROUTE_LIMIT
    }
}

/// 限流中间件
///
/// 每个路由独立计数，未匹配到路由模板时退化为请求路径
pub async fn enforce(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let route = matched_path
        .as_ref()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let key = format!("{}:{}", addr.ip(), route);

    match state.limiter.check(&key, limit_for(&route)) {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!(
                "Rate limit exceeded: key={}, retry_after={}s",
                key,
                retry_after
            );
            let mut response =
                ApiError::RateLimited("Rate limit exceeded".to_string()).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
