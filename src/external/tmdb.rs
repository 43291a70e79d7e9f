use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// TMDb API 基础地址
const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// 上游请求错误
///
/// 状态码在此保留，最终由 ApiError 统一映射成客户端响应
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("TMDB API key not found in environment variables")]
    MissingApiKey,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("TMDb API error: {0}")]
    Status(u16),

    #[error("TMDb request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode TMDb response: {0}")]
    Decode(String),
}

impl TmdbError {
    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            TmdbError::MissingApiKey => 500,
            TmdbError::RateLimited => 429,
            TmdbError::Status(code) => *code,
            TmdbError::Network(_) | TmdbError::Decode(_) => 500,
        }
    }
}

/// 上游取数接口
///
/// 单次 GET、无重试。测试以固定 JSON 的桩实现替换真实客户端
#[async_trait]
pub trait TmdbFetch: Send + Sync {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, TmdbError>;
}

/// TMDb API 客户端
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: TMDB_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl TmdbFetch for TmdbClient {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, TmdbError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => response
                .json::<Value>()
                .await
                .map_err(|e| TmdbError::Decode(e.to_string())),
            429 => Err(TmdbError::RateLimited),
            code => Err(TmdbError::Status(code)),
        }
    }
}

/// 搜索类端点响应体
///
/// 上游偶尔缺字段，缺省值的选取由服务层决定；记录本身原样透传
#[derive(Debug, Deserialize)]
pub struct TmdbSearchBody {
    pub page: Option<u64>,
    #[serde(default)]
    pub results: Vec<Value>,
    pub total_pages: Option<u64>,
    pub total_results: Option<u64>,
}

/// 演职员类端点响应体（上游对这类资源不分页）
#[derive(Debug, Deserialize)]
pub struct TmdbCreditsBody {
    #[serde(default)]
    pub cast: Vec<Value>,
    #[serde(default)]
    pub crew: Vec<Value>,
}
