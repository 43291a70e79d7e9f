pub mod cache;
pub mod tmdb;

use std::sync::Arc;

pub use cache::{CacheCleanupTask, CacheStats, MemoryCache, ResponseCache};
pub use tmdb::{TmdbClient, TmdbError, TmdbFetch};

use tmdb::{TmdbCreditsBody, TmdbSearchBody};

use crate::models::{ActorFilters, CreditsPage, MediaFilters, MediaType, PageRequest, SearchPage};

/// TMDb 网关服务
///
/// 每个操作执行"查缓存 → 取上游 → 归一化 → 写缓存"的流程。
/// 校验失败与上游错误不会进入缓存
#[derive(Clone)]
pub struct TmdbService {
    fetcher: Option<Arc<dyn TmdbFetch>>,
    pub cache: ResponseCache,
}

impl TmdbService {
    /// 从环境变量构建服务
    ///
    /// 缺少 TMDB_API_KEY 时服务照常启动，首次取数时报配置错误
    pub fn from_env() -> Self {
        let fetcher = std::env::var("TMDB_API_KEY")
            .ok()
            .map(|api_key| Arc::new(TmdbClient::new(api_key)) as Arc<dyn TmdbFetch>);

        Self {
            fetcher,
            cache: ResponseCache::new(),
        }
    }

    /// 使用自定义取数实现构建服务（测试注入桩）
    pub fn with_fetcher(fetcher: Arc<dyn TmdbFetch>) -> Self {
        Self {
            fetcher: Some(fetcher),
            cache: ResponseCache::new(),
        }
    }

    /// TMDb 客户端是否已配置
    pub fn is_available(&self) -> bool {
        self.fetcher.is_some()
    }

    /// 搜索演员（带缓存）
    ///
    /// min_popularity 与 gender 由上游过滤；出生年份区间上游不支持，
    /// 只能对已分页的返回列表做本地后置过滤再截断到 per_page。
    /// 已知局限：被过滤掉的记录仍计入上游报告的 total_results，
    /// 截断也只是近似分页，不是真正的重新分页
    pub async fn search_actors(
        &self,
        query: &str,
        filters: &ActorFilters,
        paging: &PageRequest,
    ) -> Result<SearchPage, TmdbError> {
        if let Some(hit) = self.cache.get_actor_search(query, filters, paging) {
            tracing::debug!("Cache hit for actor search: {} (page {})", query, paging.page);
            return Ok(hit);
        }

        let fetcher = match &self.fetcher {
            Some(fetcher) => fetcher,
            None => return Err(TmdbError::MissingApiKey),
        };

        let mut params = vec![
            ("query".to_string(), query.to_string()),
            ("page".to_string(), paging.page.to_string()),
        ];
        params.extend(filters.upstream_params());

        let body = fetcher.get_json("/search/person", &params).await?;
        let body: TmdbSearchBody =
            serde_json::from_value(body).map_err(|e| TmdbError::Decode(e.to_string()))?;

        let mut results = body.results;
        if filters.has_birth_year_bounds() {
            results.retain(|record| filters.birth_year_allows(record));
            results.truncate(paging.per_page as usize);
        }

        let page = SearchPage {
            total_results: body.total_results.unwrap_or(results.len() as u64),
            page: body.page.unwrap_or(paging.page),
            total_pages: body.total_pages.unwrap_or(1),
            per_page: paging.per_page,
            results,
        };

        self.cache
            .set_actor_search(query, filters, paging, page.clone());
        tracing::debug!("Cached actor search results: {} (page {})", query, paging.page);

        Ok(page)
    }

    /// 获取演员影视作品列表（带缓存）
    ///
    /// 上游 combined_credits 一次性返回全部演职记录，分页在本地完成
    pub async fn get_actor_filmography(
        &self,
        actor_id: u64,
        paging: &PageRequest,
    ) -> Result<CreditsPage, TmdbError> {
        if let Some(hit) = self.cache.get_filmography(actor_id, paging) {
            tracing::debug!("Cache hit for filmography: {} (page {})", actor_id, paging.page);
            return Ok(hit);
        }

        let fetcher = match &self.fetcher {
            Some(fetcher) => fetcher,
            None => return Err(TmdbError::MissingApiKey),
        };

        let path = format!("/person/{}/combined_credits", actor_id);
        let body = fetcher.get_json(&path, &[]).await?;
        let body: TmdbCreditsBody =
            serde_json::from_value(body).map_err(|e| TmdbError::Decode(e.to_string()))?;

        let page = Self::paginate_credits(body, paging);

        self.cache.set_filmography(actor_id, paging, page.clone());
        tracing::debug!("Cached filmography: {} (page {})", actor_id, paging.page);

        Ok(page)
    }

    /// 搜索电影或电视剧（带缓存）
    ///
    /// 全部过滤条件都由上游执行，返回列表截断到 per_page
    pub async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        filters: &MediaFilters,
        paging: &PageRequest,
    ) -> Result<SearchPage, TmdbError> {
        if let Some(hit) = self.cache.get_media_search(query, media_type, filters, paging) {
            tracing::debug!(
                "Cache hit for {} search: {} (page {})",
                media_type,
                query,
                paging.page
            );
            return Ok(hit);
        }

        let fetcher = match &self.fetcher {
            Some(fetcher) => fetcher,
            None => return Err(TmdbError::MissingApiKey),
        };

        let mut params = vec![
            ("query".to_string(), query.to_string()),
            ("page".to_string(), paging.page.to_string()),
        ];
        params.extend(filters.upstream_params());

        let path = format!("/search/{}", media_type.as_str());
        let body = fetcher.get_json(&path, &params).await?;
        let body: TmdbSearchBody =
            serde_json::from_value(body).map_err(|e| TmdbError::Decode(e.to_string()))?;

        let mut results = body.results;
        results.truncate(paging.per_page as usize);

        let page = SearchPage {
            total_results: body.total_results.unwrap_or(0),
            page: body.page.unwrap_or(paging.page),
            total_pages: body.total_pages.unwrap_or(1),
            per_page: paging.per_page,
            results,
        };

        self.cache
            .set_media_search(query, media_type, filters, paging, page.clone());
        tracing::debug!(
            "Cached {} search results: {} (page {})",
            media_type,
            query,
            paging.page
        );

        Ok(page)
    }

    /// 获取影视作品演职员表（带缓存）
    ///
    /// 上游 credits 端点不分页，分页在本地完成
    pub async fn get_media_cast(
        &self,
        media_id: u64,
        media_type: MediaType,
        paging: &PageRequest,
    ) -> Result<CreditsPage, TmdbError> {
        if let Some(hit) = self.cache.get_media_cast(media_type, media_id, paging) {
            tracing::debug!(
                "Cache hit for {} cast: {} (page {})",
                media_type,
                media_id,
                paging.page
            );
            return Ok(hit);
        }

        let fetcher = match &self.fetcher {
            Some(fetcher) => fetcher,
            None => return Err(TmdbError::MissingApiKey),
        };

        let path = format!("/{}/{}/credits", media_type.as_str(), media_id);
        let body = fetcher.get_json(&path, &[]).await?;
        let body: TmdbCreditsBody =
            serde_json::from_value(body).map_err(|e| TmdbError::Decode(e.to_string()))?;

        let page = Self::paginate_credits(body, paging);

        self.cache
            .set_media_cast(media_type, media_id, paging, page.clone());
        tracing::debug!(
            "Cached {} cast: {} (page {})",
            media_type,
            media_id,
            paging.page
        );

        Ok(page)
    }

    /// 对上游未分页的演职员表计算本地分页
    ///
    /// cast 与 crew 按同一窗口独立切片；total_results 为切片前两表之和，
    /// 窗口越界返回空页而不是错误
    fn paginate_credits(body: TmdbCreditsBody, paging: &PageRequest) -> CreditsPage {
        let window = paging.window();
        let total_results = (body.cast.len() + body.crew.len()) as u64;

        CreditsPage {
            cast: window.slice(&body.cast).to_vec(),
            crew: window.slice(&body.crew).to_vec(),
            page: paging.page,
            per_page: paging.per_page,
            total_pages: paging.total_pages(total_results),
            total_results,
        }
    }
}
