use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};

use crate::models::{ActorFilters, CreditsPage, MediaFilters, MediaType, PageRequest, SearchPage};

/// 进程级默认缓存时长
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
/// 记忆化操作结果的缓存时长
pub const RESULT_TTL: Duration = Duration::from_secs(300);

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 内存缓存实现
///
/// 过期条目按未命中处理，实际回收由定期清理任务完成
#[derive(Debug, Clone)]
pub struct MemoryCache<T> {
    cache: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    default_ttl: Duration,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;

        if entry.is_expired() {
            drop(cache);
            self.remove(key);
            None
        } else {
            Some(entry.data.clone())
        }
    }

    pub fn set(&self, key: String, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: String, value: T, ttl: Duration) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, CacheEntry::new(value, ttl));
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn size(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

/// 网关响应缓存
///
/// 键为"操作名:规范化参数"，命中直接返回已归一化的封套。
/// 错误结果从不写入，只有成功归一化的页才会被记忆
#[derive(Debug, Clone)]
pub struct ResponseCache {
    search_cache: MemoryCache<SearchPage>,
    credits_cache: MemoryCache<CreditsPage>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            search_cache: MemoryCache::new(DEFAULT_TTL),
            credits_cache: MemoryCache::new(DEFAULT_TTL),
        }
    }

    /// 生成演员搜索缓存键
    ///
    /// 查询串可能含 ':'，用长度前缀界定边界，避免与过滤片段混淆
    fn actor_search_key(query: &str, filters: &ActorFilters, paging: &PageRequest) -> String {
        format!(
            "actors:{}:{}:{}:{}:{}",
            query.len(),
            query,
            filters.cache_key(),
            paging.page,
            paging.per_page
        )
    }

    /// 生成媒体搜索缓存键
    ///
    /// 同演员搜索键，查询串带长度前缀
    fn media_search_key(
        query: &str,
        media_type: MediaType,
        filters: &MediaFilters,
        paging: &PageRequest,
    ) -> String {
        format!(
            "media:{}:{}:{}:{}:{}:{}",
            media_type.as_str(),
            query.len(),
            query,
            filters.cache_key(),
            paging.page,
            paging.per_page
        )
    }

    /// 生成影视作品列表缓存键
    fn filmography_key(actor_id: u64, paging: &PageRequest) -> String {
        format!("filmography:{}:{}:{}", actor_id, paging.page, paging.per_page)
    }

    /// 生成演职员表缓存键
    fn media_cast_key(media_type: MediaType, media_id: u64, paging: &PageRequest) -> String {
        format!(
            "credits:{}:{}:{}:{}",
            media_type.as_str(),
            media_id,
            paging.page,
            paging.per_page
        )
    }

    /// 获取演员搜索缓存
    pub fn get_actor_search(
        &self,
        query: &str,
        filters: &ActorFilters,
        paging: &PageRequest,
    ) -> Option<SearchPage> {
        self.search_cache
            .get(&Self::actor_search_key(query, filters, paging))
    }

    /// 设置演员搜索缓存
    pub fn set_actor_search(
        &self,
        query: &str,
        filters: &ActorFilters,
        paging: &PageRequest,
        page: SearchPage,
    ) {
        self.search_cache.set_with_ttl(
            Self::actor_search_key(query, filters, paging),
            page,
            RESULT_TTL,
        );
    }

    /// 获取媒体搜索缓存
    pub fn get_media_search(
        &self,
        query: &str,
        media_type: MediaType,
        filters: &MediaFilters,
        paging: &PageRequest,
    ) -> Option<SearchPage> {
        self.search_cache
            .get(&Self::media_search_key(query, media_type, filters, paging))
    }

    /// 设置媒体搜索缓存
    pub fn set_media_search(
        &self,
        query: &str,
        media_type: MediaType,
        filters: &MediaFilters,
        paging: &PageRequest,
        page: SearchPage,
    ) {
        self.search_cache.set_with_ttl(
            Self::media_search_key(query, media_type, filters, paging),
            page,
            RESULT_TTL,
        );
    }

    /// 获取影视作品列表缓存
    pub fn get_filmography(&self, actor_id: u64, paging: &PageRequest) -> Option<CreditsPage> {
        self.credits_cache
            .get(&Self::filmography_key(actor_id, paging))
    }

    /// 设置影视作品列表缓存
    pub fn set_filmography(&self, actor_id: u64, paging: &PageRequest, page: CreditsPage) {
        self.credits_cache
            .set_with_ttl(Self::filmography_key(actor_id, paging), page, RESULT_TTL);
    }

    /// 获取演职员表缓存
    pub fn get_media_cast(
        &self,
        media_type: MediaType,
        media_id: u64,
        paging: &PageRequest,
    ) -> Option<CreditsPage> {
        self.credits_cache
            .get(&Self::media_cast_key(media_type, media_id, paging))
    }

    /// 设置演职员表缓存
    pub fn set_media_cast(
        &self,
        media_type: MediaType,
        media_id: u64,
        paging: &PageRequest,
        page: CreditsPage,
    ) {
        self.credits_cache.set_with_ttl(
            Self::media_cast_key(media_type, media_id, paging),
            page,
            RESULT_TTL,
        );
    }

    /// 清理过期缓存
    pub fn cleanup_expired(&self) {
        self.search_cache.cleanup_expired();
        self.credits_cache.cleanup_expired();
    }

    /// 获取缓存统计信息
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            search_cache_size: self.search_cache.size(),
            credits_cache_size: self.credits_cache.size(),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 缓存统计信息
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub search_cache_size: usize,
    pub credits_cache_size: usize,
}

/// 缓存清理任务
pub struct CacheCleanupTask {
    cache: ResponseCache,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(cache: ResponseCache, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// 启动定期清理任务
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            self.cache.cleanup_expired();
            tracing::debug!("Cache cleanup completed. Stats: {:?}", self.cache.get_stats());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_page(per_page: u64) -> SearchPage {
        SearchPage {
            results: vec![serde_json::json!({ "id": 1 })],
            total_results: 1,
            page: 1,
            total_pages: 1,
            per_page,
        }
    }

    #[test]
    fn test_memory_cache_basic_operations() {
        let cache = MemoryCache::new(Duration::from_secs(1));

        // 设置和获取
        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        // 不存在的键
        assert_eq!(cache.get("nonexistent"), None);

        // 删除
        cache.remove("key1");
        assert_eq!(cache.get("key1"), None);

        // 清空
        cache.set("key2".to_string(), "value2".to_string());
        cache.set("key3".to_string(), "value3".to_string());
        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_memory_cache_expiration() {
        let cache = MemoryCache::new(Duration::from_millis(100));

        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        // 等待过期
        thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_memory_cache_cleanup_expired() {
        let cache = MemoryCache::new(Duration::from_millis(50));
        cache.set("short".to_string(), 1);
        cache.set_with_ttl("long".to_string(), 2, Duration::from_secs(60));

        thread::sleep(Duration::from_millis(80));
        cache.cleanup_expired();

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[test]
    fn test_response_cache_roundtrip() {
        let cache = ResponseCache::new();
        let filters = ActorFilters::default();
        let paging = PageRequest::default();

        assert!(cache.get_actor_search("tom", &filters, &paging).is_none());

        cache.set_actor_search("tom", &filters, &paging, sample_page(20));
        let hit = cache.get_actor_search("tom", &filters, &paging).unwrap();
        assert_eq!(hit.total_results, 1);

        let stats = cache.get_stats();
        assert_eq!(stats.search_cache_size, 1);
        assert_eq!(stats.credits_cache_size, 0);
    }

    #[test]
    fn test_response_cache_keys_include_all_arguments() {
        let cache = ResponseCache::new();
        let paging = PageRequest::default();
        let other_paging = PageRequest { page: 2, per_page: 20 };

        cache.set_actor_search("tom", &ActorFilters::default(), &paging, sample_page(20));

        // 不同页码或不同过滤条件都不应命中
        assert!(cache
            .get_actor_search("tom", &ActorFilters::default(), &other_paging)
            .is_none());
        let filtered = ActorFilters {
            min_popularity: Some(0.0),
            ..Default::default()
        };
        assert!(cache.get_actor_search("tom", &filtered, &paging).is_none());
    }

    #[test]
    fn test_query_with_delimiter_gets_its_own_key() {
        let cache = ResponseCache::new();
        let paging = PageRequest::default();

        // "a" + {mp=1,g=1} 与 "a:mp=1" + {g=1} 逐段拼接后字符相同，键必须仍能区分
        let both = ActorFilters {
            min_popularity: Some(1.0),
            gender: Some(1),
            ..Default::default()
        };
        cache.set_actor_search("a", &both, &paging, sample_page(20));

        let gender_only = ActorFilters {
            gender: Some(1),
            ..Default::default()
        };
        assert!(cache
            .get_actor_search("a:mp=1", &gender_only, &paging)
            .is_none());
    }

    #[test]
    fn test_search_and_credits_caches_are_separate() {
        let cache = ResponseCache::new();
        let paging = PageRequest::default();

        let credits = CreditsPage {
            cast: vec![],
            crew: vec![],
            page: 1,
            per_page: 20,
            total_pages: 0,
            total_results: 0,
        };
        cache.set_filmography(42, &paging, credits.clone());

        assert_eq!(cache.get_filmography(42, &paging), Some(credits));
        assert!(cache
            .get_media_cast(MediaType::Movie, 42, &paging)
            .is_none());
    }
}
