// 网关流程集成测试
//
// 用桩上游验证 校验 → 缓存 → 上游 → 归一化 → 响应 的完整链路

#[cfg(test)]
mod gateway_flow_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::{json, Value};

    use tmdb_gateway::api::actors::{
        actor_filmography_handler, search_actors_handler, ActorSearchQuery, FilmographyQuery,
    };
    use tmdb_gateway::api::error::ApiError;
    use tmdb_gateway::api::media::{
        media_cast_handler, search_media_handler, MediaCastQuery, MediaSearchQuery,
    };
    use tmdb_gateway::api::rate_limit::RateLimiter;
    use tmdb_gateway::api::{AppState, Params};
    use tmdb_gateway::external::{TmdbError, TmdbFetch, TmdbService};

    /// 返回固定 JSON 并统计调用次数的桩上游
    struct StubFetch {
        body: Value,
        calls: AtomicUsize,
    }

    impl StubFetch {
        fn new(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TmdbFetch for StubFetch {
        async fn get_json(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<Value, TmdbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    /// 固定返回上游错误的桩
    struct FailFetch {
        status: u16,
    }

    #[async_trait]
    impl TmdbFetch for FailFetch {
        async fn get_json(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<Value, TmdbError> {
            match self.status {
                429 => Err(TmdbError::RateLimited),
                code => Err(TmdbError::Status(code)),
            }
        }
    }

    fn state_with(fetcher: Arc<dyn TmdbFetch>) -> AppState {
        AppState {
            tmdb: TmdbService::with_fetcher(fetcher),
            limiter: RateLimiter::default(),
        }
    }

    fn actor_query(query: Option<&str>) -> ActorSearchQuery {
        ActorSearchQuery {
            query: query.map(String::from),
            page: None,
            per_page: None,
            min_popularity: None,
            gender: None,
            birth_year_from: None,
            birth_year_to: None,
        }
    }

    fn media_query(query: Option<&str>) -> MediaSearchQuery {
        MediaSearchQuery {
            query: query.map(String::from),
            media_type: None,
            page: None,
            per_page: None,
            year: None,
            genre_id: None,
            min_rating: None,
            language: None,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_actor_search_end_to_end() {
        let stub = StubFetch::new(json!({
            "page": 1,
            "results": [
                { "id": 1, "name": "kept",    "birthday": "1995-06-01" },
                { "id": 2, "name": "dropped", "birthday": "1960-01-01" },
                { "id": 3, "name": "unknown" },
            ],
            "total_pages": 3,
            "total_results": 50
        }));
        let state = state_with(stub.clone());

        let mut query = actor_query(Some("tom"));
        query.birth_year_from = Some("1990".to_string());

        let response = search_actors_handler(State(state), Params(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        // 出生年份后置过滤：1960 年的记录被丢弃，无生日的保留
        let ids: Vec<u64> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3]);

        // 信封字段完整，总数沿用上游报告值
        assert_eq!(body["total_results"], 50);
        assert_eq!(body["page"], 1);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["per_page"], 20);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_query_rejected_before_upstream() {
        let stub = StubFetch::new(json!({ "results": [] }));
        let state = state_with(stub.clone());

        let response = search_actors_handler(State(state), Params(actor_query(None)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Query parameter is required");
        assert_eq!(body["code"], 400);

        // 校验失败不触发上游调用
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_on_media_search() {
        let stub = StubFetch::new(json!({ "results": [] }));
        let state = state_with(stub.clone());

        let response = search_media_handler(State(state), Params(media_query(Some(""))))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Query parameter is required");
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let stub = StubFetch::new(json!({ "results": [] }));
        let state = state_with(stub.clone());

        let mut query = actor_query(Some("tom"));
        query.per_page = Some("101".to_string());
        let response = search_actors_handler(State(state.clone()), Params(query))
            .await
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Per page must be between 1 and 100");

        let mut query = actor_query(Some("tom"));
        query.page = Some("0".to_string());
        let response = search_actors_handler(State(state.clone()), Params(query))
            .await
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Page number must be greater than 0");

        assert_eq!(stub.call_count(), 0);

        // 上边界本身是合法的
        let mut query = actor_query(Some("tom"));
        query.per_page = Some("100".to_string());
        let response = search_actors_handler(State(state), Params(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_media_search_type_and_truncation() {
        let results: Vec<Value> = (1..=30).map(|id| json!({ "id": id })).collect();
        let stub = StubFetch::new(json!({ "page": 1, "results": results }));
        let state = state_with(stub);

        // 未知类型被拒绝
        let mut query = media_query(Some("matrix"));
        query.media_type = Some("book".to_string());
        let result = search_media_handler(State(state.clone()), Params(query)).await;
        match result {
            Err(ApiError::Validation(msg)) => {
                assert_eq!(msg, "Invalid media type: book (must be 'movie' or 'tv')")
            }
            _ => panic!("expected validation error"),
        }

        // tv 合法；结果截断到 per_page，缺失的 total_results 退回 0
        let mut query = media_query(Some("matrix"));
        query.media_type = Some("tv".to_string());
        query.per_page = Some("10".to_string());
        let response = search_media_handler(State(state), Params(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 10);
        assert_eq!(body["total_results"], 0);
        assert_eq!(body["per_page"], 10);
    }

    #[tokio::test]
    async fn test_filmography_local_pagination() {
        let cast: Vec<Value> = (1..=25).map(|id| json!({ "id": id })).collect();
        let crew: Vec<Value> = (101..=110).map(|id| json!({ "id": id })).collect();
        let stub = StubFetch::new(json!({ "cast": cast, "crew": crew }));
        let state = state_with(stub);

        let query = FilmographyQuery {
            page: Some("3".to_string()),
            per_page: Some("10".to_string()),
        };
        let response =
            actor_filmography_handler(State(state), Path("42".to_string()), Params(query))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        // 第三页：cast 剩 21..=25，crew 窗口越界为空页
        let cast_ids: Vec<u64> = body["cast"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(cast_ids, vec![21, 22, 23, 24, 25]);
        assert!(body["crew"].as_array().unwrap().is_empty());
        assert_eq!(body["total_results"], 35);
        assert_eq!(body["total_pages"], 4);
        assert_eq!(body["page"], 3);
    }

    #[tokio::test]
    async fn test_invalid_path_ids_rejected() {
        let stub = StubFetch::new(json!({ "cast": [], "crew": [] }));
        let state = state_with(stub.clone());

        let query = FilmographyQuery {
            page: None,
            per_page: None,
        };
        let response =
            actor_filmography_handler(State(state.clone()), Path("abc".to_string()), Params(query))
                .await
                .into_response();
        let body = body_json(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Invalid actor_id: must be a positive integer");

        let query = MediaCastQuery {
            media_type: None,
            page: None,
            per_page: None,
        };
        let response = media_cast_handler(State(state), Path("x".to_string()), Params(query))
            .await
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid media_id: must be a positive integer");

        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        let stub = StubFetch::new(json!({ "page": 1, "results": [], "total_results": 0 }));
        let state = state_with(stub.clone());

        for _ in 0..3 {
            let response =
                search_media_handler(State(state.clone()), Params(media_query(Some("dune"))))
                    .await
                    .into_response();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(stub.call_count(), 1);

        // 页码不同就是不同的缓存键
        let mut query = media_query(Some("dune"));
        query.page = Some("2".to_string());
        search_media_handler(State(state), Params(query))
            .await
            .into_response();
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn test_upstream_429_surfaces_with_message() {
        let state = state_with(Arc::new(FailFetch { status: 429 }));

        let response = search_actors_handler(State(state), Params(actor_query(Some("tom"))))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Rate limit exceeded");
        assert_eq!(body["code"], 429);
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let state = state_with(Arc::new(FailFetch { status: 503 }));

        let query = MediaCastQuery {
            media_type: Some("movie".to_string()),
            page: None,
            per_page: None,
        };
        let response = media_cast_handler(State(state), Path("550".to_string()), Params(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["message"], "TMDb API error: 503");
        assert_eq!(body["code"], 503);
    }
}

#[cfg(test)]
mod rate_limit_quota_tests {
    use std::time::Duration;
    use tmdb_gateway::api::rate_limit::{RateDecision, RateLimiter, API_ROUTE_LIMIT};

    #[test]
    fn test_api_route_quota_is_sixty_per_minute() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let key = "203.0.113.7:/api/v1/actors/search";

        for _ in 0..API_ROUTE_LIMIT {
            assert!(limiter.check(key, API_ROUTE_LIMIT).is_allowed());
        }

        match limiter.check(key, API_ROUTE_LIMIT) {
            RateDecision::Limited { retry_after } => {
                assert!(retry_after >= 1);
                assert!(retry_after <= 60);
            }
            RateDecision::Allowed => panic!("request over quota should be limited"),
        }
    }

    #[test]
    fn test_quota_tracked_per_route_and_client() {
        let limiter = RateLimiter::new(Duration::from_secs(60));

        for _ in 0..API_ROUTE_LIMIT {
            assert!(limiter
                .check("203.0.113.7:/api/v1/media/search", API_ROUTE_LIMIT)
                .is_allowed());
        }

        // 同一客户端的其他路由、其他客户端的同一路由都不受影响
        assert!(limiter
            .check("203.0.113.7:/api/v1/actors/search", API_ROUTE_LIMIT)
            .is_allowed());
        assert!(limiter
            .check("198.51.100.2:/api/v1/media/search", API_ROUTE_LIMIT)
            .is_allowed());
    }
}
