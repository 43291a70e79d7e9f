// 允许未使用的代码（预留功能）
#![allow(dead_code)]
#![allow(unused_imports)]

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber;

mod api;
mod external;
mod models;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize TMDb service
    let tmdb = external::TmdbService::from_env();
    if !tmdb.is_available() {
        tracing::warn!("TMDB_API_KEY is not set, upstream requests will fail");
    }

    // Initialize rate limiter
    let limiter = api::rate_limit::RateLimiter::default();

    // Start cache cleanup task
    let cache_cleanup_task = external::cache::CacheCleanupTask::new(
        tmdb.cache.clone(),
        Duration::from_secs(5 * 60), // 每5分钟清理一次
    );
    tokio::spawn(cache_cleanup_task.start());

    // Start rate limiter prune task
    let limiter_for_prune = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter_for_prune.prune_idle();
        }
    });

    let state = api::AppState { tmdb, limiter };

    // Build our application with routes
    let app = Router::new()
        // Health
        .route("/health", get(api::health::health_check))
        // Actor search and credits
        .route(
            "/api/v1/actors/search",
            get(api::actors::search_actors_handler),
        )
        .route(
            "/api/v1/actors/:actor_id/filmography",
            get(api::actors::actor_filmography_handler),
        )
        // Media search and credits
        .route(
            "/api/v1/media/search",
            get(api::media::search_media_handler),
        )
        .route(
            "/api/v1/media/:media_id/cast",
            get(api::media::media_cast_handler),
        )
        .fallback(api::error::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit::enforce,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Run the server - 从环境变量读取配置
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("🚀 TMDb gateway listening on {}", addr);
    tracing::info!("📊 Cache cleanup task started (interval: 5 minutes)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
