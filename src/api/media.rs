use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::error::ApiResult;
use super::{AppState, Params};
use crate::models::{MediaFilters, MediaType, PageRequest, StringValidator, ValidationError};

#[derive(Debug, Deserialize)]
pub struct MediaSearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub year: Option<String>,
    pub genre_id: Option<String>,
    pub min_rating: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaCastQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// GET /api/v1/media/search - 搜索电影或剧集
pub async fn search_media_handler(
    State(state): State<AppState>,
    Params(params): Params<MediaSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let query = StringValidator::validate_query(params.query.as_deref())?;
    let media_type = MediaType::parse(params.media_type.as_deref())?;
    let paging = PageRequest::parse(params.page.as_deref(), params.per_page.as_deref())?;
    let filters = MediaFilters::parse(
        params.year.as_deref(),
        params.genre_id.as_deref(),
        params.min_rating.as_deref(),
        params.language.as_deref(),
    )?;

    tracing::info!(
        "Searching media: query={}, type={}, page={}",
        query,
        media_type,
        paging.page
    );

    let results = state
        .tmdb
        .search_media(&query, media_type, &filters, &paging)
        .await?;
    Ok(Json(results))
}

/// GET /api/v1/media/:media_id/cast - 获取影片演职员（本地分页）
pub async fn media_cast_handler(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Params(params): Params<MediaCastQuery>,
) -> ApiResult<impl IntoResponse> {
    let media_id = parse_media_id(&media_id)?;
    let media_type = MediaType::parse(params.media_type.as_deref())?;
    let paging = PageRequest::parse(params.page.as_deref(), params.per_page.as_deref())?;

    tracing::info!(
        "Fetching cast: media_id={}, type={}, page={}",
        media_id,
        media_type,
        paging.page
    );

    let credits = state
        .tmdb
        .get_media_cast(media_id, media_type, &paging)
        .await?;
    Ok(Json(credits))
}

fn parse_media_id(raw: &str) -> Result<u64, ValidationError> {
    // u64 解析接受前导 '+'，路径 id 只认纯数字
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidResourceId("media_id"));
    }
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ValidationError::InvalidResourceId("media_id"))
}
