use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::error::ApiResult;
use super::{AppState, Params};
use crate::models::{ActorFilters, PageRequest, StringValidator, ValidationError};

#[derive(Debug, Deserialize)]
pub struct ActorSearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub min_popularity: Option<String>,
    pub gender: Option<String>,
    pub birth_year_from: Option<String>,
    pub birth_year_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilmographyQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// GET /api/v1/actors/search - 搜索演员
pub async fn search_actors_handler(
    State(state): State<AppState>,
    Params(params): Params<ActorSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let query = StringValidator::validate_query(params.query.as_deref())?;
    let paging = PageRequest::parse(params.page.as_deref(), params.per_page.as_deref())?;
    let filters = ActorFilters::parse(
        params.min_popularity.as_deref(),
        params.gender.as_deref(),
        params.birth_year_from.as_deref(),
        params.birth_year_to.as_deref(),
    )?;

    tracing::info!("Searching actors: query={}, page={}", query, paging.page);

    let results = state.tmdb.search_actors(&query, &filters, &paging).await?;
    Ok(Json(results))
}

/// GET /api/v1/actors/:actor_id/filmography - 获取演员作品（本地分页）
pub async fn actor_filmography_handler(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
    Params(params): Params<FilmographyQuery>,
) -> ApiResult<impl IntoResponse> {
    let actor_id = parse_actor_id(&actor_id)?;
    let paging = PageRequest::parse(params.page.as_deref(), params.per_page.as_deref())?;

    tracing::info!(
        "Fetching filmography: actor_id={}, page={}",
        actor_id,
        paging.page
    );

    let credits = state.tmdb.get_actor_filmography(actor_id, &paging).await?;
    Ok(Json(credits))
}

fn parse_actor_id(raw: &str) -> Result<u64, ValidationError> {
    // u64 解析接受前导 '+'，路径 id 只认纯数字
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidResourceId("actor_id"));
    }
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ValidationError::InvalidResourceId("actor_id"))
}
