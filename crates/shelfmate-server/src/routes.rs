use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use shelfmate_core::{
    Book, BookCategory, BookSummary, InterestPool, PoolMaintainer, PoolStore, Recommender,
    parse_id,
};
use tokio::task::spawn_blocking;
use uuid::Uuid;

use super::{error::AppError, state::AppState};

/// Header carrying the caller's identity, set by the auth proxy in front of
/// this service.
pub const USER_ID_HEADER: &str = "x-user-id";

type SharedState = State<Arc<AppState>>;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRequest {
    pub book_id: String,
}

fn user_id(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    parse_id(raw).map_err(|_| AppError::Unauthorized)
}

pub async fn recommendations_handler(
    State(state): SharedState,
    headers: HeaderMap,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<Vec<BookSummary>>, AppError> {
    let user = user_id(&headers)?;
    let category = params
        .category
        .as_deref()
        .map(str::parse::<BookCategory>)
        .transpose()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let batch = spawn_blocking(move || {
        Recommender::new(&state.db, &state.db, &state.settings).recommend(&user, category)
    })
    .await??;

    Ok(Json(batch))
}

pub async fn engagements_handler(
    State(state): SharedState,
    headers: HeaderMap,
    Json(payload): Json<EngagementRequest>,
) -> Result<StatusCode, AppError> {
    let user = user_id(&headers)?;
    let book = parse_id(&payload.book_id)?;

    spawn_blocking(move || {
        PoolMaintainer::new(&state.db, &state.db, &state.settings).record_engagement(&user, &book)
    })
    .await??;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn book_handler(
    State(state): SharedState,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    user_id(&headers)?;
    let id = parse_id(&id)?;

    spawn_blocking(move || state.db.get_book(&id))
        .await??
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))
}

pub async fn pool_handler(
    State(state): SharedState,
    headers: HeaderMap,
) -> Result<Json<InterestPool>, AppError> {
    let user = user_id(&headers)?;

    spawn_blocking(move || state.db.load_pool(&user))
        .await??
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("interest pool for {user}")))
}
