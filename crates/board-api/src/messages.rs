use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use board_types::api::{
    AddCommentRequest, CreateMessageRequest, LikeQuery, LimitQuery, SearchQuery,
    UpdateMessageRequest,
};

use crate::error::{ServiceError, ServiceResult};
use crate::routes::AppState;

/// Run a blocking store-backed operation off the async runtime.
async fn run_blocking<F, T>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ServiceError::Internal(e.to_string())
    })?
}

fn malformed(rejection: impl std::fmt::Display) -> ServiceError {
    ServiceError::invalid(format!("malformed request: {}", rejection))
}

pub async fn list_messages(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Query(query) = query.map_err(malformed)?;
    let service = state.service.clone();
    let messages = run_blocking(move || service.list(query.limit)).await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<impl IntoResponse> {
    let service = state.service.clone();
    let message = run_blocking(move || service.get(&id)).await?;
    Ok(Json(message))
}

pub async fn create_message(
    State(state): State<AppState>,
    req: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Json(req) = req.map_err(malformed)?;
    let service = state.service.clone();
    let created = run_blocking(move || service.create(req)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Json(req) = req.map_err(malformed)?;
    let service = state.service.clone();
    let status = run_blocking(move || service.update(&id, req)).await?;
    Ok(Json(status))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<impl IntoResponse> {
    let service = state.service.clone();
    let status = run_blocking(move || service.delete(&id)).await?;
    Ok(Json(status))
}

pub async fn like_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<LikeQuery>, QueryRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Query(query) = query.map_err(malformed)?;
    let service = state.service.clone();
    let status = run_blocking(move || service.like(&id, query.user_id)).await?;
    Ok(Json(status))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Json(req) = req.map_err(malformed)?;
    let service = state.service.clone();
    let status = run_blocking(move || service.comment(&id, req)).await?;
    Ok(Json(status))
}

pub async fn search_messages(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Query(query) = query.map_err(malformed)?;
    let service = state.service.clone();
    let messages =
        run_blocking(move || service.search(query.term.as_deref(), query.limit)).await?;
    Ok(Json(messages))
}

pub async fn messages_by_hashtag(
    State(state): State<AppState>,
    Path(hashtag): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ServiceResult<impl IntoResponse> {
    let Query(query) = query.map_err(malformed)?;
    let service = state.service.clone();
    let messages = run_blocking(move || service.by_hashtag(&hashtag, query.limit)).await?;
    Ok(Json(messages))
}
