/*
 * Responsibility
 * - /announce 系 handler (一覧は公開, 作成/削除は AccessGuard + policy 経由)
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::Response,
};
use tracing::info;

use crate::{
    api::{
        resp,
        v1::{
            dto::announce::{AnnounceResponse, CreateAnnounceRequest, ListAnnounceQuery},
            extractors::AuthCtxExtractor,
        },
    },
    error::AppError,
    repos::announce_repo,
    state::AppState,
};

pub async fn list_announces(
    State(state): State<AppState>,
    query: Result<Query<ListAnnounceQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let (page, page_size) = query.paging().map_err(AppError::invalid_request)?;

    let rows = announce_repo::list(&state.db, page, page_size).await?;
    let res: Vec<AnnounceResponse> = rows.into_iter().map(AnnounceResponse::from).collect();

    Ok(resp::ok("ok", res))
}

pub async fn create_announce(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    req: Result<Json<CreateAnnounceRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid_request)?;

    let row =
        announce_repo::create(&state.db, &req.title, &req.content, req.url.as_deref()).await?;
    info!(user_id = auth.user_id, announce_id = row.id, "announce created");

    Ok(resp::ok("ok", AnnounceResponse::from(row)))
}

pub async fn delete_announce(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id?;
    let deleted = announce_repo::delete(&state.db, id).await?;
    info!(user_id = auth.user_id, announce_id = id, deleted, "announce delete");

    Ok(resp::reply::<()>(resp::ResultCode::SUCCESS, "ok", None))
}
