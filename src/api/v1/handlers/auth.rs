/*
 * Responsibility
 * - POST /auth/logout: 現在の access token と提示された refresh token を無効化
 * - POST /auth/token: 開発環境のみ. user_id に対して token pair を発行
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};

use crate::{
    api::{
        resp,
        v1::{
            dto::auth::{DevTokenRequest, LogoutRequest, TokenResponse},
            extractors::AuthCtxExtractor,
        },
    },
    error::AppError,
    state::AppState,
};

pub async fn logout(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    req: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid_request)?;

    state.tokens.revoke(auth.user_id, &req.refresh_token).await?;

    Ok(resp::reply::<()>(resp::ResultCode::SUCCESS, "ok", None))
}

pub async fn dev_token(
    State(state): State<AppState>,
    req: Result<Json<DevTokenRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = req?;
    let pair = state.tokens.issue_token_pair(req.user_id).await?;

    Ok(resp::ok(
        "ok",
        TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        },
    ))
}
