/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (envelope `{ code, msg }` へ変換)
 * - RepoError / CacheError などを統一的に変換
 * - Json / Path / Query の extractor rejection も envelope (4010) に揃える
 */
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::resp::{self, ResultCode};
use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    // Access token is authentic but no longer current; the client should refresh.
    #[error("token expired")]
    TokenExpired,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn result_code(&self) -> ResultCode {
        match self {
            AppError::InvalidRequest(_) => ResultCode::REQUEST_PARAM,
            AppError::Unauthorized => ResultCode::UNAUTHORIZED,
            AppError::TokenExpired => ResultCode::TOKEN_EXPIRED,
            AppError::Internal => ResultCode::ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let msg = match &self {
            AppError::InvalidRequest(message) => message.as_str(),
            _ => "",
        };

        resp::reply::<()>(self.result_code(), msg, None)
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "request rejected by extractor");
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "request rejected by extractor");
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "request rejected by extractor");
        AppError::InvalidRequest(rejection.body_text())
    }
}
