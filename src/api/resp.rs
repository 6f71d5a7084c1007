/*
 * Responsibility
 * - レスポンス共通形 `{ code, msg, data? }`
 * - (http status, code, msg) の固定テーブル
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCode {
    pub status: StatusCode,
    pub code: i32,
    pub msg: &'static str,
}

const fn rc(status: StatusCode, code: i32, msg: &'static str) -> ResultCode {
    ResultCode { status, code, msg }
}

impl ResultCode {
    pub const SUCCESS: Self = rc(StatusCode::OK, 200, "OK");
    pub const ERROR: Self = rc(StatusCode::INTERNAL_SERVER_ERROR, 500, "internal server error");

    // 30xx: authentication / authorization
    pub const TOKEN_EXPIRED: Self = rc(StatusCode::OK, 3000, "token expired");
    pub const UNAUTHORIZED: Self = rc(StatusCode::OK, 3030, "unauthorized");

    // 40xx: request
    pub const REQUEST_PARAM: Self = rc(StatusCode::OK, 4010, "invalid request parameters");
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Write `rc` as an envelope. An empty `msg` falls back to the table message.
pub fn reply<T: Serialize>(rc: ResultCode, msg: &str, data: Option<T>) -> Response {
    let msg = if msg.is_empty() { rc.msg } else { msg };

    let body = Envelope {
        code: rc.code,
        msg: msg.to_string(),
        data,
    };

    (rc.status, Json(body)).into_response()
}

pub fn ok<T: Serialize>(msg: &str, data: T) -> Response {
    reply(ResultCode::SUCCESS, msg, Some(data))
}
