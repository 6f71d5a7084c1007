/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開 / AccessGuard (Authorization header) / ws guard (?token=) の範囲をここで決める
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::config::AppEnv;
use crate::middleware::auth::{access, ws as ws_auth};
use crate::state::AppState;

use crate::api::v1::handlers::{
    announce::{create_announce, delete_announce, list_announces},
    auth::{dev_token, logout},
    user::me,
    ws::ws,
};

pub fn routes(state: &AppState, app_env: AppEnv) -> Router<AppState> {
    let public = Router::new().route("/announce/list", get(list_announces));

    let guarded = Router::new()
        .route("/announce", post(create_announce))
        .route("/announce/{id}", delete(delete_announce))
        .route("/user/me", get(me))
        .route("/auth/logout", post(logout));
    let guarded = access::apply(guarded, state.guard.clone());

    let upgrade = ws_auth::apply(Router::new().route("/ws", get(ws)), state.guard.clone());

    let mut router = public.merge(guarded).merge(upgrade);

    if !app_env.is_production() {
        router = router.route("/auth/token", post(dev_token));
    }

    router
}
