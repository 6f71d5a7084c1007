use axum::response::Response;

use crate::api::{
    resp,
    v1::{dto::auth::MeResponse, extractors::AuthCtxExtractor},
};

/// GET /user/me: the identity the access middleware attached.
pub async fn me(AuthCtxExtractor(auth): AuthCtxExtractor) -> Response {
    resp::ok(
        "ok",
        MeResponse {
            user_id: auth.user_id,
        },
    )
}
