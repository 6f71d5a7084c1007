//! upgrade request の `?token=` → AccessGuard::authorize_ws
//!
//! - 現在の access token との一致のみ確認する（refresh / policy なし）。
//! - 署名は正しいが現在値でない token は `AuthCtx` なしで次へ流す。
//!   caller が必要な handler は `AuthCtxExtractor` で reject される。
//! - `?token=` 自体が壊れている場合（重複など）は Unauthorized。

use axum::{
    Router,
    body::Body,
    extract::{Query, State, rejection::QueryRejection},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::middleware::auth::guard::{AccessGuard, AuthRejection, WsOutcome};

#[derive(Debug, Deserialize)]
struct WsQuery {
    token: Option<String>,
}

pub fn apply<S>(router: Router<S>, guard: AccessGuard) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(guard, ws_middleware))
}

async fn ws_middleware(
    State(guard): State<AccessGuard>,
    query: Result<Query<WsQuery>, QueryRejection>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 例: ?token=a&token=b
    let Ok(Query(query)) = query else {
        warn!("ws token query is malformed");
        return AppError::from(AuthRejection::Malformed).into_response();
    };

    match guard.authorize_ws(query.token.as_deref()).await {
        WsOutcome::Admit(auth_ctx) => {
            req.extensions_mut().insert(auth_ctx);
            next.run(req).await
        }
        WsOutcome::Reject(rejection) => AppError::from(rejection).into_response(),
        WsOutcome::Unverified => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1::extractors::AuthCtx;
    use crate::middleware::auth::guard::test_support::*;
    use axum::{body::to_bytes, routing::get};
    use tower::ServiceExt;

    // Reports whether the middleware attached an identity.
    async fn whoami(req: Request<Body>) -> String {
        match req.extensions().get::<AuthCtx>() {
            Some(ctx) => format!("user {}", ctx.user_id),
            None => "anonymous".to_string(),
        }
    }

    async fn call(fx: &Fixture, uri: &str) -> String {
        let app = apply(Router::new().route("/ws", get(whoami)), fx.guard.clone());
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn current_token_attaches_identity() {
        let fx = fixture();
        let token = fx.issuer.issue_access_token(USER).await.unwrap();

        assert_eq!(
            call(&fx, &format!("/ws?token={token}")).await,
            format!("user {USER}")
        );
    }

    #[tokio::test]
    async fn stale_token_is_forwarded_without_identity() {
        let fx = fixture();
        let old = fx.issuer.issue_access_token(USER).await.unwrap();
        fx.issuer.issue_access_token(USER).await.unwrap();

        assert_eq!(call(&fx, &format!("/ws?token={old}")).await, "anonymous");
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let fx = fixture();
        let body = call(&fx, "/ws").await;
        assert!(body.contains("3030"), "{body}");
    }

    #[tokio::test]
    async fn repeated_token_param_is_unauthorized() {
        let fx = fixture();
        let token = fx.issuer.issue_access_token(USER).await.unwrap();

        let body = call(&fx, &format!("/ws?token={token}&token={token}")).await;
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, serde_json::json!({"code": 3030, "msg": "unauthorized"}));
    }
}
