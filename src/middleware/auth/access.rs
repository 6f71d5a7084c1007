//! `Authorization` header → AccessGuard → Admit / Reject / refresh 済み token の返却
//!
//! - `route_layer` で掛けるので, policy が見る route は `MatchedPath`（登録パターン,
//!   例: `/api/v1/announce/{id}`）になる。
//! - refresh token の場合は handler を呼ばずに `{ "token": ... }` を返す。

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::resp;
use crate::error::AppError;
use crate::middleware::auth::guard::{AccessGuard, AuthOutcome};

/// Guard every route registered on `router` so far.
///
/// ```ignore
/// let protected = middleware::auth::access::apply(protected_routes(), guard.clone());
/// ```
pub fn apply<S>(router: Router<S>, guard: AccessGuard) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<AccessGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    // Owned copies: the request body is not `Sync`, so `req` must not be borrowed across `.await`.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let method = req.method().clone();

    let outcome = guard
        .authorize(token.as_deref(), &route, method.as_str())
        .await;

    match outcome {
        AuthOutcome::Admit(auth_ctx) => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(auth_ctx);
            next.run(req).await
        }
        AuthOutcome::Reject(rejection) => AppError::from(rejection).into_response(),
        AuthOutcome::RespondDirectly(refreshed) => resp::ok("ok", refreshed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::middleware::auth::guard::test_support::*;
    use axum::{
        body::to_bytes,
        http::StatusCode,
        routing::{delete, get},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        format!("user {}", ctx.user_id)
    }

    async fn removed() -> &'static str {
        "removed"
    }

    fn app(fx: &Fixture) -> Router {
        let protected = Router::new()
            .route("/user/me", get(whoami))
            .route("/announce/{id}", delete(removed));
        let protected = apply(protected, fx.guard.clone());

        Router::new().nest("/api/v1", protected)
    }

    fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(res: Response) -> Value {
        serde_json::from_str(&body_text(res).await).unwrap()
    }

    #[tokio::test]
    async fn admitted_request_reaches_handler_with_identity() {
        let fx = fixture();
        let token = fx.issuer.issue_access_token(USER).await.unwrap();

        let res = app(&fx)
            .oneshot(request("GET", "/api/v1/user/me", Some(&token)))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, format!("user {USER}"));
    }

    #[tokio::test]
    async fn policy_sees_route_pattern_not_concrete_path() {
        let fx = fixture();
        let token = fx.issuer.issue_access_token(ADMIN).await.unwrap();

        let res = app(&fx)
            .oneshot(request("DELETE", "/api/v1/announce/17", Some(&token)))
            .await
            .unwrap();

        assert_eq!(body_text(res).await, "removed");
    }

    #[tokio::test]
    async fn stale_token_gets_token_expired_envelope() {
        let fx = fixture();
        let old = fx.issuer.issue_access_token(USER).await.unwrap();
        fx.issuer.issue_access_token(USER).await.unwrap();

        let res = app(&fx)
            .oneshot(request("GET", "/api/v1/user/me", Some(&old)))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body_json(res).await,
            json!({"code": 3000, "msg": "token expired"})
        );
    }

    #[tokio::test]
    async fn denied_role_gets_unauthorized_envelope() {
        let fx = fixture();
        let token = fx.issuer.issue_access_token(USER).await.unwrap();

        let res = app(&fx)
            .oneshot(request("DELETE", "/api/v1/announce/17", Some(&token)))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["code"], 3030);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let fx = fixture();

        let res = app(&fx)
            .oneshot(request("GET", "/api/v1/user/me", None))
            .await
            .unwrap();

        assert_eq!(body_json(res).await["code"], 3030);
    }

    #[tokio::test]
    async fn refresh_token_short_circuits_with_new_token() {
        let fx = fixture();
        let pair = fx.issuer.issue_token_pair(USER).await.unwrap();

        let res = app(&fx)
            .oneshot(request("GET", "/api/v1/user/me", Some(&pair.refresh_token)))
            .await
            .unwrap();

        let body = body_json(res).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["msg"], "ok");
        let token = body["data"]["token"].as_str().unwrap().to_string();
        assert_eq!(
            fx.sessions.get_access_token(USER).await.unwrap(),
            Some(token)
        );
    }
}
