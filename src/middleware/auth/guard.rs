/*
 * Responsibility
 * - Bearer token の認可判定 (axum の配線とは独立)
 * - access token: cache 上の現在値と一致 → policy (role, route, method) → Admit / Reject
 * - refresh token: 有効集合に含まれていれば新しい access token を発行して直接返す
 * - ws: 現在値との一致のみ確認 (refresh / policy なし)
 * - cache / DB 障害は fail-closed (Unavailable)
 */
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{
    AuthorizationPolicy, Claims, JwtCodec, SessionCache, TokenError, TokenIssuer, TokenType,
    UserDirectory,
};

/// request を拒否した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    // 欠落 / 署名不正 / 別鍵 / 未知の token_type
    Malformed,
    // 正当だが現在値ではない access token (client は refresh する)
    Expired,
    // 有効集合にない refresh token, policy 拒否, 未知の user
    Unauthorized,
    // cache / DB 障害 (fail-closed)
    Unavailable,
}

impl From<AuthRejection> for AppError {
    fn from(r: AuthRejection) -> Self {
        match r {
            AuthRejection::Malformed | AuthRejection::Unauthorized => AppError::Unauthorized,
            AuthRejection::Expired => AppError::TokenExpired,
            AuthRejection::Unavailable => AppError::Internal,
        }
    }
}

/// Body returned in place of the requested route after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshedToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Admit(AuthCtx),
    Reject(AuthRejection),
    RespondDirectly(RefreshedToken),
}

/// upgrade 接続の判定結果
///
/// `Unverified`: 署名は正しいが現在の access token ではない。
/// identity 付きで通すことも拒否することもせず, `AuthCtx` なしで次へ流す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsOutcome {
    Admit(AuthCtx),
    Reject(AuthRejection),
    Unverified,
}

/// 認可に必要な依存 (起動時に一度だけ注入)
#[derive(Clone)]
pub struct AccessGuard {
    jwt: Arc<JwtCodec>,
    sessions: Arc<dyn SessionCache>,
    users: Arc<dyn UserDirectory>,
    policy: Arc<dyn AuthorizationPolicy>,
    issuer: TokenIssuer,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("jwt", &self.jwt)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AccessGuard {
    pub fn new(
        jwt: Arc<JwtCodec>,
        sessions: Arc<dyn SessionCache>,
        users: Arc<dyn UserDirectory>,
        policy: Arc<dyn AuthorizationPolicy>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            jwt,
            sessions,
            users,
            policy,
            issuer,
        }
    }

    /// Decide what to do with a request carrying `raw_token` for
    /// `route` (the router's matched pattern) and `method`.
    pub async fn authorize(
        &self,
        raw_token: Option<&str>,
        route: &str,
        method: &str,
    ) -> AuthOutcome {
        let Some(token) = raw_token.map(strip_bearer).filter(|t| !t.is_empty()) else {
            warn!(route, method, "missing bearer token");
            return AuthOutcome::Reject(AuthRejection::Malformed);
        };

        let claims = match self.verify(token) {
            Ok(claims) => claims,
            Err(rejection) => return AuthOutcome::Reject(rejection),
        };

        match claims.token_type {
            TokenType::Access => self.admit_access(claims.user_id, token, route, method).await,
            TokenType::Refresh => self.refresh(claims.user_id, token).await,
        }
    }

    /// Narrower check for upgrade-style connections: identity only, no
    /// refresh path and no policy lookup.
    pub async fn authorize_ws(&self, raw_token: Option<&str>) -> WsOutcome {
        let Some(token) = raw_token.filter(|t| !t.is_empty()) else {
            warn!("missing ws token");
            return WsOutcome::Reject(AuthRejection::Malformed);
        };

        let claims = match self.verify(token) {
            Ok(claims) => claims,
            Err(rejection) => return WsOutcome::Reject(rejection),
        };

        match self.sessions.get_access_token(claims.user_id).await {
            Ok(Some(current)) if current == token => {
                WsOutcome::Admit(AuthCtx::new(claims.user_id))
            }
            Ok(_) => {
                // TODO: decide whether a stale ws token should be rejected with TokenExpired.
                warn!(
                    user_id = claims.user_id,
                    "ws token is not the current access token; forwarding without identity"
                );
                WsOutcome::Unverified
            }
            Err(e) => {
                error!(user_id = claims.user_id, error = %e, "token cache lookup failed");
                WsOutcome::Reject(AuthRejection::Unavailable)
            }
        }
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthRejection> {
        match self.jwt.verify(token) {
            Ok(claims) => Ok(claims),
            Err(TokenError::Expired(claims)) if claims.token_type == TokenType::Access => {
                warn!(user_id = claims.user_id, "access token past exp");
                Err(AuthRejection::Expired)
            }
            Err(TokenError::Expired(claims)) => {
                warn!(user_id = claims.user_id, "refresh token past exp");
                Err(AuthRejection::Unauthorized)
            }
            Err(err) => {
                warn!(error = %err, "token verification failed");
                Err(AuthRejection::Malformed)
            }
        }
    }

    async fn admit_access(
        &self,
        user_id: i64,
        token: &str,
        route: &str,
        method: &str,
    ) -> AuthOutcome {
        let current = match self.sessions.get_access_token(user_id).await {
            Ok(current) => current,
            Err(e) => {
                error!(user_id, error = %e, "token cache lookup failed");
                return AuthOutcome::Reject(AuthRejection::Unavailable);
            }
        };

        if current.as_deref() != Some(token) {
            warn!(user_id, "access token is not current");
            return AuthOutcome::Reject(AuthRejection::Expired);
        }

        let role = match self.users.role_of(user_id).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                warn!(user_id, "no role for user");
                return AuthOutcome::Reject(AuthRejection::Unauthorized);
            }
            Err(e) => {
                error!(user_id, error = %e, "role lookup failed");
                return AuthOutcome::Reject(AuthRejection::Unavailable);
            }
        };

        if !self.policy.check(role.as_str(), route, method) {
            warn!(user_id, role = role.as_str(), route, method, "permission denied");
            return AuthOutcome::Reject(AuthRejection::Unauthorized);
        }

        AuthOutcome::Admit(AuthCtx::new(user_id))
    }

    async fn refresh(&self, user_id: i64, token: &str) -> AuthOutcome {
        match self.sessions.has_refresh_token(user_id, token).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id, "refresh token not in valid set");
                return AuthOutcome::Reject(AuthRejection::Unauthorized);
            }
            Err(e) => {
                error!(user_id, error = %e, "token cache lookup failed");
                return AuthOutcome::Reject(AuthRejection::Unavailable);
            }
        }

        match self.issuer.issue_access_token(user_id).await {
            Ok(token) => {
                debug!(user_id, "access token refreshed");
                AuthOutcome::RespondDirectly(RefreshedToken { token })
            }
            Err(_) => AuthOutcome::Reject(AuthRejection::Unavailable),
        }
    }
}

// `Authorization` may carry the bare token or `Bearer <token>`.
fn strip_bearer(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}
