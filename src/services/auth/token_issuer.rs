/*
 * Responsibility
 * - access / refresh token の発行と token cache への保存
 * - logout 時の無効化 (revoke)
 */
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::AppError;
use crate::services::auth::{claims::TokenType, jwt::JwtCodec, session::SessionCache};
use crate::services::cache::CacheError;

/// token を発行し session cache に記録する
///
/// - access token は user の現在値を上書き
/// - refresh token は有効集合に追加
#[derive(Clone)]
pub struct TokenIssuer {
    jwt: Arc<JwtCodec>,
    sessions: Arc<dyn SessionCache>,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

/// Service-level return type to keep handlers thin.
#[derive(Clone, Debug)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

impl TokenIssuer {
    pub fn new(
        jwt: Arc<JwtCodec>,
        sessions: Arc<dyn SessionCache>,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            jwt,
            sessions,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Sign a new access token and make it the user's current one.
    pub async fn issue_access_token(&self, user_id: i64) -> Result<String, AppError> {
        let token = self
            .jwt
            .sign(user_id, TokenType::Access, self.access_ttl_seconds)
            .map_err(|e| {
                error!(user_id, error = %e, "failed to sign access token");
                AppError::Internal
            })?;

        self.sessions
            .set_access_token(user_id, &token, self.access_ttl_seconds)
            .await
            .map_err(|e| {
                error!(user_id, error = %e, "failed to store access token");
                AppError::Internal
            })?;

        debug!(
            user_id,
            ttl_seconds = self.access_ttl_seconds,
            "issued access token"
        );
        Ok(token)
    }

    /// Sign a new refresh token and add it to the user's valid set.
    pub async fn issue_refresh_token(&self, user_id: i64) -> Result<String, AppError> {
        let token = self
            .jwt
            .sign(user_id, TokenType::Refresh, self.refresh_ttl_seconds)
            .map_err(|e| {
                error!(user_id, error = %e, "failed to sign refresh token");
                AppError::Internal
            })?;

        self.sessions
            .add_refresh_token(user_id, &token, self.refresh_ttl_seconds)
            .await
            .map_err(|e| {
                error!(user_id, error = %e, "failed to store refresh token");
                AppError::Internal
            })?;

        debug!(
            user_id,
            ttl_seconds = self.refresh_ttl_seconds,
            "issued refresh token"
        );
        Ok(token)
    }

    pub async fn issue_token_pair(&self, user_id: i64) -> Result<IssuedTokenPair, AppError> {
        let access_token = self.issue_access_token(user_id).await?;
        let refresh_token = self.issue_refresh_token(user_id).await?;

        Ok(IssuedTokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_seconds,
        })
    }

    /// Logout: drop the current access token and the presented refresh token.
    pub async fn revoke(&self, user_id: i64, refresh_token: &str) -> Result<(), AppError> {
        let map_err = |e: CacheError| {
            error!(user_id, error = %e, "failed to revoke tokens");
            AppError::Internal
        };

        self.sessions
            .clear_access_token(user_id)
            .await
            .map_err(map_err)?;
        self.sessions
            .remove_refresh_token(user_id, refresh_token)
            .await
            .map_err(map_err)?;

        debug!(user_id, "revoked session tokens");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::{jwt::test_keys, session::CachedSessionStore};
    use crate::services::cache::memory::MemoryCache;

    fn issuer() -> (TokenIssuer, Arc<dyn SessionCache>) {
        let sessions: Arc<dyn SessionCache> =
            Arc::new(CachedSessionStore::new(MemoryCache::new()));
        let issuer = TokenIssuer::new(Arc::new(test_keys::codec()), sessions.clone(), 60, 600);
        (issuer, sessions)
    }

    #[tokio::test]
    async fn pair_is_recorded_in_cache() {
        let (issuer, sessions) = issuer();

        let pair = issuer.issue_token_pair(5).await.unwrap();

        assert_eq!(pair.expires_in, 60);
        assert_eq!(
            sessions.get_access_token(5).await.unwrap(),
            Some(pair.access_token.clone())
        );
        assert!(
            sessions
                .has_refresh_token(5, &pair.refresh_token)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn new_access_token_replaces_current() {
        let (issuer, sessions) = issuer();

        let first = issuer.issue_access_token(5).await.unwrap();
        let second = issuer.issue_access_token(5).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(sessions.get_access_token(5).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn revoke_drops_access_and_refresh() {
        let (issuer, sessions) = issuer();
        let pair = issuer.issue_token_pair(5).await.unwrap();

        issuer.revoke(5, &pair.refresh_token).await.unwrap();

        assert_eq!(sessions.get_access_token(5).await.unwrap(), None);
        assert!(
            !sessions
                .has_refresh_token(5, &pair.refresh_token)
                .await
                .unwrap()
        );
    }
}
