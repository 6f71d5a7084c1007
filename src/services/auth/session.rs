/*
 * Responsibility
 * - token cache: user ごとの現在の access token と有効な refresh token 集合
 * - refresh token は sha256 した key で個別に TTL を持たせる
 */
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::services::cache::{CacheClient, CacheError, client::ttl_seconds};

/// 認可フローが読み, issuer が書く session 状態
///
/// 現在の access token は user ごとに 1 つ。`set_access_token` は上書きなので
/// 以前の token はそれだけで無効になる。
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get_access_token(&self, user_id: i64) -> Result<Option<String>, CacheError>;

    async fn set_access_token(
        &self,
        user_id: i64,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError>;

    async fn clear_access_token(&self, user_id: i64) -> Result<(), CacheError>;

    async fn add_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError>;

    async fn has_refresh_token(&self, user_id: i64, token: &str) -> Result<bool, CacheError>;

    async fn remove_refresh_token(&self, user_id: i64, token: &str) -> Result<(), CacheError>;
}

/// `SessionCache` over any `CacheClient`.
///
/// Keys:
/// - `{prefix}:access:{user_id}` -> access token
/// - `{prefix}:refresh:{user_id}:{sha256(token)}` -> "1"
///
/// refresh token ごとに key を分け, それぞれの TTL で失効させる。
#[derive(Clone, Debug)]
pub struct CachedSessionStore<C: CacheClient> {
    cache: C,
    prefix: String,
}

impl<C: CacheClient> CachedSessionStore<C> {
    pub fn new(cache: C) -> Self {
        Self::new_with_prefix(cache, "leaf")
    }

    pub fn new_with_prefix(cache: C, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    fn access_key(&self, user_id: i64) -> String {
        format!("{}:access:{}", self.prefix, user_id)
    }

    fn refresh_key(&self, user_id: i64, token: &str) -> String {
        format!("{}:refresh:{}:{}", self.prefix, user_id, hash_token(token))
    }
}

#[async_trait]
impl<C: CacheClient> SessionCache for CachedSessionStore<C> {
    async fn get_access_token(&self, user_id: i64) -> Result<Option<String>, CacheError> {
        self.cache.get_string(&self.access_key(user_id)).await
    }

    async fn set_access_token(
        &self,
        user_id: i64,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        self.cache
            .set_with_ttl(&self.access_key(user_id), token, ttl_seconds(ttl_secs))
            .await
    }

    async fn clear_access_token(&self, user_id: i64) -> Result<(), CacheError> {
        self.cache.del(&self.access_key(user_id)).await?;
        Ok(())
    }

    async fn add_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        self.cache
            .set_with_ttl(&self.refresh_key(user_id, token), "1", ttl_seconds(ttl_secs))
            .await
    }

    async fn has_refresh_token(&self, user_id: i64, token: &str) -> Result<bool, CacheError> {
        self.cache.exists(&self.refresh_key(user_id, token)).await
    }

    async fn remove_refresh_token(&self, user_id: i64, token: &str) -> Result<(), CacheError> {
        self.cache.del(&self.refresh_key(user_id, token)).await?;
        Ok(())
    }
}

// sha256(token) as lowercase hex; raw tokens never appear in cache keys.
fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
