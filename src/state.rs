/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use sqlx::PgPool;

use crate::middleware::auth::AccessGuard;
use crate::services::auth::TokenIssuer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenIssuer,
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(db: PgPool, tokens: TokenIssuer, guard: AccessGuard) -> Self {
        Self { db, tokens, guard }
    }
}
