/*
 * Responsibility
 * - 認証済み user の role 解決 (users.role)
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{error::RepoError, user_repo};
use crate::services::auth::role::Role;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when the user does not exist or carries an unknown role code.
    async fn role_of(&self, user_id: i64) -> Result<Option<Role>, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn role_of(&self, user_id: i64) -> Result<Option<Role>, RepoError> {
        let code = user_repo::get_role(&self.db, user_id).await?;
        Ok(code.and_then(Role::from_code))
    }
}
