/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (認可に必要な role の参照のみ)
 */
use sqlx::PgPool;

use crate::repos::error::RepoResult;

/// Raw `users.role` code, `None` when the user does not exist.
pub async fn get_role(db: &PgPool, user_id: i64) -> RepoResult<Option<i16>> {
    let role = sqlx::query_scalar::<_, i16>(
        r#"
        SELECT role
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(role)
}
