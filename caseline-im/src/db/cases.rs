//! Case lookups

use sqlx::SqlitePool;
use uuid::Uuid;

use caseline_common::Result;

/// True if a case row exists for this id
pub async fn case_exists(pool: &SqlitePool, case_id: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases WHERE case_id = ?")
        .bind(case_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}
