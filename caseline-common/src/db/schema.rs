//! Table schemas for the Caseline database
//!
//! Each `create_*_table` statement is idempotent; `create_tables` is the
//! single entry point run at startup (and by tests against in-memory
//! pools).

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create all Caseline tables if they don't exist
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_cases_table(pool).await?;
    create_events_table(pool).await?;
    info!("Database tables initialized (users, cases, events)");
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            full_name TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_cases_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cases (
            case_id TEXT PRIMARY KEY,
            case_number INTEGER UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'open',
            created_by TEXT NOT NULL REFERENCES users(user_id),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Timeline events. `sort_order` fixes the display order of events within
/// a case; the import pipeline appends with strictly increasing values.
async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            case_id TEXT NOT NULL REFERENCES cases(case_id) ON DELETE CASCADE,
            event_type TEXT NOT NULL DEFAULT 'note',
            event_date TEXT NOT NULL,
            event_time TEXT,
            file_name TEXT,
            file_count INTEGER,
            file_description TEXT,
            file_type TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_by TEXT NOT NULL REFERENCES users(user_id),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_events_case_id ON events(case_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_events_event_date ON events(event_date)")
        .execute(pool)
        .await?;

    Ok(())
}
