//! Event persistence
//!
//! Bulk insert is all-or-nothing: the max sort_order read and every
//! insert share one transaction, so a batch either lands whole with
//! strictly increasing sort_order values or not at all.

use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use caseline_common::Result;

use crate::models::{EventType, TransformedFields};

/// One event ready for insertion, with parsed temporal fields
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub event_type: EventType,
    pub file_name: Option<String>,
    pub file_count: Option<i64>,
    pub file_description: Option<String>,
    pub file_type: Option<String>,
}

impl EventDraft {
    /// Re-parse validated row data into typed form.
    ///
    /// Validation already guaranteed these strings parse; a failure
    /// here means the session data was tampered with or corrupted.
    pub fn from_fields(fields: &TransformedFields) -> std::result::Result<Self, String> {
        let date_str = fields
            .event_date
            .as_deref()
            .ok_or_else(|| "missing event date".to_string())?;
        let event_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| format!("invalid event date '{}'", date_str))?;

        let event_time = match fields.event_time.as_deref() {
            Some(s) => Some(
                NaiveTime::parse_from_str(s, "%H:%M:%S")
                    .map_err(|_| format!("invalid event time '{}'", s))?,
            ),
            None => None,
        };

        Ok(Self {
            event_date,
            event_time,
            event_type: fields.event_type.unwrap_or_default(),
            file_name: fields.file_name.clone(),
            file_count: fields.file_count,
            file_description: fields.file_description.clone(),
            file_type: fields.file_type.clone(),
        })
    }
}

/// Insert a batch of events for one case.
///
/// sort_order continues from the current maximum for the case, -1 when
/// the case has no events yet, and increases by one per inserted row in
/// batch order. Returns the number of rows inserted.
pub async fn bulk_insert(
    pool: &SqlitePool,
    case_id: Uuid,
    created_by: Uuid,
    drafts: &[EventDraft],
) -> Result<usize> {
    let case_id = case_id.to_string();
    let created_by = created_by.to_string();
    let now = Utc::now().to_rfc3339();

    let mut tx = pool.begin().await?;

    let row = sqlx::query("SELECT COALESCE(MAX(sort_order), -1) AS max_order FROM events WHERE case_id = ?")
        .bind(&case_id)
        .fetch_one(&mut *tx)
        .await?;
    let mut sort_order: i64 = row.get("max_order");

    for draft in drafts {
        sort_order += 1;
        sqlx::query(
            r#"
            INSERT INTO events (
                event_id, case_id, event_type, event_date, event_time,
                file_name, file_count, file_description, file_type,
                metadata, sort_order, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '{}', ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&case_id)
        .bind(draft.event_type.as_str())
        .bind(draft.event_date.format("%Y-%m-%d").to_string())
        .bind(draft.event_time.map(|t| t.format("%H:%M:%S").to_string()))
        .bind(&draft.file_name)
        .bind(draft.file_count)
        .bind(&draft.file_description)
        .bind(&draft.file_type)
        .bind(sort_order)
        .bind(&created_by)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    // Dropping tx without commit rolls everything back
    tx.commit().await?;

    Ok(drafts.len())
}

/// Stored event row, as read back for listings
#[derive(Debug, Clone)]
pub struct EventRow {
    pub event_id: String,
    pub event_type: String,
    pub event_date: String,
    pub event_time: Option<String>,
    pub file_name: Option<String>,
    pub file_count: Option<i64>,
    pub sort_order: i64,
}

/// All events for a case in display order
pub async fn list_for_case(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<EventRow>> {
    let rows = sqlx::query(
        r#"
        SELECT event_id, event_type, event_date, event_time,
               file_name, file_count, sort_order
        FROM events
        WHERE case_id = ?
        ORDER BY sort_order
        "#,
    )
    .bind(case_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| EventRow {
            event_id: r.get("event_id"),
            event_type: r.get("event_type"),
            event_date: r.get("event_date"),
            event_time: r.get("event_time"),
            file_name: r.get("file_name"),
            file_count: r.get("file_count"),
            sort_order: r.get("sort_order"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseline_common::db::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        pool
    }

    async fn seed_case(pool: &SqlitePool) -> (Uuid, Uuid) {
        let user_id = Uuid::new_v4();
        let case_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (user_id, username) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind("auditor")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO cases (case_id, case_number, title, created_by) VALUES (?, 1, 'Test case', ?)")
            .bind(case_id.to_string())
            .bind(user_id.to_string())
            .execute(pool)
            .await
            .unwrap();
        (case_id, user_id)
    }

    fn draft(day: u32) -> EventDraft {
        EventDraft {
            event_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            event_time: None,
            event_type: EventType::Note,
            file_name: None,
            file_count: None,
            file_description: None,
            file_type: None,
        }
    }

    #[tokio::test]
    async fn sort_order_continues_across_batches() {
        let pool = test_pool().await;
        let (case_id, user_id) = seed_case(&pool).await;

        bulk_insert(&pool, case_id, user_id, &[draft(1), draft(2)])
            .await
            .unwrap();
        bulk_insert(&pool, case_id, user_id, &[draft(3)]).await.unwrap();

        let rows = list_for_case(&pool, case_id).await.unwrap();
        let orders: Vec<i64> = rows.iter().map(|r| r.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn draft_from_fields_applies_type_default() {
        let fields = TransformedFields {
            event_date: Some("2025-01-15".to_string()),
            ..Default::default()
        };
        let draft = EventDraft::from_fields(&fields).unwrap();
        assert_eq!(draft.event_type, EventType::Note);
        assert_eq!(draft.event_time, None);
    }

    #[tokio::test]
    async fn draft_from_fields_rejects_missing_date() {
        let err = EventDraft::from_fields(&TransformedFields::default()).unwrap_err();
        assert!(err.contains("missing event date"));
    }
}
