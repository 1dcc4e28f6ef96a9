//! Spreadsheet import API handlers
//!
//! Three-phase flow per case: upload creates an in-memory session,
//! validate applies a column mapping and returns per-row results,
//! confirm persists the valid rows and deletes the session. Validate
//! may be repeated with different mappings; confirm is one-shot.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::post,
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{EventField, ImportSession, ValidatedRow};
use crate::services::{ingest, row_validator};
use crate::AppState;

/// Rows echoed back for mapping preview
const PREVIEW_ROW_LIMIT: usize = 10;

/// POST upload response
#[derive(Debug, Serialize)]
pub struct ImportUploadResponse {
    pub session_id: Uuid,
    pub filename: String,
    pub headers: Vec<String>,
    pub row_count: usize,
    /// First rows of the file, pre-transformation, for the mapping UI
    pub preview_rows: Vec<Vec<crate::models::CellValue>>,
}

/// POST validate request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub session_id: Uuid,
    /// Column name → target field name; pair order is preserved and
    /// fixes the per-row error ordering
    pub mappings: IndexMap<String, String>,
}

/// POST validate response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub session_id: Uuid,
    pub total_rows: usize,
    pub valid_count: usize,
    pub error_count: usize,
    pub rows: Vec<ValidatedRow>,
}

/// POST confirm request
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub session_id: Uuid,
}

/// POST confirm response
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub created_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

/// POST /cases/:case_id/imports/upload
///
/// Accepts a multipart upload with a `file` part, parses it, and opens
/// a new import session scoped to the caller and case.
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(case_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportUploadResponse>> {
    if !db::cases::case_exists(&state.db, case_id).await? {
        return Err(ApiError::NotFound("Case not found".to_string()));
    }

    // Opportunistic cleanup of abandoned sessions
    let swept = state.sessions.sweep_expired().await;
    if swept > 0 {
        tracing::info!(swept, "Removed expired import sessions");
    }

    let max_bytes = state.config.max_upload_bytes;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?;

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::PayloadTooLarge(format!(
                    "File too large (max {} MB)",
                    max_bytes / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    };

    let table = ingest::ingest(&filename, &bytes)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let session = ImportSession::new(case_id, user_id, filename.clone(), table);
    let response = ImportUploadResponse {
        session_id: session.session_id,
        filename,
        headers: session.headers.clone(),
        row_count: session.rows.len(),
        preview_rows: session.rows.iter().take(PREVIEW_ROW_LIMIT).cloned().collect(),
    };

    tracing::info!(
        session_id = %session.session_id,
        case_id = %case_id,
        rows = response.row_count,
        "Import session opened"
    );

    state.sessions.put(session).await;

    Ok(Json(response))
}

/// POST /cases/:case_id/imports/validate
///
/// Checks the requested column mapping against the session headers,
/// validates every row, and stores the results on the session.
/// Re-running with a different mapping replaces the prior results.
pub async fn validate_mapping(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(case_id): Path<Uuid>,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<Json<ValidateResponse>> {
    if !db::cases::case_exists(&state.db, case_id).await? {
        return Err(ApiError::NotFound("Case not found".to_string()));
    }

    let mut session = load_owned_session(&state, request.session_id, user_id, case_id).await?;

    if request.mappings.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "No column mappings provided.".to_string(),
        ));
    }

    let mut mappings: Vec<(String, EventField)> = Vec::with_capacity(request.mappings.len());
    for (column, field_name) in &request.mappings {
        let field = EventField::parse(field_name).ok_or_else(|| {
            let mut valid: Vec<&str> = EventField::ALL.iter().map(|f| f.as_str()).collect();
            valid.sort_unstable();
            ApiError::UnprocessableEntity(format!(
                "Unknown event field: '{}'. Valid fields: {}",
                field_name,
                valid.join(", ")
            ))
        })?;

        if !session.headers.iter().any(|h| h == column) {
            return Err(ApiError::UnprocessableEntity(format!(
                "Column '{}' not found in uploaded file headers.",
                column
            )));
        }

        mappings.push((column.clone(), field));
    }

    if !mappings.iter().any(|(_, f)| *f == EventField::EventDate) {
        return Err(ApiError::UnprocessableEntity(
            "Event date mapping is required. Map a column to 'event_date'.".to_string(),
        ));
    }

    let rows = row_validator::validate_rows(&session.rows, &session.headers, &mappings);
    let valid_count = rows.iter().filter(|r| r.valid).count();
    let error_count = rows.len() - valid_count;

    let response = ValidateResponse {
        session_id: session.session_id,
        total_rows: rows.len(),
        valid_count,
        error_count,
        rows: rows.clone(),
    };

    tracing::info!(
        session_id = %session.session_id,
        valid = valid_count,
        invalid = error_count,
        "Mapping validated"
    );

    session.attach_validation(mappings, rows);
    state.sessions.put(session).await;

    Ok(Json(response))
}

/// POST /cases/:case_id/imports/confirm
///
/// Persists the valid rows of a validated session as events, then
/// deletes the session. On a storage failure the session is kept so
/// the client can retry confirm.
pub async fn confirm_import(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(case_id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<Json<ConfirmResponse>> {
    if !db::cases::case_exists(&state.db, case_id).await? {
        return Err(ApiError::NotFound("Case not found".to_string()));
    }

    let session = load_owned_session(&state, request.session_id, user_id, case_id).await?;

    let Some(validated_rows) = session.validated_rows.as_ref() else {
        return Err(ApiError::BadRequest(
            "Must validate mapping before confirming import.".to_string(),
        ));
    };

    let mut drafts = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    for row in validated_rows {
        // Invalid rows were already reported by validate; skipped here
        if !row.valid {
            continue;
        }
        match db::EventDraft::from_fields(&row.data) {
            Ok(draft) => drafts.push(draft),
            Err(e) => errors.push(format!("Row {}: {}", row.row_number, e)),
        }
    }

    // Serialize confirms so concurrent batches cannot interleave
    // sort_order reads and writes
    let created_count = {
        let _guard = state.confirm_lock.lock().await;
        match db::bulk_insert(&state.db, case_id, user_id, &drafts).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(
                    session_id = %session.session_id,
                    error = %e,
                    "Import confirm failed to persist events"
                );
                return Err(ApiError::Internal(
                    "Failed to save imported events".to_string(),
                ));
            }
        }
    };

    state.sessions.remove(session.session_id).await;

    tracing::info!(
        session_id = %session.session_id,
        case_id = %case_id,
        created = created_count,
        errors = errors.len(),
        "Import confirmed"
    );

    Ok(Json(ConfirmResponse {
        created_count,
        error_count: errors.len(),
        errors,
    }))
}

/// Fetch a live session and check it against the caller and case.
///
/// Ownership is checked before case scope, so a stolen session id leaks
/// nothing about which case it belongs to.
async fn load_owned_session(
    state: &AppState,
    session_id: Uuid,
    user_id: Uuid,
    case_id: Uuid,
) -> ApiResult<ImportSession> {
    let session = state.sessions.get(session_id).await.ok_or_else(|| {
        ApiError::NotFound("Import session not found. Please upload the file again.".to_string())
    })?;

    if session.owner_user_id != user_id {
        return Err(ApiError::Forbidden(
            "This import session belongs to another user.".to_string(),
        ));
    }
    if session.case_id != case_id {
        return Err(ApiError::BadRequest(
            "Import session does not belong to this case.".to_string(),
        ));
    }

    Ok(session)
}

/// Build import routes.
///
/// The upload route opts out of the default body limit; the handler
/// enforces the configured cap itself while streaming.
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/:case_id/imports/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/cases/:case_id/imports/validate", post(validate_mapping))
        .route("/cases/:case_id/imports/confirm", post(confirm_import))
}
