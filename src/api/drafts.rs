//! Draft API endpoints.
//!
//! Each handler resolves the caller's draft session from the client ID
//! header and delegates to the sync core.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use super::{client_id, error, success, ApiResult};
use crate::db::ApplicationStore;
use crate::generate::{GenerateOptions, GeneratedText};
use crate::models::{ApplicationRecord, Draft, DraftPatch};
use crate::sync::SaveOutcome;
use crate::AppState;

/// Result of an explicit save request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub outcome: &'static str,
    pub draft: Draft,
}

/// GET /api/draft - Current draft for this client.
pub async fn get_draft(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Draft> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);
    success(session.draft())
}

/// PUT /api/draft - Merge a partial edit into the draft.
pub async fn update_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<DraftPatch>,
) -> ApiResult<Draft> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);
    success(session.update(&patch))
}

/// DELETE /api/draft - Reset to the empty draft.
pub async fn clear_draft(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Draft> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);
    session.clear();
    success(session.draft())
}

/// POST /api/draft/save - Force an immediate save, bypassing the debounce.
pub async fn save_draft(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SaveResult> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);

    match session.save_now().await {
        Ok(outcome) => {
            let outcome = match outcome {
                SaveOutcome::Created(_) => "created",
                SaveOutcome::Updated(_) => "updated",
                SaveOutcome::Skipped => "skipped",
            };
            success(SaveResult {
                outcome,
                draft: session.draft(),
            })
        }
        Err(e) => error(e),
    }
}

/// POST /api/draft/load/{id} - Hydrate the draft from a remote record.
pub async fn load_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Draft> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);

    match session.load(&id).await {
        Ok(draft) => success(draft),
        Err(e) => error(e),
    }
}

/// POST /api/draft/generate - Produce the formatted request letter.
pub async fn generate_letter(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<GeneratedText> {
    let client = match client_id(&headers) {
        Ok(client) => client,
        Err(e) => return error(e),
    };
    let session = state.draft_session(&client);
    let draft = session.draft();

    let options = GenerateOptions {
        subject: draft.subject.clone(),
        applicant: draft.applicant.clone(),
        language: draft.language.clone(),
    };

    match state
        .generator
        .generate(&draft.query, &draft.department, &options)
        .await
    {
        Ok(text) => success(text),
        Err(e) => error(e),
    }
}

/// GET /api/applications/{id} - Read a persisted application record.
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApplicationRecord> {
    match state.repo.get_application(&id).await {
        Ok(Some(record)) => success(record),
        Ok(None) => error(crate::errors::AppError::NotFound(format!(
            "Application {} not found",
            id
        ))),
        Err(e) => error(e),
    }
}
