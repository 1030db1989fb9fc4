//! Department API endpoints.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::db::ApplicationStore;
use crate::models::Department;
use crate::AppState;

const LIST_CACHE_KEY: &str = "all";

/// GET /api/departments - List all departments, served from the lookup cache.
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    if let Some(list) = state.department_list_cache.get(&LIST_CACHE_KEY.to_string()) {
        return success(list);
    }

    match state.repo.list_departments().await {
        Ok(list) => {
            state
                .department_list_cache
                .insert(LIST_CACHE_KEY.to_string(), list.clone());
            success(list)
        }
        Err(e) => error(e),
    }
}

/// Query parameters for name resolution.
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub name: String,
}

/// Resolved department reference; `id` is null when no department matches.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub id: Option<String>,
}

/// GET /api/departments/lookup?name= - Resolve a display name to an ID.
pub async fn lookup_department(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> ApiResult<LookupResult> {
    let key = params.name.trim().to_lowercase();
    if key.is_empty() {
        return error(crate::errors::AppError::BadRequest(
            "Department name is required".to_string(),
        ));
    }

    if let Some(id) = state.departments_cache.get(&key) {
        return success(LookupResult { id: Some(id) });
    }

    match state.repo.find_department_id(&params.name).await {
        Ok(Some(id)) => {
            state.departments_cache.insert(key, id.clone());
            success(LookupResult { id: Some(id) })
        }
        Ok(None) => success(LookupResult { id: None }),
        Err(e) => error(e),
    }
}
