//! Template API endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::Template;
use crate::AppState;

const LIST_CACHE_KEY: &str = "all";

/// GET /api/templates - List request templates, served from the lookup cache.
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Vec<Template>> {
    if let Some(list) = state.template_cache.get(&LIST_CACHE_KEY.to_string()) {
        return success(list);
    }

    match state.repo.list_templates().await {
        Ok(list) => {
            state
                .template_cache
                .insert(LIST_CACHE_KEY.to_string(), list.clone());
            success(list)
        }
        Err(e) => error(e),
    }
}
