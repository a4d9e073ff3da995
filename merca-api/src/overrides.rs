use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use merca_core::identity::Role;

use crate::error::AppError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

/// PUT /v1/overrides/{namespace}/{key}
/// Admin-only editor for the demo's fake-persistence overrides.
pub async fn set_override(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path((namespace, key)): Path<(String, String)>,
    Json(value): Json<serde_json::Value>,
) -> Result<StatusCode, AppError> {
    require_admin(&session)?;
    state.overrides.set(&namespace, &key, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/overrides/{namespace}/{key}
pub async fn delete_override(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    require_admin(&session)?;
    if state.overrides.remove(&namespace, &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "no override at {}/{}",
            namespace, key
        )))
    }
}

fn require_admin(session: &AuthSession) -> Result<(), AppError> {
    if session.actor.role != Role::Admin {
        return Err(AppError::Forbidden(
            "only admins may edit overrides".to_string(),
        ));
    }
    Ok(())
}
