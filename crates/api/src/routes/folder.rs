use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use drivetree_services::{GateOutcome, MaterializedTree};
use serde::Deserialize;
use tracing::error;
use validator::{Validate, ValidationError};

use crate::{error::ApiError, extractors::session::Session, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct FolderRequest {
    #[validate(length(min = 1, max = 256), custom(function = "validate_folder_id"))]
    pub folder_id: String,
}

fn validate_folder_id(folder_id: &str) -> Result<(), ValidationError> {
    if folder_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("folder_id"))
    }
}

/// POST /get-folder
/// Materializes the folder tree below `folder_id` for both viewer panels.
pub async fn get_folder(
    State(state): State<AppState>,
    mut session: Session,
    body: Result<Json<FolderRequest>, JsonRejection>,
) -> Result<Json<MaterializedTree>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    body.validate()
        .map_err(|_| ApiError::BadRequest("Invalid folder_id".to_string()))?;

    let credential = match state.gate.ensure_authenticated(&mut session.data).await {
        GateOutcome::Authorized {
            credential,
            refreshed,
        } => {
            if refreshed {
                session.save(&state).await?;
            }
            credential
        }
        GateOutcome::Redirect => {
            if !session.is_new {
                session.save(&state).await?;
            }
            return Err(ApiError::Unauthorized("Not authenticated".to_string()));
        }
    };

    let timeout = Duration::from_secs(state.settings.drive.request_timeout_secs);
    let walk = state.materializer.materialize(&credential, &body.folder_id);

    match tokio::time::timeout(timeout, walk).await {
        Ok(Ok(tree)) => Ok(Json(tree)),
        Ok(Err(e)) => {
            error!(folder_id = %body.folder_id, error = %e, "Error fetching folder contents");
            Err(ApiError::Internal("Failed to fetch folder contents".to_string()))
        }
        Err(_) => {
            error!(folder_id = %body.folder_id, "Timed out fetching folder contents");
            Err(ApiError::Internal("Failed to fetch folder contents".to_string()))
        }
    }
}
