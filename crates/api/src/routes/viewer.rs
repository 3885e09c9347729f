use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use drivetree_services::GateOutcome;
use tracing::warn;

use crate::{error::ApiError, extractors::session::Session, state::AppState};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET /
/// Serves the viewer page, or sends the browser through the login flow.
pub async fn index(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, ApiError> {
    match state.gate.ensure_authenticated(&mut session.data).await {
        GateOutcome::Authorized { refreshed, .. } => {
            if refreshed {
                session.save(&state).await?;
            }
            Ok(Html(viewer_page(&state).await).into_response())
        }
        GateOutcome::Redirect => {
            if !session.is_new {
                session.save(&state).await?;
            }
            Ok(Redirect::to("/login").into_response())
        }
    }
}

async fn viewer_page(state: &AppState) -> String {
    let Some(dir) = state.settings.app.static_dir.as_deref() else {
        return INDEX_HTML.to_string();
    };

    let path = std::path::Path::new(dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => page,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Falling back to built-in viewer page");
            INDEX_HTML.to_string()
        }
    }
}
