use axum::{
    extract::{Query, State},
    response::{Redirect, Response},
};
use drivetree_services::oauth::OAuthError;
use serde::Deserialize;
use tracing::info;

use crate::{error::ApiError, extractors::session::Session, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /login
/// Starts the authorization-code flow with a fresh `state` nonce.
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, ApiError> {
    let url = state.gate.begin_authorization(&mut session.data);
    session.commit(&state, Redirect::to(&url)).await
}

/// GET /callback
/// Exchanges the one-time code for a credential and stores it in the session.
pub async fn callback(
    State(state): State<AppState>,
    mut session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    if let Some(reason) = params.error {
        if !session.is_new {
            session.data.oauth_state = None;
            session.save(&state).await?;
        }
        return Err(OAuthError::Denied(reason).into());
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;
    let returned_state = params.state.unwrap_or_default();

    let result = state
        .gate
        .complete_authorization(&mut session.data, &code, &returned_state)
        .await;

    // The nonce is single-use even when the exchange fails. A callback without
    // a session cookie has nothing to consume and nothing to persist.
    if !session.is_new {
        session.save(&state).await?;
    }
    result?;

    info!("Stored credential for session");
    session.commit(&state, Redirect::to("/")).await
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    session.destroy(&state, Redirect::to("/login")).await
}
