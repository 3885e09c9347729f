use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};
use drivetree_services::session::{SessionData, new_session_id};

use crate::{error::ApiError, state::AppState};

/// The browser session named by the signed session cookie.
///
/// A request without a valid cookie, or whose record has expired from the
/// store, gets a fresh empty session; the cookie is only issued once the
/// session is committed.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
    pub is_new: bool,
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let existing = cookie_value(&parts.headers, &state.settings.session.cookie_name)
            .and_then(|value| state.cookies.verify(&value));

        if let Some(id) = existing {
            if let Some(data) = state.sessions.load(&id).await? {
                return Ok(Session {
                    id,
                    data,
                    is_new: false,
                });
            }
        }

        Ok(Session {
            id: new_session_id(),
            data: SessionData::default(),
            is_new: true,
        })
    }
}

impl Session {
    pub async fn save(&self, state: &AppState) -> Result<(), ApiError> {
        state.sessions.save(&self.id, &self.data).await?;
        Ok(())
    }

    /// Saves the session and attaches the cookie to `response` when the
    /// browser does not hold one yet.
    pub async fn commit(
        &self,
        state: &AppState,
        response: impl IntoResponse,
    ) -> Result<Response, ApiError> {
        self.save(state).await?;

        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!(
                "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
                state.settings.session.cookie_name,
                state.cookies.sign(&self.id),
                state.settings.session.ttl_secs
            );
            response
                .headers_mut()
                .insert(header::SET_COOKIE, header_value(&cookie)?);
        }
        Ok(response)
    }

    /// Drops the stored record and expires the cookie.
    pub async fn destroy(
        &self,
        state: &AppState,
        response: impl IntoResponse,
    ) -> Result<Response, ApiError> {
        state.sessions.remove(&self.id).await?;

        let cookie = format!(
            "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
            state.settings.session.cookie_name
        );
        let mut response = response.into_response();
        response
            .headers_mut()
            .insert(header::SET_COOKIE, header_value(&cookie)?);
        Ok(response)
    }
}

fn header_value(cookie: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(cookie)
        .map_err(|_| ApiError::Internal("Invalid session cookie".to_string()))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
