use std::sync::Arc;

use tracing::{info, warn};

use crate::oauth::{AuthorizationProvider, Credential, OAuthError};
use crate::session::{SessionData, new_state_nonce};

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// A usable credential. `refreshed` is set when the session was modified
    /// and must be written back to the store.
    Authorized { credential: Credential, refreshed: bool },
    /// The caller must go through the authorization flow.
    Redirect,
}

/// Decides whether a session holds delegated access, renewing it when possible.
#[derive(Clone)]
pub struct CredentialGate {
    provider: Arc<dyn AuthorizationProvider>,
}

impl CredentialGate {
    pub fn new(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self { provider }
    }

    pub async fn ensure_authenticated(&self, session: &mut SessionData) -> GateOutcome {
        let Some(credential) = session.credential.as_ref() else {
            return GateOutcome::Redirect;
        };

        if !credential.is_expired() {
            return GateOutcome::Authorized {
                credential: credential.clone(),
                refreshed: false,
            };
        }

        if !credential.can_refresh() {
            info!("Stored credential expired without a refresh token");
            return GateOutcome::Redirect;
        }

        match self.provider.refresh(credential).await {
            Ok(renewed) => {
                info!("Refreshed expired credential");
                session.credential = Some(renewed.clone());
                GateOutcome::Authorized {
                    credential: renewed,
                    refreshed: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed, falling back to login");
                session.credential = None;
                GateOutcome::Redirect
            }
        }
    }

    /// Starts the authorization handshake: stores a fresh `state` nonce in the
    /// session and returns the provider URL to redirect to.
    pub fn begin_authorization(&self, session: &mut SessionData) -> String {
        let state = new_state_nonce();
        let url = self.provider.authorize_url(&state);
        session.oauth_state = Some(state);
        url
    }

    /// Completes the handshake on the callback path. The stored nonce is
    /// consumed whether or not the exchange succeeds.
    pub async fn complete_authorization(
        &self,
        session: &mut SessionData,
        code: &str,
        state: &str,
    ) -> Result<(), OAuthError> {
        let expected = session.oauth_state.take();
        if expected.as_deref() != Some(state) {
            return Err(OAuthError::StateMismatch);
        }

        let credential = self.provider.exchange_code(code).await?;
        session.credential = Some(credential);
        Ok(())
    }
}
