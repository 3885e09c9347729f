pub mod cloud_storage;
pub mod gate;
pub mod oauth;
pub mod session;
pub mod tree;

pub use cloud_storage::{DriveProvider, GoogleDriveService};
pub use gate::{CredentialGate, GateOutcome};
pub use oauth::{AuthorizationProvider, Credential, OAuthService};
pub use session::{SessionData, SessionStore};
pub use tree::{MaterializedTree, Materializer};
