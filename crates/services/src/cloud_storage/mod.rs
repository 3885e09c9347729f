pub mod google_drive;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oauth::Credential;

pub use google_drive::GoogleDriveService;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Listing of folder {folder_id} was truncated by the provider")]
    Truncated { folder_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            NodeKind::Folder
        } else {
            NodeKind::File
        }
    }
}

/// A single file or folder entry as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

/// The two capabilities the tree walk consumes from a storage provider.
#[async_trait]
pub trait DriveProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Display name of the folder with the given id.
    async fn folder_name(&self, credential: &Credential, folder_id: &str)
    -> Result<String, DriveError>;

    /// Non-trashed direct children of the folder, in provider order.
    async fn list_children(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<Vec<Node>, DriveError>;
}
