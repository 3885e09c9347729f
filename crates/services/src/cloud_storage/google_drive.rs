use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{DriveError, DriveProvider, Node, NodeKind};
use crate::oauth::Credential;

/// Largest page the files.list endpoint will return.
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
struct FileMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GoogleDriveService {
    client: Client,
    api_base: String,
}

impl GoogleDriveService {
    pub fn new(api_base: String, http_timeout: Duration) -> Result<Self, DriveError> {
        let client = Client::builder().timeout(http_timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, DriveError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(DriveError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DriveProvider for GoogleDriveService {
    fn provider_name(&self) -> &str {
        "google_drive"
    }

    async fn folder_name(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<String, DriveError> {
        let resp = self
            .client
            .get(format!(
                "{}/files/{}",
                self.api_base,
                urlencoding::encode(folder_id)
            ))
            .bearer_auth(&credential.token)
            .query(&[("fields", "id,name")])
            .send()
            .await?;

        let metadata: FileMetadata = Self::handle_response(resp).await?;
        Ok(metadata.name)
    }

    async fn list_children(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<Vec<Node>, DriveError> {
        let query = format!("'{}' in parents and trashed = false", folder_id);

        let resp = self
            .client
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&credential.token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "nextPageToken,files(id,name,mimeType)"),
                ("pageSize", PAGE_SIZE),
            ])
            .send()
            .await?;

        let listing: FileListResponse = Self::handle_response(resp).await?;

        // One call per folder; a continuation token means the tree would be incomplete.
        if listing.next_page_token.is_some() {
            return Err(DriveError::Truncated {
                folder_id: folder_id.to_string(),
            });
        }

        debug!(folder_id, children = listing.files.len(), "Listed folder");

        Ok(listing
            .files
            .into_iter()
            .map(|f| Node {
                kind: NodeKind::from_mime_type(&f.mime_type),
                id: f.id,
                name: f.name,
            })
            .collect())
    }
}
