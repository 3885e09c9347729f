pub mod render;

use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::cloud_storage::{DriveError, DriveProvider, Node, NodeKind};
use crate::oauth::Credential;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error("Folder {folder_id} is nested deeper than {max_depth} levels")]
    DepthExceeded { folder_id: String, max_depth: usize },
}

/// Rendered output for one folder and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFragment {
    pub left: String,
    pub right: String,
    pub files: String,
    pub folder_count: usize,
    pub file_count: usize,
}

impl RenderedFragment {
    /// Lays out one folder: its headers, its own files, then each sub-folder
    /// fragment in order, and finally the closing tag of its container.
    fn assemble(
        folder_id: &str,
        name: &str,
        path: &str,
        depth: usize,
        files: &[Node],
        subfolders: Vec<RenderedFragment>,
    ) -> Self {
        let mut left = render::left_folder_open(folder_id, name, depth);
        let mut right = render::right_folder(folder_id, name, depth);
        let mut listing = String::new();

        for file in files {
            let full_path = render::join_path(path, &file.name);
            left.push_str(&render::left_file(folder_id, &file.name, &full_path, depth));
            listing.push_str(&render::listing_file(&file.name, &full_path));
        }

        let mut folder_count = 1;
        let mut file_count = files.len();
        for child in subfolders {
            left.push_str(&child.left);
            right.push_str(&child.right);
            listing.push_str(&child.files);
            folder_count += child.folder_count;
            file_count += child.file_count;
        }

        left.push_str(render::LEFT_FOLDER_CLOSE);

        Self {
            left,
            right,
            files: listing,
            folder_count,
            file_count,
        }
    }
}

/// Response payload for one materialized folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedTree {
    pub folder_html_left: String,
    pub folder_html_right: String,
    pub file_html: String,
    pub folder_name: String,
    pub folder_link: String,
}

/// Walks a provider folder hierarchy depth-first and renders both panels.
#[derive(Clone)]
pub struct Materializer {
    provider: Arc<dyn DriveProvider>,
    max_depth: usize,
    folder_link_base: String,
}

struct Walked {
    name: String,
    fragment: RenderedFragment,
}

impl Materializer {
    pub fn new(provider: Arc<dyn DriveProvider>, max_depth: usize, folder_link_base: String) -> Self {
        Self {
            provider,
            max_depth,
            folder_link_base: folder_link_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn materialize(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<MaterializedTree, TreeError> {
        let started = Instant::now();
        let walked = self.walk(credential, folder_id, "/", 0).await?;

        info!(
            provider = self.provider.provider_name(),
            folder_id,
            folders = walked.fragment.folder_count,
            files = walked.fragment.file_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Materialized folder tree"
        );

        Ok(MaterializedTree {
            folder_html_left: walked.fragment.left,
            folder_html_right: walked.fragment.right,
            file_html: walked.fragment.files,
            folder_name: walked.name,
            folder_link: format!(
                "{}/{}",
                self.folder_link_base,
                urlencoding::encode(folder_id)
            ),
        })
    }

    fn walk<'a>(
        &'a self,
        credential: &'a Credential,
        folder_id: &'a str,
        parent_path: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<Walked, TreeError>> {
        async move {
            if depth >= self.max_depth {
                return Err(TreeError::DepthExceeded {
                    folder_id: folder_id.to_string(),
                    max_depth: self.max_depth,
                });
            }

            let name = self.provider.folder_name(credential, folder_id).await?;
            let path = render::join_path(parent_path, &name);

            let (files, folders): (Vec<Node>, Vec<Node>) = self
                .provider
                .list_children(credential, folder_id)
                .await?
                .into_iter()
                .partition(|node| node.kind == NodeKind::File);

            let mut subfolders = Vec::with_capacity(folders.len());
            for folder in &folders {
                let child = self.walk(credential, &folder.id, &path, depth + 1).await?;
                subfolders.push(child.fragment);
            }

            let fragment =
                RenderedFragment::assemble(folder_id, &name, &path, depth, &files, subfolders);
            Ok(Walked { name, fragment })
        }
        .boxed()
    }
}
