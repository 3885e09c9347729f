use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;

pub const GOOD_CODE: &str = "good-code";
pub const ACCESS_TOKEN: &str = "access-token";
pub const REFRESHED_TOKEN: &str = "refreshed-token";
pub const REFRESH_TOKEN: &str = "refresh-token";
pub const SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub trashed: bool,
}

/// Folder hierarchy served by the fake Drive endpoints.
#[derive(Debug, Default)]
pub struct FakeDrive {
    names: HashMap<String, String>,
    children: HashMap<String, Vec<FakeEntry>>,
    failing: HashSet<String>,
    truncated: HashSet<String>,
}

impl FakeDrive {
    pub fn folder(mut self, id: &str, name: &str, parent: Option<&str>) -> Self {
        self.names.insert(id.to_string(), name.to_string());
        if let Some(parent) = parent {
            self.push(parent, id, name, FOLDER_MIME, false);
        }
        self
    }

    pub fn file(mut self, id: &str, name: &str, parent: &str) -> Self {
        self.push(parent, id, name, "text/plain", false);
        self
    }

    pub fn trashed_file(mut self, id: &str, name: &str, parent: &str) -> Self {
        self.push(parent, id, name, "text/plain", true);
        self
    }

    /// Metadata lookups for `id` answer 500.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Listings of `id` carry a `nextPageToken`.
    pub fn truncated(mut self, id: &str) -> Self {
        self.truncated.insert(id.to_string());
        self
    }

    fn push(&mut self, parent: &str, id: &str, name: &str, mime_type: &str, trashed: bool) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(FakeEntry {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                trashed,
            });
    }
}

pub struct FakeGoogleState {
    pub drive: RwLock<FakeDrive>,
    pub refresh_ok: AtomicBool,
    pub code_exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub drive_calls: AtomicUsize,
}

/// A stand-in for the identity provider's token endpoint and the Drive v3
/// `files.get` / `files.list` endpoints.
pub struct FakeGoogle {
    pub base_url: String,
    pub state: Arc<FakeGoogleState>,
}

impl FakeGoogle {
    pub async fn spawn(drive: FakeDrive) -> Self {
        let state = Arc::new(FakeGoogleState {
            drive: RwLock::new(drive),
            refresh_ok: AtomicBool::new(true),
            code_exchanges: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            drive_calls: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/token", post(token))
            .route("/drive/v3/files", get(list_files))
            .route("/drive/v3/files/{file_id}", get(get_file))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake provider");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set_refresh_ok(&self, ok: bool) {
        self.state.refresh_ok.store(ok, Ordering::SeqCst);
    }

    pub fn refreshes(&self) -> usize {
        self.state.refreshes.load(Ordering::SeqCst)
    }

    pub fn code_exchanges(&self) -> usize {
        self.state.code_exchanges.load(Ordering::SeqCst)
    }

    pub fn drive_calls(&self) -> usize {
        self.state.drive_calls.load(Ordering::SeqCst)
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    matches!(bearer, Some(ACCESS_TOKEN) | Some(REFRESHED_TOKEN))
}

async fn token(
    State(state): State<Arc<FakeGoogleState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let field = |key: &str| form.get(key).map(String::as_str);

    match field("grant_type") {
        Some("authorization_code") => {
            state.code_exchanges.fetch_add(1, Ordering::SeqCst);
            if field("code") != Some(GOOD_CODE) {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
                    .into_response();
            }
            Json(json!({
                "access_token": ACCESS_TOKEN,
                "refresh_token": REFRESH_TOKEN,
                "expires_in": 3599,
                "scope": SCOPE,
                "token_type": "Bearer",
            }))
            .into_response()
        }
        Some("refresh_token") => {
            state.refreshes.fetch_add(1, Ordering::SeqCst);
            if !state.refresh_ok.load(Ordering::SeqCst) || field("refresh_token") != Some(REFRESH_TOKEN) {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
                    .into_response();
            }
            Json(json!({
                "access_token": REFRESHED_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer",
            }))
            .into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response(),
    }
}

async fn get_file(
    State(state): State<Arc<FakeGoogleState>>,
    Path(file_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.drive_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    if params.get("fields").map(String::as_str) != Some("id,name") {
        return error(StatusCode::BAD_REQUEST, "Invalid field selection");
    }

    let drive = state.drive.read().unwrap();
    if drive.failing.contains(&file_id) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Backend Error");
    }
    match drive.names.get(&file_id) {
        Some(name) => Json(json!({ "id": file_id, "name": name })).into_response(),
        None => error(
            StatusCode::NOT_FOUND,
            &format!("File not found: {}.", file_id),
        ),
    }
}

async fn list_files(
    State(state): State<Arc<FakeGoogleState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.drive_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }

    // q = "'<parent>' in parents and trashed = false"
    let q = params.get("q").cloned().unwrap_or_default();
    let Some(parent) = q.split('\'').nth(1) else {
        return error(StatusCode::BAD_REQUEST, "Invalid Value");
    };
    let skip_trashed = q.contains("trashed = false");

    let drive = state.drive.read().unwrap();
    let files: Vec<_> = drive
        .children
        .get(parent)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| !(skip_trashed && e.trashed))
                .map(|e| json!({ "id": e.id, "name": e.name, "mimeType": e.mime_type }))
                .collect()
        })
        .unwrap_or_default();

    if drive.truncated.contains(parent) {
        return Json(json!({ "files": files, "nextPageToken": "page-2" })).into_response();
    }
    Json(json!({ "files": files })).into_response()
}
