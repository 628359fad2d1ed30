use crate::auth::Auth;
use crate::error::{sanitize, Error, Result};
use crate::store::{Folder, RemoteStore};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::Read as _;
use std::path::Path;

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
// Drive requires resumable chunks to be a multiple of 256 KiB.
const UPLOAD_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Blocking Google Drive v3 client. One instance owns one authenticated
/// session and is reused serially for all calls in a process invocation.
pub struct Drive {
    http: reqwest::blocking::Client,
    api_base_url: String,
    auth: Auth,
}

pub struct DriveConfig {
    pub auth: Auth,
    pub api_base_url: String,
}

impl Drive {
    pub fn new(auth: Auth) -> Result<Self> {
        Self::from_config(DriveConfig {
            auth,
            api_base_url: env::var("DRIVEKEEP_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        })
    }

    pub fn from_config(cfg: DriveConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::blocking::Client::builder()
                .user_agent(concat!("drivekeep/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| Error::Remote(format!("failed to build http client: {e}")))?,
            api_base_url: cfg.api_base_url,
            auth: cfg.auth,
        })
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base_url.trim_end_matches('/'))
    }
}

impl RemoteStore for Drive {
    fn create_folder(&self, name: &str, parent_id: &str) -> Result<Folder> {
        let token = self.auth.access_token()?;
        let payload = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(self.files_url())
            .bearer_auth(&token)
            .query(&[("fields", "id, name")])
            .json(&payload)
            .send()
            .map_err(|e| Error::Remote(format!("create folder request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Remote(format!(
                "create folder '{}' failed ({}): {}",
                name,
                status,
                sanitize(&body)
            )));
        }

        let file: DriveFile = response
            .json()
            .map_err(|e| Error::Remote(format!("invalid create folder json: {e}")))?;
        Ok(Folder {
            id: file.id,
            name: file.name,
        })
    }

    fn list_folders(&self, parent_id: &str) -> Result<Vec<Folder>> {
        let token = self.auth.access_token()?;
        let query = format!("mimeType='{FOLDER_MIME_TYPE}' and '{parent_id}' in parents");

        let mut folders = Vec::new();
        let mut page_token: Option<String> = None;

        // Drain the page cursor so callers get one fully materialized list.
        loop {
            let mut rb = self.http.get(self.files_url()).bearer_auth(&token).query(&[
                ("q", query.as_str()),
                ("fields", "nextPageToken, files(id, name)"),
            ]);
            if let Some(t) = &page_token {
                rb = rb.query(&[("pageToken", t.as_str())]);
            }

            let response = rb
                .send()
                .map_err(|e| Error::Remote(format!("list request failed: {e}")))?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(Error::Remote(format!(
                    "list failed ({}): {}",
                    status,
                    sanitize(&body)
                )));
            }

            let page: FileListResponse = response
                .json()
                .map_err(|e| Error::Remote(format!("invalid list json: {e}")))?;
            folders.extend(page.files.into_iter().map(|f| Folder {
                id: f.id,
                name: f.name,
            }));

            match page.next_page_token {
                Some(t) => page_token = Some(t),
                None => break,
            }
        }

        Ok(folders)
    }

    fn upload_file(&self, local_path: &Path, name: &str, parent_id: &str) -> Result<String> {
        let token = self.auth.access_token()?;
        let file_size = fs::metadata(local_path)?.len();

        // Open a resumable upload session, then stream the content in chunks.
        let init_url = format!(
            "{}/upload/drive/v3/files",
            self.api_base_url.trim_end_matches('/')
        );
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(&init_url)
            .bearer_auth(&token)
            .query(&[("uploadType", "resumable")])
            .header("X-Upload-Content-Length", file_size)
            .json(&metadata)
            .send()
            .map_err(|e| Error::Remote(format!("upload init request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Remote(format!(
                "upload init for '{}' failed ({}): {}",
                name,
                status,
                sanitize(&body)
            )));
        }

        let session_uri = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::Remote("upload init response has no session uri".into()))?;

        if file_size == 0 {
            let response = self
                .http
                .put(&session_uri)
                .bearer_auth(&token)
                .header(reqwest::header::CONTENT_RANGE, "bytes */0")
                .body(Vec::new())
                .send()
                .map_err(|e| Error::Remote(format!("upload request failed: {e}")))?;
            return finish_upload(response, name);
        }

        let mut file = fs::File::open(local_path)?;
        let mut offset: u64 = 0;

        while offset < file_size {
            let len = UPLOAD_CHUNK_SIZE.min(file_size - offset);
            let mut buf = vec![0u8; len as usize];
            file.read_exact(&mut buf)?;
            let end = offset + len - 1;

            let response = self
                .http
                .put(&session_uri)
                .bearer_auth(&token)
                .header(
                    reqwest::header::CONTENT_RANGE,
                    format!("bytes {offset}-{end}/{file_size}"),
                )
                .body(buf)
                .send()
                .map_err(|e| Error::Remote(format!("upload chunk request failed: {e}")))?;

            offset += len;

            // 308 acknowledges an intermediate chunk; the final chunk answers
            // with the created file.
            if response.status() == reqwest::StatusCode::PERMANENT_REDIRECT {
                continue;
            }
            return finish_upload(response, name);
        }

        Err(Error::Remote(format!(
            "upload of '{}' ended without a completion response",
            name
        )))
    }
}

fn finish_upload(response: reqwest::blocking::Response, name: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(Error::Remote(format!(
            "upload of '{}' failed ({}): {}",
            name,
            status,
            sanitize(&body)
        )));
    }
    let file: DriveFile = response
        .json()
        .map_err(|e| Error::Remote(format!("invalid upload response json: {e}")))?;
    Ok(file.id)
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}
