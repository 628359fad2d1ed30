use crate::error::Result;
use std::path::Path;

/// Well-known id of the Drive root folder.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// The slice of the remote store consumed by mirror and backup.
///
/// `create_folder` performs no existence check: calling it twice with the same
/// name and parent creates two distinct folders. `list_folders` returns the
/// immediate child folders of a parent, fully materialized and in server
/// order; an empty parent yields an empty vec, not an error.
pub trait RemoteStore {
    fn create_folder(&self, name: &str, parent_id: &str) -> Result<Folder>;
    fn upload_file(&self, local_path: &Path, name: &str, parent_id: &str) -> Result<String>;
    fn list_folders(&self, parent_id: &str) -> Result<Vec<Folder>>;
}
