use crate::error::{Error, Result};
use crate::store::RemoteStore;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one mirror operation.
#[derive(Debug)]
pub struct MirrorSummary {
    /// Id of the remote folder created for the top of the mirrored tree.
    pub root_id: String,
    pub folders_created: usize,
    pub files_uploaded: usize,
}

/// Reproduces a local directory tree, structure and file contents, under a
/// remote parent folder.
///
/// The mapping from relative directory path to created folder id lives only
/// for the duration of one `mirror` call and is never persisted, so mirroring
/// the same tree twice creates a second full copy remotely.
pub struct Mirror<'a, S: RemoteStore> {
    store: &'a S,
    mapping: HashMap<PathBuf, String>,
    folders_created: usize,
    files_uploaded: usize,
}

impl<'a, S: RemoteStore> Mirror<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            mapping: HashMap::new(),
            folders_created: 0,
            files_uploaded: 0,
        }
    }

    /// Mirrors `local_root` under `dest_parent_id` and returns the id of the
    /// created mirror root.
    ///
    /// The local path is validated before any remote call is made. The walk
    /// is depth-first pre-order; sibling order is whatever the filesystem
    /// enumeration yields. A single failed folder creation or upload aborts
    /// the whole operation, leaving already-created remote objects in place.
    pub fn mirror(mut self, local_root: &Path, dest_parent_id: &str) -> Result<MirrorSummary> {
        if !local_root.is_dir() {
            return Err(Error::InvalidPath(local_root.to_path_buf()));
        }
        let name = local_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidPath(local_root.to_path_buf()))?;

        let root = self.store.create_folder(&name, dest_parent_id)?;
        self.folders_created += 1;
        let root_id = root.id.clone();
        self.mapping.insert(PathBuf::new(), root.id);

        self.walk(local_root, Path::new(""))?;

        Ok(MirrorSummary {
            root_id,
            folders_created: self.folders_created,
            files_uploaded: self.files_uploaded,
        })
    }

    fn walk(&mut self, dir: &Path, rel: &Path) -> Result<()> {
        let folder_id = self.remote_dir_id(rel)?;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                self.walk(&entry.path(), &rel.join(&name))?;
            } else if file_type.is_file() {
                self.store.upload_file(&entry.path(), &name, &folder_id)?;
                self.files_uploaded += 1;
            }
            // Anything else (dangling symlinks, sockets, devices) is skipped.
        }
        Ok(())
    }

    /// Resolves the remote folder for a relative directory path, creating any
    /// missing segments of the chain. Each unique relative path gets exactly
    /// one remote folder per mirror call, cached in the mapping.
    fn remote_dir_id(&mut self, rel: &Path) -> Result<String> {
        if let Some(id) = self.mapping.get(rel) {
            return Ok(id.clone());
        }
        let parent_id = match rel.parent() {
            Some(parent) => self.remote_dir_id(parent)?,
            // The empty relative path is seeded with the mirror root before
            // the walk starts, so recursion always bottoms out above.
            None => return Err(Error::InvalidPath(rel.to_path_buf())),
        };
        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidPath(rel.to_path_buf()))?;

        let folder = self.store.create_folder(&name, &parent_id)?;
        self.folders_created += 1;
        self.mapping.insert(rel.to_path_buf(), folder.id.clone());
        Ok(folder.id)
    }
}
