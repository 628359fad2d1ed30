use crate::error::{Error, Result};
use crate::mirror::{Mirror, MirrorSummary};
use crate::store::{RemoteStore, ROOT_ID};
use chrono::Local;
use std::path::Path;

#[derive(Debug)]
pub struct BackupSummary {
    pub backup_id: String,
    pub backup_name: String,
    pub mirror: MirrorSummary,
}

/// Uploads `local_root` under a fresh folder at the Drive root.
///
/// Without an explicit name the folder is named `Backup_<timestamp>` at
/// second resolution; two backups within the same second simply produce two
/// folders with the same name. The mirrored tree keeps its own top-level
/// folder, so content lands at `Backup_<ts>/<basename>/...`.
pub fn backup<S: RemoteStore>(
    store: &S,
    local_root: &Path,
    name: Option<&str>,
) -> Result<BackupSummary> {
    // Validate before creating the backup folder so a bad path has no
    // remote side effects.
    if !local_root.is_dir() {
        return Err(Error::InvalidPath(local_root.to_path_buf()));
    }

    let backup_name = match name {
        Some(n) => n.to_string(),
        None => format!("Backup_{}", Local::now().format("%Y%m%d_%H%M%S")),
    };

    let folder = store.create_folder(&backup_name, ROOT_ID)?;
    let mirror = Mirror::new(store).mirror(local_root, &folder.id)?;

    Ok(BackupSummary {
        backup_id: folder.id,
        backup_name: folder.name,
        mirror,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::tests::{Call, MockStore, TempTree};

    #[test]
    fn default_name_is_timestamped() {
        let tree = TempTree::new("backup-ts");
        tree.file("a.txt", "a");

        let store = MockStore::default();
        let summary = backup(&store, &tree.root, None).unwrap();

        let ts = summary
            .backup_name
            .strip_prefix("Backup_")
            .expect("name should start with Backup_");
        assert_eq!(ts.len(), 15); // YYYYMMDD_HHMMSS
        assert!(ts[..8].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(&ts[8..9], "_");
        assert!(ts[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn explicit_name_is_used_verbatim() {
        let tree = TempTree::new("backup-named");
        tree.file("a.txt", "a");

        let store = MockStore::default();
        let summary = backup(&store, &tree.root, Some("weekly")).unwrap();
        assert_eq!(summary.backup_name, "weekly");
    }

    #[test]
    fn content_nests_under_the_backup_folder() {
        let tree = TempTree::new("backup-nesting");
        tree.file("notes.txt", "n");

        let store = MockStore::default();
        let summary = backup(&store, &tree.root, None).unwrap();

        let folders = store.folder_calls();
        // First the backup folder at the root, then the mirror root inside it.
        let Call::CreateFolder { id, parent_id, .. } = &folders[0] else {
            unreachable!()
        };
        assert_eq!(*id, summary.backup_id);
        assert_eq!(parent_id.as_str(), ROOT_ID);

        let Call::CreateFolder { id, parent_id, .. } = &folders[1] else {
            unreachable!()
        };
        assert_eq!(*id, summary.mirror.root_id);
        assert_eq!(*parent_id, summary.backup_id);
    }

    #[test]
    fn invalid_path_creates_no_backup_folder() {
        let store = MockStore::default();
        let err = backup(&store, Path::new("/no/such/directory"), None).unwrap_err();

        assert!(matches!(err, Error::InvalidPath(_)));
        assert!(store.calls.borrow().is_empty());
    }
}
