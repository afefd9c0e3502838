//! Discovery of module manifests in an addons tree.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// File name that marks a directory as a module.
pub const MANIFEST_FILE_NAME: &str = "__manifest__.py";

/// Finds every manifest file below `root`, recursively.
///
/// Directories that cannot be read are skipped. The walk is sorted by file
/// name, so the same tree always yields the same order.
pub fn find_manifest_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            !entry.file_type().is_dir() && entry.file_name() == MANIFEST_FILE_NAME
        })
        .map(|entry| entry.into_path())
        .inspect(|path| debug!("Found manifest {}", path.display()))
        .collect()
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        ".git" | "__pycache__" | "node_modules" | ".tox" | ".venv"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_finds_nested_manifests() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sale/__manifest__.py");
        touch(dir.path(), "enterprise/helpdesk/__manifest__.py");
        touch(dir.path(), "sale/models/sale_order.py");

        let found = find_manifest_files(dir.path());

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.ends_with(MANIFEST_FILE_NAME)));
        assert!(found.contains(&dir.path().join("sale/__manifest__.py")));
    }

    #[test]
    fn test_sorted_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "zeta/__manifest__.py");
        touch(dir.path(), "alpha/__manifest__.py");
        touch(dir.path(), "mid/__manifest__.py");

        let found = find_manifest_files(dir.path());
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.parent()?.file_name()?.to_str())
            .collect();

        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_skips_ignored_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".git/hooks/__manifest__.py");
        touch(dir.path(), "web/__pycache__/__manifest__.py");
        touch(dir.path(), "web/__manifest__.py");

        let found = find_manifest_files(dir.path());
        assert_eq!(found, vec![dir.path().join("web/__manifest__.py")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let found = find_manifest_files(&dir.path().join("does-not-exist"));
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "account/__manifest__.py");
        touch(dir.path(), "locked/inner/__manifest__.py");
        touch(dir.path(), "sale/__manifest__.py");

        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not apply to root.
        let enforced = fs::read_dir(&locked).is_err();

        let found = find_manifest_files(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(found.contains(&dir.path().join("account/__manifest__.py")));
        assert!(found.contains(&dir.path().join("sale/__manifest__.py")));
        if enforced {
            assert_eq!(found.len(), 2);
        }
    }
}
