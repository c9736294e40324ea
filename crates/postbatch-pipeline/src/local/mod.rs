//! Local-filesystem adapters for the collaborator traits.
//!
//! File ids are `/`-separated paths relative to the storage root; the root
//! itself is `"."`. Dot-prefixed entries are internal and never listed.

mod run_log;
mod sheets;
mod store;

use std::path::{Path, PathBuf};

pub use run_log::CsvRunLogWriter;
pub use sheets::LocalSheets;
pub use store::LocalFileStore;

use crate::error::StoreError;

/// Id of the storage root.
pub const ROOT_ID: &str = ".";

/// Maps a file id onto a path under `root`, rejecting ids that could
/// escape it.
pub(crate) fn resolve_id(root: &Path, id: &str) -> Result<PathBuf, StoreError> {
    let trimmed = id.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed == ROOT_ID {
        return Ok(root.to_path_buf());
    }

    let mut path = root.to_path_buf();
    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        path.push(segment);
    }
    Ok(path)
}

/// Id of `name` inside folder `parent_id`.
pub(crate) fn child_id(parent_id: &str, name: &str) -> String {
    let parent = parent_id.trim().trim_matches('/');
    if parent.is_empty() || parent == ROOT_ID {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_resolve_below_root() {
        let root = Path::new("/srv/postbatch");
        assert_eq!(resolve_id(root, ".").unwrap(), root);
        assert_eq!(resolve_id(root, "").unwrap(), root);
        assert_eq!(
            resolve_id(root, "inbox/menu.csv").unwrap(),
            root.join("inbox").join("menu.csv")
        );
    }

    #[test]
    fn escaping_ids_are_rejected() {
        let root = Path::new("/srv/postbatch");
        for id in ["../etc/passwd", "inbox/../../x", "a//b", "a\\b"] {
            assert!(
                matches!(resolve_id(root, id), Err(StoreError::InvalidId(_))),
                "{id}"
            );
        }
    }

    #[test]
    fn child_ids_join_with_slash() {
        assert_eq!(child_id(".", "inbox"), "inbox");
        assert_eq!(child_id("inbox", "Processed"), "inbox/Processed");
    }
}
