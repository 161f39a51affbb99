use std::collections::BTreeSet;
use std::path::Path;

use crate::error::GitletResult;
use crate::repo::GITLET_DIR_NAME;

/// Names of the regular files directly inside `workdir`, excluding the
/// repository's own control directory. The system explicitly does not track
/// subdirectories (§2 Non-goals), so this is the entire universe of
/// trackable paths — no recursive walk needed, unlike the reference
/// implementation's `walkdir`-based traversal.
pub fn workdir_files(workdir: &Path) -> GitletResult<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(workdir)? {
        let entry = entry?;
        if entry.file_name() == GITLET_DIR_NAME {
            continue;
        }
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_owned());
            }
        }
    }
    Ok(names)
}
