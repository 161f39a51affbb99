use crate::error::GitletResult;
use std::fs;
use std::path::Path;

/// Writes `contents` to `path` atomically with respect to process termination:
/// the new contents land in a sibling `.lock` file first and are only moved
/// into place with a single `rename`, so a crash mid-write leaves the previous
/// version of `path` intact (§5, §4.7 "all mutating operations persist
/// atomically"). This mirrors the reference implementation's lockfile, pared
/// down to the single-writer case this system assumes (no contention checks).
pub fn write_atomic(path: &Path, contents: &[u8]) -> GitletResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let lock_path = path.with_extension("lock");
    fs::write(&lock_path, contents)?;
    fs::rename(&lock_path, path)?;
    Ok(())
}
