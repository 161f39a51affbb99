use std::fmt::{self, Display, Formatter};
use std::path::Path;

use crate::error::GitletResult;
use crate::fs::workdir_files;
use crate::index::Stage;
use crate::obj::{Blob, Commit};
use crate::refs::Branches;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationKind {
    Modified,
    Deleted,
}

impl Display for ModificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ModificationKind::Modified => write!(f, "(modified)"),
            ModificationKind::Deleted => write!(f, "(deleted)"),
        }
    }
}

/// the five-section snapshot printed by `status` (§4.10). Every list is
/// already lexicographic because it is built from `BTreeMap`/`BTreeSet` keys.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub current_branch: String,
    pub branches: Vec<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub modifications: Vec<(String, ModificationKind)>,
    pub untracked: Vec<String>,
}

pub fn status(branches: &Branches, stage: &Stage, head: &Commit, workdir: &Path) -> GitletResult<StatusReport> {
    let branch_names = branches.tips.keys().cloned().collect();

    let mut staged = Vec::new();
    let mut modifications = Vec::new();
    for (name, &id) in &stage.tree {
        let unchanged_from_head = head.tree.get(name) == Some(&id);
        if unchanged_from_head {
            match std::fs::read(workdir.join(name)) {
                Err(..) => modifications.push((name.clone(), ModificationKind::Deleted)),
                Ok(bytes) => {
                    let current_id = Blob::new(name.clone(), bytes).id();
                    if current_id != id {
                        modifications.push((name.clone(), ModificationKind::Modified));
                    }
                }
            }
        } else {
            // staged blob differs from HEAD's: "Staged" only if the working copy
            // still matches what is staged (§4.10 "Staged Files")
            if let Ok(bytes) = std::fs::read(workdir.join(name)) {
                if Blob::new(name.clone(), bytes).id() == id {
                    staged.push(name.clone());
                }
            }
        }
    }

    let present = workdir_files(workdir)?;

    let mut removed = Vec::new();
    for name in head.tree.keys() {
        if !stage.contains(name) && !present.contains(name) {
            removed.push(name.clone());
        }
    }

    // a HEAD-tracked name that the stage no longer tracks but that is still
    // present on disk falls here rather than into Removed (§9 open question 4).
    let mut untracked = Vec::new();
    for name in &present {
        if !stage.contains(name) {
            untracked.push(name.clone());
        }
    }

    Ok(StatusReport {
        current_branch: branches.current.clone(),
        branches: branch_names,
        staged,
        removed,
        modifications,
        untracked,
    })
}

impl Display for StatusReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for name in &self.branches {
            if *name == self.current_branch {
                writeln!(f, "*{}", name)?;
            } else {
                writeln!(f, "{}", name)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "=== Staged Files ===")?;
        for name in &self.staged {
            writeln!(f, "{}", name)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Removed Files ===")?;
        for name in &self.removed {
            writeln!(f, "{}", name)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (name, kind) in &self.modifications {
            writeln!(f, "{} {}", name, kind)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Untracked Files ===")?;
        for name in &self.untracked {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}
