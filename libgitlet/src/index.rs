use crate::error::GitletResult;
use crate::hash::Oid;
use crate::lockfile::write_atomic;
use crate::obj::Commit;
use std::collections::BTreeMap;
use std::path::Path;

pub const STAGE_FILE_NAME: &str = "stage";

/// The mutable write buffer between the working directory and commits (§4.6).
/// Sorted by filepath so iteration for `status` is deterministic and
/// lexicographic, matching the reference implementation's index entry
/// ordering convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub tree: BTreeMap<String, Oid>,
}

impl Stage {
    pub fn put(&mut self, name: impl Into<String>, id: Oid) {
        self.tree.insert(name.into(), id);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.tree.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tree.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Oid> {
        self.tree.get(name).copied()
    }

    /// replaces the whole tree with the commit's tree, the post-condition
    /// `stage.tree == head_commit.tree` required after `commit`/`checkout`/
    /// `reset`/`merge` (§3 invariant 4)
    pub fn update(&mut self, commit: &Commit) {
        self.tree = commit.tree.clone();
    }

    /// `true` if `tree != commit.tree` OR any working-tree file that is staged
    /// has different content on disk OR any tracked file is missing from disk
    /// (§4.6) — merge's preflight "uncommitted changes" check.
    pub fn diff_vs(&self, commit: &Commit, workdir: &Path) -> GitletResult<bool> {
        if self.tree != commit.tree {
            return Ok(true);
        }
        for (name, &id) in &self.tree {
            let path = workdir.join(name);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let blob = crate::obj::Blob::new(name.clone(), bytes);
                    if blob.id() != id {
                        return Ok(true);
                    }
                }
                Err(..) => return Ok(true),
            }
        }
        Ok(false)
    }

    pub fn load(path: &Path) -> GitletResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut tree = BTreeMap::new();
        for line in contents.lines() {
            let (id, name) = line
                .split_once(' ')
                .ok_or_else(|| anyhow!("corrupt stage file: malformed line `{}`", line))?;
            tree.insert(name.to_owned(), id.parse()?);
        }
        Ok(Self { tree })
    }

    pub fn save(&self, path: &Path) -> GitletResult<()> {
        let mut contents = String::new();
        for (name, id) in &self.tree {
            contents.push_str(&format!("{} {}\n", id, name));
        }
        write_atomic(path, contents.as_bytes())
    }
}
