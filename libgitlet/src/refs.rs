use crate::error::{GitletError, GitletResult};
use crate::hash::Oid;
use crate::lockfile::write_atomic;
use std::collections::BTreeMap;
use std::path::Path;

pub const BRANCHES_FILE_NAME: &str = "branches";
pub const DEFAULT_BRANCH: &str = "master";

/// Named tips + HEAD (§3, §4.7). `tips[current] == head` is a hard invariant
/// maintained by every mutating method and re-checked by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branches {
    pub tips: BTreeMap<String, Oid>,
    pub current: String,
    pub head: Oid,
}

impl Branches {
    pub fn init(initial_commit: Oid) -> Self {
        let mut tips = BTreeMap::new();
        tips.insert(DEFAULT_BRANCH.to_owned(), initial_commit);
        Self { tips, current: DEFAULT_BRANCH.to_owned(), head: initial_commit }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tips.contains_key(name)
    }

    pub fn put(&mut self, name: impl Into<String>, id: Oid) {
        self.tips.insert(name.into(), id);
    }

    /// `rm-branch`; the current branch can never be removed (§3 "Lifecycle")
    pub fn remove(&mut self, name: &str) -> GitletResult<()> {
        if name == self.current {
            bail!(GitletError::CannotRemoveCurrentBranch);
        }
        if self.tips.remove(name).is_none() {
            bail!(GitletError::NoSuchBranch(name.to_owned()));
        }
        Ok(())
    }

    /// sets `current` and `head` to `tips[name]`
    pub fn switch(&mut self, name: &str) -> GitletResult<()> {
        let id = *self.tips.get(name).ok_or_else(|| anyhow!("no such branch `{}`", name))?;
        self.current = name.to_owned();
        self.head = id;
        Ok(())
    }

    /// advances the current branch's tip (and HEAD) to `id`, used by `commit`,
    /// fast-forward checkout, `reset`, and `merge`
    pub fn advance_current(&mut self, id: Oid) {
        self.tips.insert(self.current.clone(), id);
        self.head = id;
    }

    pub fn load(path: &Path) -> GitletResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut lines = contents.lines();
        let current = lines
            .next()
            .ok_or_else(|| anyhow!("corrupt branches file: missing current branch"))?
            .to_owned();
        let head: Oid = lines
            .next()
            .ok_or_else(|| anyhow!("corrupt branches file: missing head"))?
            .parse()?;
        let mut tips = BTreeMap::new();
        for line in lines {
            let (name, id) = line
                .split_once(' ')
                .ok_or_else(|| anyhow!("corrupt branches file: malformed line `{}`", line))?;
            tips.insert(name.to_owned(), id.parse()?);
        }
        Ok(Self { tips, current, head })
    }

    pub fn save(&self, path: &Path) -> GitletResult<()> {
        let mut contents = format!("{}\n{}\n", self.current, self.head);
        for (name, id) in &self.tips {
            contents.push_str(&format!("{} {}\n", name, id));
        }
        write_atomic(path, contents.as_bytes())
    }

    #[cfg(test)]
    pub fn check_invariant(&self) {
        assert_eq!(self.tips.get(&self.current).copied(), Some(self.head));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_master_pointing_at_initial_commit() {
        let id = Oid::from("a".repeat(40).as_str());
        let branches = Branches::init(id);
        assert_eq!(branches.current, "master");
        assert_eq!(branches.head, id);
        assert_eq!(branches.tips["master"], id);
    }

    #[test]
    fn switch_updates_current_and_head() {
        let a = Oid::from("a".repeat(40).as_str());
        let b = Oid::from("b".repeat(40).as_str());
        let mut branches = Branches::init(a);
        branches.put("dev", b);
        branches.switch("dev").unwrap();
        assert_eq!(branches.current, "dev");
        assert_eq!(branches.head, b);
        branches.check_invariant();
    }

    #[test]
    fn cannot_remove_current_branch() {
        let a = Oid::from("a".repeat(40).as_str());
        let mut branches = Branches::init(a);
        assert!(branches.remove("master").is_err());
    }

    #[test]
    fn remove_unknown_branch_errors() {
        let a = Oid::from("a".repeat(40).as_str());
        let mut branches = Branches::init(a);
        assert!(branches.remove("nope").is_err());
    }

    #[test]
    fn advance_current_moves_only_current_tip() {
        let a = Oid::from("a".repeat(40).as_str());
        let b = Oid::from("b".repeat(40).as_str());
        let c = Oid::from("c".repeat(40).as_str());
        let mut branches = Branches::init(a);
        branches.put("dev", b);
        branches.advance_current(c);
        assert_eq!(branches.head, c);
        assert_eq!(branches.tips["master"], c);
        assert_eq!(branches.tips["dev"], b);
        branches.check_invariant();
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branches");
        let a = Oid::from("a".repeat(40).as_str());
        let b = Oid::from("b".repeat(40).as_str());
        let mut branches = Branches::init(a);
        branches.put("dev", b);
        branches.save(&path).unwrap();
        let loaded = Branches::load(&path).unwrap();
        assert_eq!(loaded, branches);
    }
}
