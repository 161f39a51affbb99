use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::checkout;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::{GitletError, GitletResult};
use crate::hash::Oid;
use crate::index::{Stage, STAGE_FILE_NAME};
use crate::merge::{self, MergeResult};
use crate::obj::{Blob, Commit};
use crate::odb::ObjectStore;
use crate::refs::{Branches, BRANCHES_FILE_NAME};
use crate::status::{self, StatusReport};

pub const GITLET_DIR_NAME: &str = ".gitlet";
const OBJECTS_DIR_NAME: &str = "objects";

/// The per-invocation façade (§4.11, §9 "process-wide mutable state"): owns
/// the loaded branch registry, stage, and config, and is constructed fresh by
/// the CLI dispatcher for every command rather than living behind a
/// process-wide singleton.
pub struct Repository {
    workdir: PathBuf,
    gitlet_dir: PathBuf,
    store: ObjectStore,
    branches: Branches,
    stage: Stage,
    config: Config,
}

impl Repository {
    fn branches_path(gitlet_dir: &Path) -> PathBuf {
        gitlet_dir.join(BRANCHES_FILE_NAME)
    }

    fn stage_path(gitlet_dir: &Path) -> PathBuf {
        gitlet_dir.join(STAGE_FILE_NAME)
    }

    fn config_path(gitlet_dir: &Path) -> PathBuf {
        gitlet_dir.join(CONFIG_FILE_NAME)
    }

    /// `init`: creates `.gitlet/`, writes the initial commit, and registers it
    /// as `master`'s tip (§4.11, §6). A second `init` over an existing
    /// repository simply reopens it rather than re-creating the initial commit.
    pub fn init(workdir: impl Into<PathBuf>) -> GitletResult<Self> {
        let workdir = workdir.into();
        let gitlet_dir = workdir.join(GITLET_DIR_NAME);

        if gitlet_dir.exists() {
            return Self::discover(workdir);
        }

        std::fs::create_dir_all(gitlet_dir.join(OBJECTS_DIR_NAME))?;
        let store = ObjectStore::new(gitlet_dir.join(OBJECTS_DIR_NAME));
        let initial = Commit::initial();
        store.write(&initial)?;

        let branches = Branches::init(initial.id());
        let mut stage = Stage::default();
        stage.update(&initial);
        let config = Config::default();

        branches.save(&Self::branches_path(&gitlet_dir))?;
        stage.save(&Self::stage_path(&gitlet_dir))?;
        config.save(&Self::config_path(&gitlet_dir))?;

        Ok(Self { workdir, gitlet_dir, store, branches, stage, config })
    }

    /// every non-`init` command discovers `.gitlet` at the working directory
    /// root (§4.11) — no upward search, since sub-directory tracking is out
    /// of scope.
    pub fn discover(workdir: impl Into<PathBuf>) -> GitletResult<Self> {
        let workdir = workdir.into();
        let gitlet_dir = workdir.join(GITLET_DIR_NAME);
        if !gitlet_dir.is_dir() {
            bail!(GitletError::NotARepo);
        }

        let store = ObjectStore::new(gitlet_dir.join(OBJECTS_DIR_NAME));
        let branches = Branches::load(&Self::branches_path(&gitlet_dir))?;
        let stage = Stage::load(&Self::stage_path(&gitlet_dir))?;
        let config = Config::load(&Self::config_path(&gitlet_dir))?;

        Ok(Self { workdir, gitlet_dir, store, branches, stage, config })
    }

    fn save_branches(&self) -> GitletResult<()> {
        self.branches.save(&Self::branches_path(&self.gitlet_dir))
    }

    fn save_stage(&self) -> GitletResult<()> {
        self.stage.save(&Self::stage_path(&self.gitlet_dir))
    }

    fn save_config(&self) -> GitletResult<()> {
        self.config.save(&Self::config_path(&self.gitlet_dir))
    }

    pub fn head_commit(&self) -> GitletResult<Commit> {
        self.store.read_commit(self.branches.head)
    }

    /// `add <file>` (§4.8).
    pub fn add(&mut self, name: &str) -> GitletResult<()> {
        let path = self.workdir.join(name);
        let bytes = std::fs::read(&path).map_err(|_| GitletError::FileDoesNotExist)?;
        let blob = Blob::new(name, bytes);
        self.store.write(&blob)?;
        self.stage.put(name, blob.id());
        self.save_stage()
    }

    /// `rm <file>` (§4.8). Unstaging is unconditional even when the stage was
    /// already clean (§9 open question 3, mirrored faithfully).
    pub fn rm(&mut self, name: &str) -> GitletResult<()> {
        let head = self.head_commit()?;
        let staged = self.stage.contains(name);
        let tracked = head.tree.contains_key(name);
        if !staged && !tracked {
            bail!(GitletError::NoReasonToRemove);
        }
        self.stage.remove(name);
        if tracked {
            let _ = std::fs::remove_file(self.workdir.join(name));
        }
        self.save_stage()
    }

    /// `commit <msg>` (§4.4).
    pub fn commit(&mut self, message: impl Into<String>) -> GitletResult<Oid> {
        let message = message.into();
        if message.is_empty() {
            bail!(GitletError::EmptyCommitMessage);
        }
        let head = self.head_commit()?;
        if self.stage.tree == head.tree {
            bail!(GitletError::NoChangesAdded);
        }
        let commit = Commit::new(message, vec![head.id()], self.stage.tree.clone())?;
        self.store.write(&commit)?;
        self.branches.advance_current(commit.id());
        self.save_branches()?;
        Ok(commit.id())
    }

    /// `branch <name>` (§4.7).
    pub fn branch(&mut self, name: &str) -> GitletResult<()> {
        if self.branches.contains(name) {
            bail!(GitletError::BranchAlreadyExists(name.to_owned()));
        }
        self.branches.put(name, self.branches.head);
        self.save_branches()
    }

    /// `rm-branch <name>` (§4.7).
    pub fn rm_branch(&mut self, name: &str) -> GitletResult<()> {
        self.branches.remove(name)?;
        self.save_branches()
    }

    /// `checkout -- <file>` (§4.8 variant 1).
    pub fn checkout_head_file(&mut self, name: &str) -> GitletResult<()> {
        let head = self.head_commit()?;
        checkout::checkout_head_file(&self.store, &head, &self.workdir, name)
    }

    /// `checkout <commit-id> -- <file>` (§4.8 variant 2).
    pub fn checkout_commit_file(&mut self, id_str: &str, name: &str) -> GitletResult<()> {
        let id = self.store.resolve(id_str)?;
        checkout::checkout_commit_file(&self.store, id, &self.workdir, name)
    }

    /// `checkout <branch>` (§4.8 variant 3).
    pub fn checkout_branch(&mut self, branch_name: &str) -> GitletResult<()> {
        let head = self.head_commit()?;
        checkout::checkout_branch(
            &self.store,
            &mut self.branches,
            &mut self.stage,
            &self.workdir,
            &head,
            branch_name,
        )?;
        self.save_branches()?;
        self.save_stage()
    }

    /// `reset <commit-id>` (§4.8).
    pub fn reset(&mut self, id_str: &str) -> GitletResult<()> {
        let head = self.head_commit()?;
        let target_id = self.store.resolve(id_str)?;
        checkout::reset(&self.store, &mut self.branches, &mut self.stage, &self.workdir, &head, target_id)?;
        self.save_branches()?;
        self.save_stage()
    }

    /// `merge <branch>` (§4.9).
    pub fn merge(&mut self, branch_name: &str) -> GitletResult<MergeResult> {
        let head = self.head_commit()?;
        let result = merge::merge(
            &self.store,
            &mut self.branches,
            &mut self.stage,
            &self.workdir,
            &head,
            branch_name,
        )?;
        self.save_branches()?;
        self.save_stage()?;
        Ok(result)
    }

    /// `log`: walks HEAD along the first-parent chain only (§4.10).
    pub fn log(&self) -> GitletResult<Vec<Commit>> {
        let mut commits = Vec::new();
        let mut current = Some(self.branches.head);
        while let Some(id) = current {
            let commit = self.store.read_commit(id)?;
            current = commit.first_parent();
            commits.push(commit);
        }
        Ok(commits)
    }

    /// `global-log`: every commit in the object store, unordered (§4.10).
    pub fn global_log(&self) -> GitletResult<Vec<Commit>> {
        self.store.all_commit_ids()?.into_iter().map(|id| self.store.read_commit(id)).collect()
    }

    /// `find <msg>` (§4.10).
    pub fn find(&self, message: &str) -> GitletResult<Vec<Oid>> {
        let mut ids: Vec<Oid> = self
            .global_log()?
            .into_iter()
            .filter(|commit| commit.message == message)
            .map(|commit| commit.id())
            .collect();
        if ids.is_empty() {
            bail!(GitletError::NoSuchCommitMessage);
        }
        ids.sort();
        Ok(ids)
    }

    /// `status` (§4.10).
    pub fn status(&self) -> GitletResult<StatusReport> {
        let head = self.head_commit()?;
        status::status(&self.branches, &self.stage, &head, &self.workdir)
    }

    pub fn config_get(&self, key: &str) -> Option<&str> {
        self.config.get(key)
    }

    pub fn config_set(&mut self, key: &str, value: &str) -> GitletResult<()> {
        self.config.set(key.to_owned(), value.to_owned());
        self.save_config()
    }

    #[cfg(test)]
    pub fn tree(&self) -> &BTreeMap<String, Oid> {
        &self.stage.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_repo_with_master_and_initial_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert_eq!(repo.branches.current, "master");
        let head = repo.head_commit().unwrap();
        assert_eq!(head.message, "initial commit");
    }

    #[test]
    fn discover_without_init_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Repository::discover(dir.path()).is_err());
    }

    #[test]
    fn add_commit_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        repo.add("a.txt").unwrap();
        repo.commit("one").unwrap();
        let head = repo.head_commit().unwrap();
        assert!(head.tree.contains_key("a.txt"));
        assert_eq!(repo.tree(), &head.tree);
    }

    #[test]
    fn commit_with_no_staged_changes_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert!(repo.commit("nothing changed").is_err());
    }

    #[test]
    fn add_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert!(repo.add("nope.txt").is_err());
    }

    #[test]
    fn branch_and_checkout_switches_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        repo.branch("dev").unwrap();
        repo.checkout_branch("dev").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"dev content").unwrap();
        repo.add("b.txt").unwrap();
        repo.commit("two").unwrap();
        repo.checkout_branch("master").unwrap();
        assert!(!dir.path().join("b.txt").exists());
    }

    #[test]
    fn find_returns_matching_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let ids = repo.find("initial commit").unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn find_missing_message_errors() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(repo.find("no such message").is_err());
    }

    #[test]
    fn log_walks_first_parent_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        repo.add("a.txt").unwrap();
        repo.commit("one").unwrap();
        let log = repo.log().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "one");
        assert_eq!(log[1].message, "initial commit");
    }
}
