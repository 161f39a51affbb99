use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{GitletError, GitletResult};
use crate::fs::workdir_files;
use crate::hash::Oid;
use crate::index::Stage;
use crate::obj::Commit;
use crate::odb::ObjectStore;
use crate::refs::Branches;

/// restores `name` from `commit`'s tree into `workdir`, unconditionally
/// overwriting whatever is there (§4.8 variants 1 & 2 share this core).
fn restore_file(store: &ObjectStore, commit: &Commit, workdir: &Path, name: &str) -> GitletResult<()> {
    let id = commit.tree.get(name).ok_or(GitletError::FileDoesNotExist)?;
    let blob = store.read_blob(*id)?;
    blob.recover(workdir)
}

/// `checkout -- <file>`: restore `name` from HEAD.
pub fn checkout_head_file(
    store: &ObjectStore,
    head: &Commit,
    workdir: &Path,
    name: &str,
) -> GitletResult<()> {
    restore_file(store, head, workdir, name)
}

/// `checkout <commit-id> -- <file>`: restore `name` from an arbitrary commit.
pub fn checkout_commit_file(
    store: &ObjectStore,
    commit_id: Oid,
    workdir: &Path,
    name: &str,
) -> GitletResult<()> {
    let commit = store.read_commit(commit_id)?;
    restore_file(store, &commit, workdir, name)
}

/// aborts with the untracked-overwrite diagnostic if any file on disk would be
/// silently clobbered by materialising `target` (§4.8 "Untracked-overwrite check").
pub fn check_untracked_overwrite(
    workdir: &Path,
    current_tree: &BTreeMap<String, Oid>,
    target_tree: &BTreeMap<String, Oid>,
) -> GitletResult<()> {
    for name in workdir_files(workdir)? {
        if !current_tree.contains_key(&name) && target_tree.contains_key(&name) {
            bail!(GitletError::UntrackedOverwrite);
        }
    }
    Ok(())
}

/// deletes every flat file in `workdir`, then writes every blob in `tree`,
/// the "blow away and rematerialise" step shared by branch-checkout and reset.
fn replace_workdir(store: &ObjectStore, workdir: &Path, tree: &BTreeMap<String, Oid>) -> GitletResult<()> {
    for name in workdir_files(workdir)? {
        std::fs::remove_file(workdir.join(name))?;
    }
    for (name, &id) in tree {
        let blob = store.read_blob(id)?;
        debug_assert_eq!(&blob.name, name);
        blob.recover(workdir)?;
    }
    Ok(())
}

/// `checkout <branch>`: switches branches, rewriting the working tree and the
/// stage to match the target tip (§4.8 variant 3).
pub fn checkout_branch(
    store: &ObjectStore,
    branches: &mut Branches,
    stage: &mut Stage,
    workdir: &Path,
    current: &Commit,
    branch_name: &str,
) -> GitletResult<()> {
    if !branches.contains(branch_name) {
        bail!(GitletError::NoSuchBranch(branch_name.to_owned()));
    }
    if branch_name == branches.current {
        bail!(GitletError::AlreadyOnBranch);
    }

    let target_id = branches.tips[branch_name];
    let target = store.read_commit(target_id)?;
    log::debug!("checkout: migrating {} -> {} ({:#})", branches.current, branch_name, target_id);

    check_untracked_overwrite(workdir, &current.tree, &target.tree)?;
    replace_workdir(store, workdir, &target.tree)?;
    stage.update(&target);
    branches.switch(branch_name)?;
    Ok(())
}

/// `reset <commit-id>`: as branch-checkout, but targets an arbitrary commit and
/// moves the CURRENT branch's tip (§4.8).
pub fn reset(
    store: &ObjectStore,
    branches: &mut Branches,
    stage: &mut Stage,
    workdir: &Path,
    current: &Commit,
    target_id: Oid,
) -> GitletResult<()> {
    let target = store.read_commit(target_id)?;

    check_untracked_overwrite(workdir, &current.tree, &target.tree)?;
    replace_workdir(store, workdir, &target.tree)?;
    stage.update(&target);
    branches.advance_current(target_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::Blob;

    fn store_and_commit(dir: &Path, files: &[(&str, &str)]) -> (ObjectStore, Commit) {
        let store = ObjectStore::new(dir.join("objects"));
        let mut tree = BTreeMap::new();
        for &(name, contents) in files {
            let blob = Blob::new(name, contents.as_bytes().to_vec());
            store.write(&blob).unwrap();
            tree.insert(name.to_owned(), blob.id());
        }
        let commit = Commit::new("msg".to_owned(), vec![], tree).unwrap();
        store.write(&commit).unwrap();
        (store, commit)
    }

    #[test]
    fn checkout_head_file_restores_content() {
        let dir = tempfile::tempdir().unwrap();
        let (store, commit) = store_and_commit(dir.path(), &[("a.txt", "hello")]);
        checkout_head_file(&store, &commit, dir.path(), "a.txt").unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
    }

    #[test]
    fn checkout_head_file_missing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (store, commit) = store_and_commit(dir.path(), &[]);
        assert!(checkout_head_file(&store, &commit, dir.path(), "nope.txt").is_err());
    }

    #[test]
    fn untracked_overwrite_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), b"unrelated").unwrap();
        let mut target = BTreeMap::new();
        target.insert("x.txt".to_owned(), Oid::from("a".repeat(40).as_str()));
        let current = BTreeMap::new();
        assert!(check_untracked_overwrite(dir.path(), &current, &target).is_err());
    }

    #[test]
    fn untracked_check_allows_file_already_tracked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), b"unrelated").unwrap();
        let mut target = BTreeMap::new();
        let id = Oid::from("a".repeat(40).as_str());
        target.insert("x.txt".to_owned(), id);
        let mut current = BTreeMap::new();
        current.insert("x.txt".to_owned(), id);
        check_untracked_overwrite(dir.path(), &current, &target).unwrap();
    }

    #[test]
    fn checkout_branch_switches_and_rewrites_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let (store, initial) = store_and_commit(dir.path(), &[]);
        let mut branches = Branches::init(initial.id());
        let mut stage = Stage::default();
        stage.update(&initial);

        let blob = Blob::new("b.txt", b"dev content".to_vec());
        store.write(&blob).unwrap();
        let mut dev_tree = BTreeMap::new();
        dev_tree.insert("b.txt".to_owned(), blob.id());
        let dev_commit = Commit::new("dev commit".to_owned(), vec![initial.id()], dev_tree).unwrap();
        store.write(&dev_commit).unwrap();
        branches.put("dev", dev_commit.id());

        checkout_branch(&store, &mut branches, &mut stage, dir.path(), &initial, "dev").unwrap();
        assert_eq!(branches.current, "dev");
        assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), "dev content");
        branches.check_invariant();
    }

    #[test]
    fn checkout_unknown_branch_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (store, initial) = store_and_commit(dir.path(), &[]);
        let mut branches = Branches::init(initial.id());
        let mut stage = Stage::default();
        assert!(checkout_branch(&store, &mut branches, &mut stage, dir.path(), &initial, "nope").is_err());
    }
}
