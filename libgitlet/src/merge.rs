use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::checkout::{check_untracked_overwrite, checkout_branch};
use crate::error::{GitletError, GitletResult};
use crate::graph::split_point;
use crate::hash::Oid;
use crate::index::Stage;
use crate::obj::{Blob, Commit};
use crate::odb::ObjectStore;
use crate::refs::Branches;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    /// preflight detected a fast-forward; `checkout <branch>` was run instead
    FastForward,
    /// the merge produced a new commit; `conflict` is true if any file hit case 8
    Merged { conflict: bool },
}

struct MergeOutcome {
    any_fired: bool,
    any_conflict: bool,
}

/// builds the conflict-artifact bytes for a divergently-changed file (§4.9
/// "Conflict artifact"): HEAD's content (or nothing) between the markers,
/// then the target's.
fn conflict_bytes(store: &ObjectStore, current: Option<Oid>, target: Option<Oid>) -> GitletResult<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"<<<<<<< HEAD\n");
    if let Some(id) = current {
        bytes.extend_from_slice(&store.read_blob(id)?.bytes);
    }
    bytes.extend_from_slice(b"=======\n");
    if let Some(id) = target {
        bytes.extend_from_slice(&store.read_blob(id)?.bytes);
    }
    bytes.extend_from_slice(b">>>>>>>\n");
    Ok(bytes)
}

/// the per-file eight-case classification table (§4.9), applied to every name
/// appearing in any of the three trees, in lexicographic order.
fn merge_trees(
    store: &ObjectStore,
    stage: &mut Stage,
    workdir: &Path,
    split: &BTreeMap<String, Oid>,
    current: &BTreeMap<String, Oid>,
    target: &BTreeMap<String, Oid>,
) -> GitletResult<MergeOutcome> {
    let mut names: BTreeSet<&String> = BTreeSet::new();
    names.extend(split.keys());
    names.extend(current.keys());
    names.extend(target.keys());

    let mut any_fired = false;
    let mut any_conflict = false;

    for name in names {
        let s = split.get(name).copied();
        let c = current.get(name).copied();
        let t = target.get(name).copied();

        let eq_cs = c == s;
        let eq_ts = t == s;
        let eq_ct = c == t;

        if eq_cs && !eq_ts && t.is_some() {
            // case 1: modified only in target
            let blob = store.read_blob(t.unwrap())?;
            blob.recover(workdir)?;
            stage.put(name.clone(), t.unwrap());
            any_fired = true;
        } else if !eq_cs && eq_ts && c.is_some() {
            // case 2: modified only in current, already on disk
            stage.put(name.clone(), c.unwrap());
            any_fired = true;
        } else if !eq_cs && !eq_ts && eq_ct && c.is_some() {
            // case 3: same change on both sides
            stage.put(name.clone(), c.unwrap());
            any_fired = true;
        } else if s.is_none() && c.is_some() && t.is_none() {
            // case 4: added only in current
            stage.put(name.clone(), c.unwrap());
            any_fired = true;
        } else if s.is_none() && c.is_none() && t.is_some() {
            // case 5: added only in target
            let blob = store.read_blob(t.unwrap())?;
            blob.recover(workdir)?;
            stage.put(name.clone(), t.unwrap());
            any_fired = true;
        } else if s.is_some() && eq_cs && t.is_none() {
            // case 6: removed only in target
            let _ = std::fs::remove_file(workdir.join(name));
            stage.remove(name);
            any_fired = true;
        } else if s.is_some() && eq_ts && c.is_none() {
            // case 7: removed only in current, stays absent
            stage.remove(name);
            any_fired = true;
        } else if !eq_ct {
            // case 8: divergent change
            log::trace!("merge case 8 (conflict) fired for `{}`", name);
            let bytes = conflict_bytes(store, c, t)?;
            let blob = Blob::new(name.clone(), bytes);
            blob.recover(workdir)?;
            store.write(&blob)?;
            stage.put(name.clone(), blob.id());
            any_fired = true;
            any_conflict = true;
        }
    }

    log::debug!("merge: any_fired={} any_conflict={}", any_fired, any_conflict);
    Ok(MergeOutcome { any_fired, any_conflict })
}

/// `merge <branch>`: preflight checks in order, then the three-way merge
/// (§4.9). Every bail! below happens before any blob is written for the
/// merge outcome, so a rejected merge leaves the repository untouched.
pub fn merge(
    store: &ObjectStore,
    branches: &mut Branches,
    stage: &mut Stage,
    workdir: &Path,
    current: &Commit,
    branch_name: &str,
) -> GitletResult<MergeResult> {
    if branch_name == branches.current {
        bail!(GitletError::MergeSelf);
    }
    if !branches.contains(branch_name) {
        bail!(GitletError::NoSuchBranch(branch_name.to_owned()));
    }
    if stage.diff_vs(current, workdir)? {
        bail!(GitletError::UncommittedChanges);
    }

    let target_id = branches.tips[branch_name];
    let target = store.read_commit(target_id)?;
    let split_id = split_point(store, current.id(), target_id)?;

    if split_id == target_id {
        bail!(GitletError::MergeAncestor);
    }
    if split_id == current.id() {
        checkout_branch(store, branches, stage, workdir, current, branch_name)?;
        return Ok(MergeResult::FastForward);
    }

    check_untracked_overwrite(workdir, &current.tree, &target.tree)?;

    let split = store.read_commit(split_id)?;
    let outcome = merge_trees(store, stage, workdir, &split.tree, &current.tree, &target.tree)?;
    if !outcome.any_fired {
        bail!(GitletError::NoMergeChanges);
    }

    let message = format!("Merged {} into {}.", branch_name, branches.current);
    let commit = Commit::new(message, vec![current.id(), target_id], stage.tree.clone())?;
    store.write(&commit)?;
    branches.advance_current(commit.id());

    Ok(MergeResult::Merged { conflict: outcome.any_conflict })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(store: &ObjectStore, name: &str, contents: &str) -> Oid {
        let blob = Blob::new(name, contents.as_bytes().to_vec());
        store.write(&blob).unwrap()
    }

    fn commit(store: &ObjectStore, message: &str, parents: Vec<Oid>, tree: BTreeMap<String, Oid>) -> Commit {
        let commit = Commit::new(message.to_owned(), parents, tree).unwrap();
        store.write(&commit).unwrap();
        commit
    }

    #[test]
    fn merging_self_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        let initial = commit(&store, "initial commit", vec![], BTreeMap::new());
        let mut branches = Branches::init(initial.id());
        let mut stage = Stage::default();
        stage.update(&initial);
        assert!(merge(&store, &mut branches, &mut stage, dir.path(), &initial, "master").is_err());
    }

    #[test]
    fn fast_forward_merge_moves_tip_without_merge_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        let initial = commit(&store, "initial commit", vec![], BTreeMap::new());
        let mut tree = BTreeMap::new();
        tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "hi"));
        let dev_commit = commit(&store, "dev commit", vec![initial.id()], tree);

        let mut branches = Branches::init(initial.id());
        branches.put("dev", dev_commit.id());
        let mut stage = Stage::default();
        stage.update(&initial);

        let result = merge(&store, &mut branches, &mut stage, dir.path(), &initial, "dev").unwrap();
        assert_eq!(result, MergeResult::FastForward);
        assert_eq!(branches.head, dev_commit.id());
    }

    #[test]
    fn ancestor_merge_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        let initial = commit(&store, "initial commit", vec![], BTreeMap::new());
        let mut tree = BTreeMap::new();
        tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "hi"));
        let ahead = commit(&store, "ahead", vec![initial.id()], tree);

        let mut branches = Branches::init(ahead.id());
        branches.put("dev", initial.id());
        let mut stage = Stage::default();
        stage.update(&ahead);

        assert!(merge(&store, &mut branches, &mut stage, dir.path(), &ahead, "dev").is_err());
    }

    #[test]
    fn divergent_change_produces_conflict_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));

        let mut base_tree = BTreeMap::new();
        base_tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "A"));
        let base = commit(&store, "base", vec![], base_tree);

        let mut current_tree = BTreeMap::new();
        current_tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "C"));
        let current = commit(&store, "current edit", vec![base.id()], current_tree.clone());

        let mut target_tree = BTreeMap::new();
        target_tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "B"));
        let target = commit(&store, "target edit", vec![base.id()], target_tree);

        let mut branches = Branches::init(current.id());
        branches.put("dev", target.id());
        let mut stage = Stage::default();
        stage.update(&current);
        std::fs::write(dir.path().join("a.txt"), "C").unwrap();

        let result = merge(&store, &mut branches, &mut stage, dir.path(), &current, "dev").unwrap();
        assert_eq!(result, MergeResult::Merged { conflict: true });

        let contents = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(contents, "<<<<<<< HEAD\nC=======\nB>>>>>>>\n");
    }

    #[test]
    fn unmodified_file_produces_no_changes_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));

        let mut tree = BTreeMap::new();
        tree.insert("a.txt".to_owned(), blob(&store, "a.txt", "A"));
        let base = commit(&store, "base", vec![], tree.clone());
        let current = commit(&store, "current unrelated", vec![base.id()], tree.clone());
        let target = commit(&store, "target unrelated", vec![base.id()], tree.clone());

        let mut branches = Branches::init(current.id());
        branches.put("dev", target.id());
        let mut stage = Stage::default();
        stage.update(&current);
        std::fs::write(dir.path().join("a.txt"), "A").unwrap();

        assert!(merge(&store, &mut branches, &mut stage, dir.path(), &current, "dev").is_err());
    }
}
