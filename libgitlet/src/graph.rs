use crate::error::GitletResult;
use crate::hash::Oid;
use crate::odb::ObjectStore;
use std::collections::{HashMap, VecDeque};

/// BFS over the reversed DAG starting at `c`, both parent edges of a merge
/// commit contribute (§4.5). Commits are represented as values keyed by id
/// rather than by pointer (§9 "cyclic-looking DAG"), so the map itself IS the
/// ancestor set.
pub fn ancestors(store: &ObjectStore, c: Oid) -> GitletResult<HashMap<Oid, usize>> {
    let mut dist = HashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(c, 0usize);
    queue.push_back(c);

    while let Some(id) = queue.pop_front() {
        let d = dist[&id];
        let commit = store.read_commit(id)?;
        for &parent in &commit.parents {
            if !dist.contains_key(&parent) {
                dist.insert(parent, d + 1);
                queue.push_back(parent);
            }
        }
    }

    Ok(dist)
}

/// the nearest common ancestor of `a` and `b` by summed BFS distance (§4.5).
/// Ties are broken deterministically by lexicographically-smallest id among
/// the minimisers (§9 open question 1) — the reference implementation's
/// hash-map iteration order is explicitly not reproduced.
pub fn split_point(store: &ObjectStore, a: Oid, b: Oid) -> GitletResult<Oid> {
    let dist_a = ancestors(store, a)?;
    let dist_b = ancestors(store, b)?;

    let mut best: Option<(usize, Oid)> = None;
    for (&id, &da) in &dist_a {
        if let Some(&db) = dist_b.get(&id) {
            let total = da + db;
            best = Some(match best {
                None => (total, id),
                Some((best_total, best_id)) =>
                    if total < best_total || (total == best_total && id < best_id) {
                        (total, id)
                    } else {
                        (best_total, best_id)
                    },
            });
        }
    }

    let split = best.map(|(_, id)| id).ok_or_else(|| anyhow!("no common ancestor between {} and {}", a, b))?;
    log::debug!("split point of {:#} and {:#} is {:#}", a, b, split);
    Ok(split)
}
