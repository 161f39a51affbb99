use super::{ObjType, WritableObject};
use crate::error::GitletResult;
use crate::hash::{hash_parts, Oid};
use crate::serialize::{DeserializeSized, Serialize};
use crate::signature::{format_date, Timestamp};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::io::prelude::*;

/// Immutable DAG node (§3). `parents` holds 0 entries only for the initial
/// commit and 2 only for merge commits; the first parent is the
/// "current-branch" parent and fixes the first-parent chain `log` walks.
///
/// `timestamp` and `tree` are intentionally NOT part of the identity hash
/// (§9 open question 2) — two commits with identical parents and message
/// collide on disk, which is accepted as intentional de-duplication.
#[derive(Clone, Debug)]
pub struct Commit {
    id: Oid,
    pub message: String,
    pub timestamp: Timestamp,
    pub parents: Vec<Oid>,
    pub tree: BTreeMap<String, Oid>,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Commit {
    fn compute_id(parents: &[Oid], message: &str) -> Oid {
        let mut parts: Vec<&[u8]> = Vec::with_capacity(parents.len() + 2);
        let parent_bytes: Vec<[u8; 20]> = parents.iter().map(|p| *p.as_bytes()).collect();
        for p in &parent_bytes {
            parts.push(p.as_slice());
        }
        parts.push(message.as_bytes());
        parts.push(b"Commit");
        hash_parts(&parts)
    }

    /// the initial commit: `message = "initial commit"`, epoch timestamp, empty
    /// tree, no parents (§4.4)
    pub fn initial() -> Self {
        let message = "initial commit".to_owned();
        let id = Self::compute_id(&[], &message);
        Self { id, message, timestamp: Timestamp::EPOCH, parents: Vec::new(), tree: BTreeMap::new() }
    }

    /// a child commit built from a staged snapshot, message, and parent list
    pub fn new(message: String, parents: Vec<Oid>, tree: BTreeMap<String, Oid>) -> GitletResult<Self> {
        ensure!(!message.is_empty(), "commit message must be non-empty");
        ensure!(parents.len() <= 2, "a commit has at most two parents");
        let id = Self::compute_id(&parents, &message);
        Ok(Self { id, message, timestamp: Timestamp::now(), parents, tree })
    }

    pub fn id(&self) -> Oid {
        self.id
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() == 2
    }

    pub fn first_parent(&self) -> Option<Oid> {
        self.parents.first().copied()
    }
}

impl Display for Commit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.id)?;
        if self.is_merge() {
            writeln!(
                f,
                "Merge: {} {}",
                self.parents[0].short(),
                self.parents[1].short()
            )?;
        }
        writeln!(f, "Date: {}", format_date(self.timestamp))?;
        writeln!(f, "{}", self.message)?;
        Ok(())
    }
}

impl Serialize for Commit {
    fn serialize(&self, writer: &mut dyn Write) -> GitletResult<()> {
        for parent in &self.parents {
            writeln!(writer, "parent {}", parent)?;
        }
        writeln!(writer, "timestamp {}", self.timestamp.unix_seconds())?;
        writeln!(writer, "tree {}", self.tree.len())?;
        for (name, oid) in &self.tree {
            writeln!(writer, "{} {}", oid, name)?;
        }
        writeln!(writer)?;
        write!(writer, "{}", self.message)?;
        Ok(())
    }
}

impl DeserializeSized for Commit {
    fn deserialize_sized(reader: &mut impl BufRead, size: u64) -> GitletResult<Self> {
        let mut lines = reader.take(size).lines();
        let mut parents = Vec::new();
        let mut timestamp = Timestamp::EPOCH;
        let mut tree = BTreeMap::new();

        loop {
            let line = match lines.next() {
                Some(line) => line?,
                None => bail!("corrupt commit object: unexpected end of header"),
            };
            if let Some(rest) = line.strip_prefix("parent ") {
                parents.push(rest.parse()?);
            } else if let Some(rest) = line.strip_prefix("timestamp ") {
                timestamp = rest.parse()?;
            } else if let Some(rest) = line.strip_prefix("tree ") {
                let count: usize = rest.parse()?;
                for _ in 0..count {
                    let entry = lines
                        .next()
                        .ok_or_else(|| anyhow!("corrupt commit object: truncated tree"))??;
                    let (oid, name) = entry
                        .split_once(' ')
                        .ok_or_else(|| anyhow!("corrupt commit object: malformed tree entry"))?;
                    tree.insert(name.to_owned(), oid.parse()?);
                }
            } else if line.is_empty() {
                break;
            } else {
                bail!("corrupt commit object: unrecognised header line `{}`", line);
            }
        }

        let message = lines.collect::<Result<Vec<_>, _>>()?.join("\n");
        ensure!(!message.is_empty(), "corrupt commit object: empty message");

        let id = Self::compute_id(&parents, &message);
        Ok(Self { id, message, timestamp, parents, tree })
    }
}

impl WritableObject for Commit {
    fn obj_ty(&self) -> ObjType {
        ObjType::Commit
    }
}
