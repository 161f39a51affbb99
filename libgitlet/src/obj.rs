mod blob;
mod commit;

pub use blob::*;
pub use commit::*;

use crate::error::{GitletError, GitletResult};
use crate::hash::Oid;
use crate::serialize::{DeserializeSized, Serialize};
use std::fmt::{self, Display, Formatter};
use std::io::{prelude::*, BufReader};
use std::str::FromStr;

/// The two kinds of object this store ever persists. Blobs and commits share a
/// single directory under one id space, so we tag the envelope at the codec
/// layer rather than relying on structural decoding to discriminate (§9).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ObjType {
    Blob,
    Commit,
}

impl Display for ObjType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjType::Blob => "blob",
            ObjType::Commit => "commit",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ObjType {
    type Err = GitletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjType::Blob),
            "commit" => Ok(ObjType::Commit),
            _ => Err(GitletError::ObjectNotFound(s.to_owned())),
        }
    }
}

pub struct ObjHeader {
    pub obj_type: ObjType,
    pub size: u64,
}

pub trait WritableObject: Serialize {
    fn obj_ty(&self) -> ObjType;

    /// serialises the object with a `<type> <size>\0` header, the same
    /// envelope shape the reference implementation uses for loose objects
    fn serialize_with_header(&self) -> GitletResult<Vec<u8>> {
        let mut payload = Vec::new();
        self.serialize(&mut payload)?;
        let mut buf = Vec::with_capacity(payload.len() + 16);
        write!(buf, "{} {}\0", self.obj_ty(), payload.len())?;
        buf.extend_from_slice(&payload);
        Ok(buf)
    }
}

pub fn read_header(bytes: &[u8]) -> GitletResult<(ObjHeader, &[u8])> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| anyhow!("corrupt object: missing header terminator"))?;
    let header = std::str::from_utf8(&bytes[..nul])?;
    let (ty, size) = header
        .split_once(' ')
        .ok_or_else(|| anyhow!("corrupt object: malformed header `{}`", header))?;
    let obj_type: ObjType = ty.parse().map_err(|_| anyhow!("corrupt object: unknown type `{}`", ty))?;
    let size: u64 = size.parse().map_err(|_| anyhow!("corrupt object: malformed size `{}`", size))?;
    Ok((ObjHeader { obj_type, size }, &bytes[nul + 1..]))
}

/// A decoded object of either kind, returned by the object store once it has
/// read the header and dispatched on `obj_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Obj {
    Blob(Blob),
    Commit(Commit),
}

impl Obj {
    pub fn obj_type(&self) -> ObjType {
        match self {
            Obj::Blob(..) => ObjType::Blob,
            Obj::Commit(..) => ObjType::Commit,
        }
    }

    pub fn into_commit(self) -> GitletResult<Commit> {
        match self {
            Obj::Commit(commit) => Ok(commit),
            Obj::Blob(..) => bail!("expected commit, found blob"),
        }
    }

    pub fn into_blob(self) -> GitletResult<Blob> {
        match self {
            Obj::Blob(blob) => Ok(blob),
            Obj::Commit(..) => bail!("expected blob, found commit"),
        }
    }

    pub fn from_header_and_body(header: ObjHeader, body: &[u8]) -> GitletResult<Self> {
        let mut reader = BufReader::new(body);
        Ok(match header.obj_type {
            ObjType::Blob => Obj::Blob(Blob::deserialize_sized(&mut reader, header.size)?),
            ObjType::Commit => Obj::Commit(Commit::deserialize_sized(&mut reader, header.size)?),
        })
    }
}
