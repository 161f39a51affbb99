use crate::error::{GitletError, GitletGenericError};
use rustc_hex::{FromHex, ToHex};
use sha1::{Digest, Sha1};
use std::convert::TryInto;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

pub const OID_SIZE: usize = 20;
pub const SHORT_OID_LEN: usize = 8;

#[derive(PartialEq, Eq, Hash, Clone, Ord, PartialOrd, Copy)]
#[repr(transparent)]
pub struct Oid([u8; OID_SIZE]);

impl Oid {
    #[inline]
    pub fn new(bytes: [u8; OID_SIZE]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; OID_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn short(&self) -> String {
        self.to_hex()[..SHORT_OID_LEN].to_owned()
    }
}

#[cfg(test)]
impl<'a> From<&'a str> for Oid {
    fn from(s: &'a str) -> Self {
        Self::from_str(s).unwrap()
    }
}

impl FromStr for Oid {
    type Err = GitletGenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end();
        ensure!(s.len() == OID_SIZE * 2, "creating an id from invalid hex string (incorrect length)");
        let bytes: Vec<u8> = s.from_hex()?;
        Ok(Self(bytes.try_into().unwrap()))
    }
}

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.short())
        } else {
            write!(f, "{}", self.to_hex())
        }
    }
}

/// The subset of an object id the object store accepts for lookups: either the
/// full 40-hex id, or an (exactly) 8-hex prefix to be expanded (§4.2).
#[derive(Debug, Clone, Copy)]
pub enum ObjIdRef<'a> {
    Full(Oid),
    Prefix(&'a str),
}

impl<'a> ObjIdRef<'a> {
    pub fn parse(s: &'a str) -> GitletResultParse<Self> {
        if s.len() == OID_SIZE * 2 {
            Ok(ObjIdRef::Full(Oid::from_str(s)?))
        } else if s.len() == SHORT_OID_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(ObjIdRef::Prefix(s))
        } else {
            bail!(GitletError::ObjectNotFound(s.to_owned()))
        }
    }
}

type GitletResultParse<T> = Result<T, GitletGenericError>;

/// Serialises an ordered sequence of fields unambiguously (each field is
/// length-prefixed so no field boundary can be confused with field content)
/// and hashes the result with SHA-1. This is the `H(*parts)` contract of §4.1.
pub fn hash_parts(parts: &[&[u8]]) -> Oid {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    Oid::new(hasher.finalize().into())
}

pub fn hash_bytes(bytes: impl AsRef<[u8]>) -> Oid {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    Oid::new(hasher.finalize().into())
}
