use super::{ObjType, WritableObject};
use crate::error::GitletResult;
use crate::hash::{hash_parts, Oid};
use crate::serialize::{DeserializeSized, Serialize};
use std::fmt::{self, Display, Formatter};
use std::io::prelude::*;
use std::path::Path;

/// Immutable snapshot of one tracked file's bytes under a given name (§3).
/// Identity is a function of BOTH the filename and the contents, so the same
/// bytes filed under two different names are two distinct blobs.
#[derive(Clone, Debug)]
pub struct Blob {
    id: Oid,
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Blob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let id = hash_parts(&[name.as_bytes(), &bytes, b"Blob"]);
        Self { id, name, bytes }
    }

    pub fn id(&self) -> Oid {
        self.id
    }

    /// writes `bytes` to the working-directory file `name`, overwriting unconditionally
    pub fn recover(&self, workdir: &Path) -> GitletResult<()> {
        std::fs::write(workdir.join(&self.name), &self.bytes)?;
        Ok(())
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.bytes) {
            Ok(utf8) => write!(f, "{}", utf8),
            Err(..) => write!(f, "<binary>"),
        }
    }
}

impl Serialize for Blob {
    fn serialize(&self, writer: &mut dyn Write) -> GitletResult<()> {
        writeln!(writer, "{}", self.name)?;
        writer.write_all(&self.bytes)?;
        Ok(())
    }
}

impl DeserializeSized for Blob {
    fn deserialize_sized(reader: &mut impl BufRead, _size: u64) -> GitletResult<Self> {
        let mut name = String::new();
        reader.read_line(&mut name)?;
        let name = name.trim_end_matches('\n').to_owned();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        // identity is recomputed rather than trusted from disk, consistent with the
        // object store's content-addressing: a decoded blob's id is whatever its
        // (name, bytes) actually hash to
        Ok(Self::new(name, bytes))
    }
}

impl WritableObject for Blob {
    fn obj_ty(&self) -> ObjType {
        ObjType::Blob
    }
}

/// equality of two optional blobs per §4.3: both absent is equal, one absent is
/// unequal, both present compares by id
pub fn blobs_equal(a: Option<&Blob>, b: Option<&Blob>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.id() == y.id(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_bytes_same_id() {
        let a = Blob::new("a.txt", b"hello".to_vec());
        let b = Blob::new("a.txt", b"hello".to_vec());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn same_bytes_different_name_different_id() {
        let a = Blob::new("a.txt", b"hello".to_vec());
        let b = Blob::new("b.txt", b"hello".to_vec());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn serialize_roundtrip() {
        let blob = Blob::new("a.txt", b"hello world".to_vec());
        let mut buf = Vec::new();
        blob.serialize(&mut buf).unwrap();
        let mut reader = std::io::BufReader::new(&buf[..]);
        let decoded = Blob::deserialize_sized(&mut reader, buf.len() as u64).unwrap();
        assert_eq!(decoded.id(), blob.id());
        assert_eq!(decoded.bytes, blob.bytes);
        assert_eq!(decoded.name, blob.name);
    }

    #[test]
    fn optional_blob_equality() {
        let a = Blob::new("a.txt", b"x".to_vec());
        let a2 = Blob::new("a.txt", b"x".to_vec());
        let b = Blob::new("a.txt", b"y".to_vec());
        assert!(blobs_equal(None, None));
        assert!(!blobs_equal(Some(&a), None));
        assert!(blobs_equal(Some(&a), Some(&a2)));
        assert!(!blobs_equal(Some(&a), Some(&b)));
    }
}
