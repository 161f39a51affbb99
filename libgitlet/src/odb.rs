use crate::error::{GitletError, GitletResult};
use crate::hash::{hash_bytes, Oid, OID_SIZE, SHORT_OID_LEN};
use crate::obj::{read_header, Obj, WritableObject};
use std::fs;
use std::path::PathBuf;

/// Content-addressed persistence of blobs and commits: one file per object,
/// filename = object id (§4.2). Loose-only — the reference implementation
/// additionally searches a packed backend, but packfiles are out of scope here.
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self { objects_dir: objects_dir.into() }
    }

    fn path_for(&self, id: Oid) -> PathBuf {
        self.objects_dir.join(id.to_hex())
    }

    /// writes an object; idempotent, writing an existing id is a no-op
    pub fn write(&self, obj: &dyn WritableObject) -> GitletResult<Oid> {
        let bytes = obj.serialize_with_header()?;
        let id = hash_bytes(&bytes);
        let path = self.path_for(id);
        if !path.exists() {
            fs::create_dir_all(&self.objects_dir)?;
            // write-then-rename keeps a crash mid-write from leaving a truncated object (§5)
            let tmp = self.objects_dir.join(format!(".{}.tmp", id.to_hex()));
            fs::write(&tmp, &bytes)?;
            fs::rename(&tmp, &path)?;
        }
        Ok(id)
    }

    /// resolves `id_str` by exact 40-hex id or 8-hex prefix (§4.2)
    pub fn resolve(&self, id_str: &str) -> GitletResult<Oid> {
        if id_str.len() == OID_SIZE * 2 {
            let id: Oid = id_str.parse()?;
            if self.path_for(id).exists() {
                return Ok(id);
            }
            bail!(GitletError::ObjectNotFound(id_str.to_owned()));
        }

        if id_str.len() == SHORT_OID_LEN && id_str.chars().all(|c| c.is_ascii_hexdigit()) {
            let candidates = self.prefix_candidates(id_str)?;
            return match candidates.len() {
                0 => bail!(GitletError::ObjectNotFound(id_str.to_owned())),
                1 => Ok(candidates[0]),
                _ => bail!(GitletError::AmbiguousPrefix(id_str.to_owned(), candidates)),
            };
        }

        bail!(GitletError::ObjectNotFound(id_str.to_owned()))
    }

    fn prefix_candidates(&self, prefix: &str) -> GitletResult<Vec<Oid>> {
        let mut candidates = Vec::new();
        if !self.objects_dir.exists() {
            return Ok(candidates);
        }
        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            if let Some(rest) = name.strip_prefix(prefix) {
                let _ = rest;
                candidates.push(name.parse()?);
            }
        }
        candidates.sort();
        Ok(candidates)
    }

    pub fn exists(&self, id: Oid) -> bool {
        self.path_for(id).exists()
    }

    pub fn read(&self, id: Oid) -> GitletResult<Obj> {
        let path = self.path_for(id);
        let bytes = fs::read(&path).map_err(|_| GitletError::ObjectNotFound(id.to_hex()))?;
        let (header, body) = read_header(&bytes)?;
        Obj::from_header_and_body(header, body)
    }

    pub fn read_commit(&self, id: Oid) -> GitletResult<crate::obj::Commit> {
        self.read(id)?.into_commit()
    }

    pub fn read_blob(&self, id: Oid) -> GitletResult<crate::obj::Blob> {
        self.read(id)?.into_blob()
    }

    /// every commit id currently stored, used by `global-log` (§4.10)
    pub fn all_commit_ids(&self) -> GitletResult<Vec<Oid>> {
        let mut ids = Vec::new();
        if !self.objects_dir.exists() {
            return Ok(ids);
        }
        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let id: Oid = name.parse()?;
            if matches!(self.read(id), Ok(Obj::Commit(..))) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
