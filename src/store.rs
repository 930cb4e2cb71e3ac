//! Component B: persist and retrieve objects by identifier on a loose-object filesystem
//! layout, rooted at `<repo>/.git` (spec.md §4.B).

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::object::{self, ObjectType};
use crate::oid::Oid;

/// The seam between the core algorithms (tree materializer, commit author, clone engine) and
/// an on-disk repository. `LooseStore` is the only implementation; the trait exists so tests
/// can substitute an in-memory double without pulling in the filesystem.
pub trait ObjectStore {
    /// Frame, hash, and persist `payload`. A no-op (but not an error) if the oid already
    /// exists — objects are immutable and content-addressed.
    fn put(&self, kind: ObjectType, payload: &[u8]) -> Result<Oid>;

    /// Inflate and split the object at `oid`.
    fn get(&self, oid: Oid) -> Result<(ObjectType, Vec<u8>)>;

    /// `true` if an object with this oid is already on disk.
    fn exists(&self, oid: Oid) -> bool;

    /// Write `<oid>\n` to `.git/<name>` atomically, creating intermediate directories.
    fn update_ref(&self, name: &str, oid: Oid) -> Result<()>;

    /// Resolve `name` to an oid, following one `ref: <target>` indirection if present.
    fn resolve(&self, name: &str) -> Result<Oid>;

    /// The `.git` directory this store is rooted at, so callers can read raw ref contents
    /// (e.g. to find which ref `HEAD` points through, not just what it resolves to).
    fn git_dir(&self) -> &Path;
}

/// A loose-object store rooted at `<repo>/.git`.
pub struct LooseStore {
    git_dir: PathBuf,
}

impl LooseStore {
    /// Create a fresh `.git` skeleton at `repo_root` and return a handle to it.
    ///
    /// Fails with [`Error::AlreadyExists`] if `.git` is already present.
    pub fn init(repo_root: &Path) -> Result<Self> {
        let git_dir = repo_root.join(".git");
        if git_dir.exists() {
            return Err(Error::AlreadyExists { path: git_dir });
        }
        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs").join("heads"))?;
        fs::write(git_dir.join("HEAD"), b"ref: refs/heads/main\n")?;
        debug!(git_dir = %git_dir.display(), "initialized repository");
        Ok(Self { git_dir })
    }

    /// Open a `.git` directory that is assumed to already exist.
    ///
    /// Fails with [`Error::NotFound`] if `<repo_root>/.git` is missing.
    pub fn open(repo_root: &Path) -> Result<Self> {
        let git_dir = repo_root.join(".git");
        if !git_dir.is_dir() {
            return Err(Error::not_found(format!(
                "no .git directory at {}",
                repo_root.display()
            )));
        }
        Ok(Self { git_dir })
    }

    /// Wrap an already-resolved `.git` directory directly (used by the clone engine, which
    /// creates the directory itself before opening a store onto it).
    #[must_use]
    pub fn at(git_dir: PathBuf) -> Self {
        Self { git_dir }
    }

    /// The `.git` directory this store is rooted at.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn path_for(&self, oid: Oid) -> PathBuf {
        let hex = oid.to_string();
        self.git_dir
            .join("objects")
            .join(&hex[0..2])
            .join(&hex[2..40])
    }

    /// Write `bytes` to `path` via a temp-sibling-then-rename, the crash-tolerant write
    /// spec.md §4.B and §5 both call for.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path.parent().expect("object/ref paths always have a parent");
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        std::io::Write::write_all(&mut tmp, bytes)?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl ObjectStore for LooseStore {
    fn put(&self, kind: ObjectType, payload: &[u8]) -> Result<Oid> {
        let (oid, framed) = object::frame(kind, payload);
        let path = self.path_for(oid);
        if path.exists() {
            trace!(%oid, "object already present, skipping write");
            return Ok(oid);
        }
        let compressed = object::deflate(&framed)?;
        Self::write_atomic(&path, &compressed)?;
        debug!(%oid, kind = %kind, bytes = payload.len(), "wrote object");
        Ok(oid)
    }

    fn get(&self, oid: Oid) -> Result<(ObjectType, Vec<u8>)> {
        let path = self.path_for(oid);
        let compressed = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("object {oid} not found"))
            } else {
                Error::Io(e)
            }
        })?;
        let framed = object::inflate(&compressed)?;
        object::split_header(&framed)
    }

    fn exists(&self, oid: Oid) -> bool {
        self.path_for(oid).exists()
    }

    fn update_ref(&self, name: &str, oid: Oid) -> Result<()> {
        let path = self.git_dir.join(name);
        let contents = format!("{oid}\n");
        Self::write_atomic(&path, contents.as_bytes())?;
        debug!(ref_name = name, %oid, "updated ref");
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<Oid> {
        let path = self.git_dir.join(name);
        let contents = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("ref {name} not found"))
            } else {
                Error::Io(e)
            }
        })?;
        let trimmed = contents.trim_end_matches('\n');
        if let Some(target) = trimmed.strip_prefix("ref: ") {
            let target_path = self.git_dir.join(target);
            let target_contents = fs::read_to_string(&target_path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::not_found(format!("ref {target} not found"))
                } else {
                    Error::Io(e)
                }
            })?;
            target_contents.trim_end_matches('\n').parse()
        } else {
            trimmed.parse()
        }
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_repo() -> (TempDir, LooseStore) {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn init_fails_if_git_dir_exists() {
        let (dir, _store) = new_repo();
        assert!(matches!(
            LooseStore::init(dir.path()),
            Err(Error::AlreadyExists { .. })
        ));
    }

    #[test]
    fn init_writes_head_pointing_at_refs_heads_main() {
        let (dir, _store) = new_repo();
        let head = fs::read_to_string(dir.path().join(".git/HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/main\n");
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_dir, store) = new_repo();
        let oid = store.put(ObjectType::Blob, b"hello\n").unwrap();
        let (kind, payload) = store.get(oid).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(payload, b"hello\n");
    }

    #[test]
    fn put_is_idempotent() {
        let (_dir, store) = new_repo();
        let oid1 = store.put(ObjectType::Blob, b"same bytes").unwrap();
        let oid2 = store.put(ObjectType::Blob, b"same bytes").unwrap();
        assert_eq!(oid1, oid2);
    }

    #[test]
    fn exists_reflects_puts() {
        let (_dir, store) = new_repo();
        let oid = store.put(ObjectType::Blob, b"x").unwrap();
        assert!(store.exists(oid));
        assert!(!store.exists(Oid::ZERO));
    }

    #[test]
    fn get_missing_object_is_not_found() {
        let (_dir, store) = new_repo();
        assert!(matches!(store.get(Oid::ZERO), Err(Error::NotFound { .. })));
    }

    #[test]
    fn update_ref_then_resolve_direct() {
        let (_dir, store) = new_repo();
        let oid = store.put(ObjectType::Blob, b"x").unwrap();
        store.update_ref("refs/heads/main", oid).unwrap();
        assert_eq!(store.resolve("refs/heads/main").unwrap(), oid);
    }

    #[test]
    fn resolve_follows_one_head_indirection() {
        let (_dir, store) = new_repo();
        let oid = store.put(ObjectType::Blob, b"x").unwrap();
        store.update_ref("refs/heads/main", oid).unwrap();
        assert_eq!(store.resolve("HEAD").unwrap(), oid);
    }

    #[test]
    fn resolve_missing_ref_is_not_found() {
        let (_dir, store) = new_repo();
        assert!(matches!(
            store.resolve("refs/heads/main"),
            Err(Error::NotFound { .. })
        ));
    }
}
