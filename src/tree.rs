//! Component C: walk a directory and fold it into blob and tree objects (spec.md §4.C).

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::object::ObjectType;
use crate::oid::Oid;
use crate::store::ObjectStore;

/// A git tree entry mode. `Tree` and `Blob` are the only modes (C) ever emits; the others are
/// accepted when reading trees written by a real git.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// `100644` — a regular file.
    Blob,
    /// `100755` — an executable file. Read-only: (C) never emits this.
    BlobExecutable,
    /// `40000` — a subdirectory. Canonical wire spelling has no leading zero.
    Tree,
    /// `120000` — a symlink. Read-only.
    Link,
    /// `160000` — a gitlink (submodule commit). Read-only.
    Commit,
}

impl Mode {
    /// The on-wire octal-like spelling used in a tree entry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Blob => "100644",
            Mode::BlobExecutable => "100755",
            Mode::Tree => "40000",
            Mode::Link => "120000",
            Mode::Commit => "160000",
        }
    }

    /// Parse a mode string as read from a stored tree object.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "100644" => Ok(Mode::Blob),
            "100755" => Ok(Mode::BlobExecutable),
            "40000" | "040000" => Ok(Mode::Tree),
            "120000" => Ok(Mode::Link),
            "160000" => Ok(Mode::Commit),
            other => Err(Error::decode(format!("unrecognized tree entry mode '{other}'"))),
        }
    }
}

/// A single decoded tree entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: Mode,
    pub name: String,
    pub oid: Oid,
}

/// Serialize a tree's entries into its on-disk payload: `mode SP name NUL oid20`, repeated,
/// with no trailing delimiter. Entries must already be sorted by `name` bytes.
fn encode_entries(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.mode.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.oid.as_bytes());
    }
    out
}

/// Decode a tree object's payload into its entries.
pub fn decode_entries(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let sp = payload[i..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::decode("tree entry missing mode/name separator"))?;
        let mode_str = std::str::from_utf8(&payload[i..i + sp])
            .map_err(|_| Error::decode("tree entry mode is not valid UTF-8"))?;
        let mode = Mode::parse(mode_str)?;
        i += sp + 1;

        let nul = payload[i..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::decode("tree entry missing name terminator"))?;
        let name = std::str::from_utf8(&payload[i..i + nul])
            .map_err(|_| Error::decode("tree entry name is not valid UTF-8"))?
            .to_string();
        i += nul + 1;

        if i + 20 > payload.len() {
            return Err(Error::decode("tree entry truncated before its oid"));
        }
        let mut oid_bytes = [0u8; 20];
        oid_bytes.copy_from_slice(&payload[i..i + 20]);
        i += 20;

        entries.push(TreeEntry { mode, name, oid: Oid::from_bytes(oid_bytes) });
    }
    Ok(entries)
}

/// Build a tree object from already-sorted entries and store it. Panics (via a debug assert
/// in tests) only if callers pass unsorted or duplicate-named entries; production callers
/// should build entries via [`write_tree`] or otherwise guarantee the sort themselves.
pub fn write_tree_from_entries(store: &dyn ObjectStore, entries: &[TreeEntry]) -> Result<Oid> {
    let payload = encode_entries(entries);
    store.put(ObjectType::Tree, &payload)
}

/// Recursively materialize `root` (and everything beneath it, excluding `.git`) into tree and
/// blob objects, returning the oid of the top-level tree.
pub fn write_tree(store: &dyn ObjectStore, root: &Path) -> Result<Oid> {
    let mut dir_entries: Vec<(String, fs::FileType)> = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".git" {
            continue;
        }
        dir_entries.push((name, entry.file_type()?));
    }

    let mut entries = Vec::with_capacity(dir_entries.len());
    for (name, file_type) in dir_entries {
        let path = root.join(&name);
        if file_type.is_dir() {
            let oid = write_tree(store, &path)?;
            entries.push(TreeEntry { mode: Mode::Tree, name, oid });
        } else if file_type.is_file() {
            let contents = fs::read(&path)?;
            let oid = store.put(ObjectType::Blob, &contents)?;
            entries.push(TreeEntry { mode: Mode::Blob, name, oid });
        } else {
            return Err(Error::unsupported(format!(
                "{} is a symlink or other special file; write-tree only handles regular files and directories",
                path.display()
            )));
        }
    }

    // Tree entries are sorted by name bytes, not by the rendered entry line (spec.md §4.C.4):
    // sorting by line would put "40000" before "100644" unpredictably since directories and
    // files share no fixed-width prefix.
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

    write_tree_from_entries(store, &entries)
}
