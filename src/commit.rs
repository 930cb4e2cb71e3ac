//! Component D: build a commit object and advance a ref (spec.md §4.D).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::object::ObjectType;
use crate::oid::Oid;
use crate::store::ObjectStore;

/// An author or committer identity plus the moment the commit was made.
#[derive(Clone, Debug)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub seconds: i64,
    /// Signed four-digit offset, e.g. `+0000` or `-0600`.
    pub tz_offset: String,
}

impl Signature {
    fn render(&self) -> String {
        format!("{} <{}> {} {}", self.name, self.email, self.seconds, self.tz_offset)
    }
}

/// Supplies the ambient clock/identity a [`Signature`] is built from when the caller doesn't
/// inject one explicitly — spec.md §9 calls for this to be overridable so tests aren't at the
/// mercy of wall-clock time.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now_seconds(&self) -> i64;
}

/// The default [`Clock`], backed by [`SystemTime::now`].
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Assemble a commit payload in the canonical order (`tree`, `parent*`, `author`,
/// `committer`, blank line, message) and store it.
///
/// The message gets a trailing newline appended if it doesn't already end with one.
pub fn commit_tree(
    store: &dyn ObjectStore,
    tree: Oid,
    parents: &[Oid],
    author: &Signature,
    committer: &Signature,
    message: &str,
) -> Result<Oid> {
    let mut payload = String::new();
    payload.push_str(&format!("tree {tree}\n"));
    for parent in parents {
        payload.push_str(&format!("parent {parent}\n"));
    }
    payload.push_str(&format!("author {}\n", author.render()));
    payload.push_str(&format!("committer {}\n", committer.render()));
    payload.push('\n');
    payload.push_str(message);
    if !message.ends_with('\n') {
        payload.push('\n');
    }

    store.put(ObjectType::Commit, payload.as_bytes())
}

/// The higher-level `commit` variant: resolves `HEAD`, appends its target as the sole parent
/// (if any), writes the new commit, and advances the resolved ref to point at it.
pub fn commit(
    store: &dyn ObjectStore,
    tree: Oid,
    author: &Signature,
    committer: &Signature,
    message: &str,
) -> Result<Oid> {
    let head_target = resolve_head_ref_name(store);
    let parent = store.resolve("HEAD").ok();
    let parents: Vec<Oid> = parent.into_iter().collect();

    let oid = commit_tree(store, tree, &parents, author, committer, message)?;
    store.update_ref(&head_target, oid)?;
    Ok(oid)
}

/// `HEAD` is almost always a symref; fall back to `HEAD` itself if it's a detached oid (no
/// `ref:` indirection to chase) or doesn't exist yet (first commit in a fresh repository).
fn resolve_head_ref_name(store: &dyn ObjectStore) -> String {
    match std::fs::read_to_string(store.git_dir().join("HEAD")) {
        Ok(contents) => contents
            .trim_end_matches('\n')
            .strip_prefix("ref: ")
            .map(str::to_string)
            .unwrap_or_else(|| "HEAD".to_string()),
        Err(_) => "refs/heads/main".to_string(),
    }
}
