//! The error taxonomy for tinygit's core object store and clone engine.
//!
//! [`Error`] is the single error type returned by every public operation in this crate. It
//! uses rich enum variants so callers — primarily `tinygit-cli` — can render a single
//! human-readable line without parsing message text, matching the kinds spec'd for the
//! command dispatcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by tinygit's object store, tree materializer, commit author, and clone
/// engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Attempted to `init` a repository where `.git` already exists.
    #[error("repository already exists at {}", path.display())]
    AlreadyExists {
        /// The `.git` directory that already existed.
        path: PathBuf,
    },

    /// A requested object or ref was not present in the store.
    #[error("not found: {message}")]
    NotFound {
        /// What was missing (object oid, ref name, base object, ...).
        message: String,
    },

    /// Malformed input: corrupt zlib stream, bad object header, ill-formed tree entry,
    /// ill-formed pkt-line, truncated pack, or a bad delta opcode.
    #[error("decode error: {message}")]
    Decode {
        /// Human-readable description of what failed to parse.
        message: String,
    },

    /// A recognized-but-unimplemented wire feature, such as an `ofs_delta` object or an
    /// object type outside `{blob,tree,commit,tag}`.
    #[error("unsupported: {message}")]
    Unsupported {
        /// What isn't supported.
        message: String,
    },

    /// A filesystem error other than [`Error::AlreadyExists`] / [`Error::NotFound`].
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A non-2xx HTTP response or transport-level failure while talking to a remote.
    #[error("network error: {message}")]
    Network {
        /// Description of the failure (status code, transport error, ...).
        message: String,
    },

    /// Bad or missing CLI arguments.
    #[error("usage error: {message}")]
    Usage {
        /// What was wrong with the invocation.
        message: String,
    },
}

/// A `Result` defaulting to tinygit's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Error::Decode { message: message.into() }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound { message: message.into() }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported { message: message.into() }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        Error::Network { message: message.into() }
    }
}
