//! Component A: frame / hash / deflate / inflate a typed byte payload.
//!
//! Pure functions — no I/O, no globals. The framed form (`<type> SP <len> NUL <payload>`) is
//! what gets hashed to produce an [`Oid`]; its zlib-deflated bytes are what the object store
//! persists.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha1::{Digest, Sha1};

use crate::error::Error;
use crate::oid::Oid;

/// The four object types the store knows about (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    /// The canonical wire spelling used in the framed header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            other => Err(Error::decode(format!("unknown object type '{other}'"))),
        }
    }
}

/// Build `<type> SP <decimal-length> NUL <payload>` and hash it.
///
/// Returns the object's [`Oid`] (SHA-1 of the framed bytes) alongside the framed bytes
/// themselves. An empty payload is legal: it produces the well-known empty-blob oid.
#[must_use]
pub fn frame(kind: ObjectType, payload: &[u8]) -> (Oid, Vec<u8>) {
    let mut framed = Vec::with_capacity(payload.len() + 16);
    framed.extend_from_slice(kind.as_str().as_bytes());
    framed.push(b' ');
    framed.extend_from_slice(payload.len().to_string().as_bytes());
    framed.push(0);
    framed.extend_from_slice(payload);

    let mut hasher = Sha1::new();
    hasher.update(&framed);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest);

    (Oid::from_bytes(bytes), framed)
}

/// Zlib-deflate the framed bytes of an object for on-disk storage.
pub fn deflate(framed_bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(framed_bytes)?;
    Ok(encoder.finish()?)
}

/// Inflate a zlib stream back into framed object bytes.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::decode(format!("zlib inflate failed: {e}")))?;
    Ok(out)
}

/// Split framed bytes into `(type, payload)`, validating the declared length.
pub fn split_header(framed_bytes: &[u8]) -> Result<(ObjectType, Vec<u8>), Error> {
    let nul = framed_bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::decode("object header missing NUL terminator"))?;
    let header = &framed_bytes[..nul];
    let payload = &framed_bytes[nul + 1..];

    let sp = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::decode("object header missing type/length separator"))?;
    let type_str = std::str::from_utf8(&header[..sp])
        .map_err(|_| Error::decode("object type is not valid UTF-8"))?;
    let len_str = std::str::from_utf8(&header[sp + 1..])
        .map_err(|_| Error::decode("object length is not valid UTF-8"))?;
    let declared_len: usize = len_str
        .parse()
        .map_err(|_| Error::decode(format!("invalid object length '{len_str}'")))?;

    if declared_len != payload.len() {
        return Err(Error::decode(format!(
            "object length mismatch: header says {declared_len}, payload is {} bytes",
            payload.len()
        )));
    }

    Ok((type_str.parse()?, payload.to_vec()))
}
