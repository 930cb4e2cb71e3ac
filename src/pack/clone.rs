//! HTTP exchanges and top-level orchestration for cloning a repository (spec.md §4.E.1-§4.E.7).

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, instrument};

use super::header::{self, RawType};
use super::pktline::{self, Packet};
use super::{delta, inflate_exact};
use crate::error::{Error, Result};
use crate::object::ObjectType;
use crate::oid::Oid;
use crate::store::{LooseStore, ObjectStore};

/// The result of ref discovery (spec.md §4.E.1): every advertised `refname → oid`, in
/// advertisement order, plus the `HEAD` target parsed out of the `symref=HEAD:<target>`
/// capability, if the server sent one.
struct Discovery {
    refs: Vec<(String, Oid)>,
    head_target: Option<String>,
}

/// Clone the repository at `url` into a fresh directory at `dest`.
///
/// Initializes `.git` at `dest`, performs ref discovery and a full fetch, decodes the
/// resulting pack (resolving `ref_delta` objects against bases already written to the store),
/// writes every advertised ref, and points `HEAD` at the advertised default branch (falling
/// back to `refs/heads/main`).
#[instrument(skip(url), fields(url = %url))]
pub fn clone(url: &str, dest: &Path) -> Result<()> {
    let store = LooseStore::init(dest)?;
    let client = reqwest::blocking::Client::new();

    let discovery = discover_refs(&client, url)?;
    info!(refs = discovery.refs.len(), "discovered refs");
    if discovery.refs.is_empty() {
        return Ok(());
    }

    for (name, oid) in &discovery.refs {
        if name != "HEAD" {
            store.update_ref(name, *oid)?;
        }
    }

    let wants: Vec<Oid> = discovery.refs.iter().map(|(_, oid)| *oid).collect();
    let pack = request_pack(&client, url, &wants)?;
    decode_pack(&store, &pack)?;

    let head_target = discovery
        .head_target
        .filter(|target| discovery.refs.iter().any(|(name, _)| name == target))
        .unwrap_or_else(|| "refs/heads/main".to_string());
    std::fs::write(store.git_dir().join("HEAD"), format!("ref: {head_target}\n"))?;

    Ok(())
}

/// Perform the `info/refs` ref-discovery exchange (spec.md §4.E.1).
#[instrument(skip(client))]
fn discover_refs(client: &reqwest::blocking::Client, url: &str) -> Result<Discovery> {
    let response = client
        .get(format!("{url}/info/refs?service=git-upload-pack"))
        .query(&[("service", "git-upload-pack")])
        .send()
        .map_err(|e| Error::network(format!("GET info/refs failed: {e}")))?;
    if !response.status().is_success() {
        return Err(Error::network(format!(
            "GET info/refs returned status {}",
            response.status()
        )));
    }
    let body = response
        .bytes()
        .map_err(|e| Error::network(format!("failed reading info/refs body: {e}")))?;

    let packets = pktline::parse_stream(&body)?;
    let mut refs = Vec::new();
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut head_target = None;

    for packet in packets {
        let Packet::Data(payload) = packet else { continue };
        let line = std::str::from_utf8(&payload)
            .map_err(|_| Error::decode("ref advertisement is not valid UTF-8"))?
            .trim_end_matches('\n');

        if line.starts_with('#') {
            continue;
        }

        let (line, capabilities) = match line.split_once('\0') {
            Some((line, caps)) => (line, Some(caps)),
            None => (line, None),
        };

        let Some((oid_hex, refname)) = line.split_once(' ') else { continue };

        if let Some(caps) = capabilities {
            head_target = caps
                .split(' ')
                .find_map(|token| token.strip_prefix("symref=HEAD:"))
                .map(str::to_string);
        }

        // Duplicate HEAD advertisements (an alias of an already-seen oid under the literal
        // name "HEAD") are dropped; a standalone HEAD with no other ref sharing its position
        // is retained. Keying by refname makes this automatic: "HEAD" and "refs/heads/main"
        // are distinct keys even when they carry the same oid.
        if seen.contains_key(refname) {
            continue;
        }
        seen.insert(refname.to_string(), ());
        refs.push((refname.to_string(), oid_hex.parse()?));
    }

    Ok(Discovery { refs, head_target })
}

/// Perform the `git-upload-pack` fetch exchange (spec.md §4.E.3) and return the raw pack bytes.
#[instrument(skip(client, wants), fields(wants = wants.len()))]
fn request_pack(client: &reqwest::blocking::Client, url: &str, wants: &[Oid]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    body.extend_from_slice(&pktline::encode(b"command=fetch"));
    body.extend_from_slice(pktline::DELIM);
    body.extend_from_slice(&pktline::encode(b"no-progress"));
    for oid in wants {
        body.extend_from_slice(&pktline::encode(format!("want {oid}\n").as_bytes()));
    }
    body.extend_from_slice(&pktline::encode(b"done\n"));
    body.extend_from_slice(pktline::FLUSH);

    let response = client
        .post(format!("{url}/git-upload-pack"))
        .header("Git-Protocol", "version=2")
        .header("Content-Type", "application/x-git-upload-pack-request")
        .body(body)
        .send()
        .map_err(|e| Error::network(format!("POST git-upload-pack failed: {e}")))?;
    if !response.status().is_success() {
        return Err(Error::network(format!(
            "POST git-upload-pack returned status {}",
            response.status()
        )));
    }
    let body = response
        .bytes()
        .map_err(|e| Error::network(format!("failed reading git-upload-pack body: {e}")))?;

    let packets = pktline::parse_stream(&body)?;
    let mut pack = Vec::new();
    let mut in_packfile_section = false;
    for packet in packets {
        match packet {
            Packet::Data(payload) => {
                if payload.is_empty() {
                    continue;
                }
                if !in_packfile_section {
                    if payload.starts_with(b"packfile") {
                        in_packfile_section = true;
                    }
                    continue;
                }
                // Sideband framing: byte 0 is the band (1 = pack data, 2 = progress text on
                // stderr, 3 = fatal error); only band 1 carries pack bytes.
                if let Some((&band, rest)) = payload.split_first() {
                    if band == 1 {
                        pack.extend_from_slice(rest);
                    } else if band == 3 {
                        return Err(Error::network(format!(
                            "remote reported a fatal error: {}",
                            String::from_utf8_lossy(rest)
                        )));
                    }
                }
            }
            Packet::Delim | Packet::Flush => {
                if in_packfile_section && !pack.is_empty() {
                    break;
                }
            }
        }
    }

    if pack.is_empty() {
        return Err(Error::decode("no packfile section found in fetch response"));
    }
    Ok(pack)
}

/// Decode a full pack stream (spec.md §4.E.4-§4.E.6) and write every object to `store`.
#[instrument(skip(store, pack), fields(bytes = pack.len()))]
fn decode_pack(store: &LooseStore, pack: &[u8]) -> Result<()> {
    if pack.len() < 12 || &pack[0..4] != b"PACK" {
        return Err(Error::decode("pack is missing the PACK magic header"));
    }
    let version = u32::from_be_bytes(
        pack[4..8].try_into().expect("pack has ≥12 bytes, checked above"),
    );
    if version != 2 && version != 3 {
        return Err(Error::decode(format!("unsupported pack version {version}")));
    }
    let count = u32::from_be_bytes(
        pack[8..12].try_into().expect("pack has ≥12 bytes, checked above"),
    );
    debug!(version, count, "decoding pack");

    let mut pos = 12;
    for _ in 0..count {
        let header = header::decode_header(pack, &mut pos)?;
        match header.kind {
            RawType::Commit | RawType::Tree | RawType::Blob | RawType::Tag => {
                let payload = inflate_exact(pack, &mut pos, header.size)?;
                let kind = raw_type_to_object_type(header.kind)?;
                store.put(kind, &payload)?;
            }
            RawType::RefDelta => {
                if pos + 20 > pack.len() {
                    return Err(Error::decode("pack truncated before a ref_delta base oid"));
                }
                let mut base_bytes = [0u8; 20];
                base_bytes.copy_from_slice(&pack[pos..pos + 20]);
                pos += 20;
                let base_oid = Oid::from_bytes(base_bytes);

                let delta_bytes = inflate_exact(pack, &mut pos, header.size)?;
                let (base_kind, base_payload) = store.get(base_oid).map_err(|_| {
                    Error::not_found(format!(
                        "ref_delta base object {base_oid} is not in the store"
                    ))
                })?;
                let target = delta::apply(&base_payload, &delta_bytes)?;
                store.put(base_kind, &target)?;
            }
            RawType::OfsDelta => {
                return Err(Error::unsupported("ofs_delta pack objects are not supported"));
            }
        }
    }
    Ok(())
}

fn raw_type_to_object_type(kind: RawType) -> Result<ObjectType> {
    match kind {
        RawType::Commit => Ok(ObjectType::Commit),
        RawType::Tree => Ok(ObjectType::Tree),
        RawType::Blob => Ok(ObjectType::Blob),
        RawType::Tag => Ok(ObjectType::Tag),
        RawType::OfsDelta | RawType::RefDelta => {
            Err(Error::unsupported("delta object passed to raw_type_to_object_type"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn push_object_header(out: &mut Vec<u8>, type_bits: u8, size: u64) {
        let mut first = (type_bits << 4) | ((size & 0x0f) as u8);
        let mut remaining = size >> 4;
        if remaining > 0 {
            first |= 0x80;
        }
        out.push(first);
        while remaining > 0 {
            let mut byte = (remaining & 0x7f) as u8;
            remaining >>= 7;
            if remaining > 0 {
                byte |= 0x80;
            }
            out.push(byte);
        }
    }

    #[test]
    fn decode_pack_stores_a_single_blob_object() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();

        let payload = b"hello from a pack\n";
        let mut pack = Vec::new();
        pack.extend_from_slice(b"PACK");
        pack.extend_from_slice(&2u32.to_be_bytes());
        pack.extend_from_slice(&1u32.to_be_bytes());
        push_object_header(&mut pack, 3, payload.len() as u64); // type=3 blob
        pack.extend_from_slice(&deflate(payload));

        decode_pack(&store, &pack).unwrap();

        let (oid, _) = object::frame(ObjectType::Blob, payload);
        let (kind, stored) = store.get(oid).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(stored, payload);
    }

    #[test]
    fn decode_pack_resolves_a_ref_delta_against_a_stored_base() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();

        let base_payload = b"hello world";
        let base_oid = store.put(ObjectType::Blob, base_payload).unwrap();

        // delta: src_size=11, target_size=5, copy base[6..11] ("world")
        let delta_body = vec![11u8, 5u8, 0b1001_0001, 6, 5];
        let delta_compressed = deflate(&delta_body);

        let mut pack = Vec::new();
        pack.extend_from_slice(b"PACK");
        pack.extend_from_slice(&2u32.to_be_bytes());
        pack.extend_from_slice(&1u32.to_be_bytes());
        push_object_header(&mut pack, 7, delta_body.len() as u64); // type=7 ref_delta
        pack.extend_from_slice(base_oid.as_bytes());
        pack.extend_from_slice(&delta_compressed);

        decode_pack(&store, &pack).unwrap();

        let (oid, _) = object::frame(ObjectType::Blob, b"world");
        let (kind, stored) = store.get(oid).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(stored, b"world");
    }

    #[test]
    fn decode_pack_rejects_ofs_delta() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();

        let mut pack = Vec::new();
        pack.extend_from_slice(b"PACK");
        pack.extend_from_slice(&2u32.to_be_bytes());
        pack.extend_from_slice(&1u32.to_be_bytes());
        push_object_header(&mut pack, 6, 0); // type=6 ofs_delta

        assert!(decode_pack(&store, &pack).is_err());
    }

    #[test]
    fn decode_pack_rejects_missing_magic() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();
        assert!(decode_pack(&store, b"NOTAPACK...").is_err());
    }
}
