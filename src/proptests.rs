//! Property tests for the universal properties of spec.md §8: codec round-trip, `put`
//! idempotency, tree-entry ordering, and delta round-trip.

use proptest::prelude::*;
use tempfile::TempDir;

use crate::object::{self, ObjectType};
use crate::oid::Oid;
use crate::pack::delta;
use crate::store::{LooseStore, ObjectStore};
use crate::tree::{decode_entries, write_tree_from_entries, TreeEntry};

fn arb_object_type() -> impl Strategy<Value = ObjectType> {
    prop_oneof![
        Just(ObjectType::Blob),
        Just(ObjectType::Tree),
        Just(ObjectType::Commit),
        Just(ObjectType::Tag),
    ]
}

/// Builds a minimal `ref_delta`-style instruction stream that reproduces `base`'s first
/// `copy_len` bytes followed by `insert` literally, the same opcode encoding `src/pack/delta.rs`
/// decodes (spec.md §4.E.6).
fn build_copy_then_insert_delta(base_len: usize, copy_len: usize, insert: &[u8]) -> Vec<u8> {
    let mut delta = Vec::new();
    encode_varint(&mut delta, base_len as u64);
    encode_varint(&mut delta, (copy_len + insert.len()) as u64);

    if copy_len > 0 {
        // offset byte present (bit0, offset=0), size byte present (bit4).
        delta.push(0b1001_0001);
        delta.push(0); // offset = 0
        delta.push(copy_len as u8);
    }
    for chunk in insert.chunks(127) {
        delta.push(chunk.len() as u8);
        delta.extend_from_slice(chunk);
    }
    delta
}

fn encode_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

proptest! {
    /// `split_header(inflate(deflate(frame(t, b))))` recovers the original type and payload,
    /// for any type and any byte string (spec.md §8: "For any byte string b and type
    /// t ... get(put(t,b)) = (t,b)", checked here at the pure-codec layer).
    #[test]
    fn codec_round_trips(kind in arb_object_type(), payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let (_, framed) = object::frame(kind, &payload);
        let compressed = object::deflate(&framed).unwrap();
        let inflated = object::inflate(&compressed).unwrap();
        let (decoded_kind, decoded_payload) = object::split_header(&inflated).unwrap();
        prop_assert_eq!(decoded_kind, kind);
        prop_assert_eq!(decoded_payload, payload);
    }

    /// `put` is idempotent: writing the same bytes twice yields the same oid and leaves the
    /// object file byte-identical on disk (spec.md §8).
    #[test]
    fn put_is_idempotent(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();

        let first = store.put(ObjectType::Blob, &payload).unwrap();
        let (_, first_bytes) = store.get(first).unwrap();
        let second = store.put(ObjectType::Blob, &payload).unwrap();
        let (_, second_bytes) = store.get(second).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_bytes, second_bytes);
    }

    /// Tree entries built from an arbitrary set of distinct names come back out of the store
    /// strictly increasing by name bytes (spec.md §8: "Tree entries emitted by (C) are
    /// strictly increasing by name").
    #[test]
    fn tree_entries_are_strictly_increasing_by_name(
        mut names in proptest::collection::hash_set("[a-zA-Z0-9_]{1,12}", 1..20)
    ) {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::init(dir.path()).unwrap();

        let mut names: Vec<String> = names.drain().collect();
        names.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));

        let entries: Vec<TreeEntry> = names
            .iter()
            .map(|name| TreeEntry {
                mode: crate::tree::Mode::Blob,
                name: name.clone(),
                oid: Oid::ZERO,
            })
            .collect();

        let tree_oid = write_tree_from_entries(&store, &entries).unwrap();
        let (_, payload) = store.get(tree_oid).unwrap();
        let decoded = decode_entries(&payload).unwrap();

        prop_assert_eq!(decoded.len(), names.len());
        for pair in decoded.windows(2) {
            prop_assert!(pair[0].name.as_bytes() < pair[1].name.as_bytes());
        }
    }

    /// Applying a delta built against a given base reproduces the intended target byte-for-byte,
    /// and the output length matches the declared target size (spec.md §8: "Delta application:
    /// for any base B and delta Δ produced against B, applying Δ reproduces the original target
    /// byte-for-byte; output length equals declared target size").
    #[test]
    fn delta_round_trips(
        base in proptest::collection::vec(any::<u8>(), 0..256),
        copy_fraction in 0usize..=100,
        insert in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let copy_len = base.len() * copy_fraction / 100;
        let delta_bytes = build_copy_then_insert_delta(base.len(), copy_len, &insert);

        let mut target = base[..copy_len].to_vec();
        target.extend_from_slice(&insert);

        let out = delta::apply(&base, &delta_bytes).unwrap();
        prop_assert_eq!(out.len(), target.len());
        prop_assert_eq!(out, target);
    }
}
