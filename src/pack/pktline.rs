//! pkt-line framing: the length-prefixed record format the smart-HTTP transport uses for both
//! ref discovery and the fetch request/response bodies (spec.md §4.E.1, §4.E.3; GLOSSARY).

use crate::error::{Error, Result};

/// A single decoded pkt-line record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// `0000` — ends a section.
    Flush,
    /// `0001`-`0003` — a delimiter within a section (no payload).
    Delim,
    /// A regular data record; `payload` excludes the 4-byte length header.
    Data(Vec<u8>),
}

/// Parse an entire pkt-line stream into its packets.
pub fn parse_stream(bytes: &[u8]) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if pos + 4 > bytes.len() {
            return Err(Error::decode("truncated pkt-line length header"));
        }
        let len_hex = std::str::from_utf8(&bytes[pos..pos + 4])
            .map_err(|_| Error::decode("pkt-line length header is not ASCII hex"))?;
        let len = usize::from_str_radix(len_hex, 16)
            .map_err(|_| Error::decode(format!("invalid pkt-line length header '{len_hex}'")))?;
        pos += 4;
        match len {
            0 => packets.push(Packet::Flush),
            1..=3 => packets.push(Packet::Delim),
            n => {
                let payload_len = n - 4;
                if pos + payload_len > bytes.len() {
                    return Err(Error::decode("pkt-line payload runs past end of stream"));
                }
                packets.push(Packet::Data(bytes[pos..pos + payload_len].to_vec()));
                pos += payload_len;
            }
        }
    }
    Ok(packets)
}

/// Encode `payload` as a single data pkt-line (4-hex-digit length header + payload, verbatim).
#[must_use]
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() + 4;
    let mut out = format!("{len:04x}").into_bytes();
    out.extend_from_slice(payload);
    out
}

/// The literal bytes of a flush packet.
pub const FLUSH: &[u8] = b"0000";
/// The literal bytes of a delimiter packet.
pub const DELIM: &[u8] = b"0001";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_four_byte_added_for_the_header() {
        assert_eq!(encode(b"command=fetch"), b"0011command=fetch");
        assert_eq!(encode(b"no-progress"), b"000fno-progress");
        assert_eq!(encode(b"done\n"), b"0009done\n");
    }

    #[test]
    fn parses_flush_delim_and_data() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&encode(b"hello"));
        stream.extend_from_slice(DELIM);
        stream.extend_from_slice(FLUSH);

        let packets = parse_stream(&stream).unwrap();
        assert_eq!(
            packets,
            vec![
                Packet::Data(b"hello".to_vec()),
                Packet::Delim,
                Packet::Flush,
            ]
        );
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(parse_stream(b"001").is_err());
    }

    #[test]
    fn rejects_payload_shorter_than_declared() {
        assert!(parse_stream(b"0010ab").is_err());
    }
}
