//! Component E: discover refs, request a pack, decode it, and resolve deltas (spec.md §4.E).

pub mod clone;
pub mod delta;
pub mod header;
pub mod pktline;

pub use clone::clone;

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::{Error, Result};

/// Inflate exactly one object's worth of zlib-compressed bytes from `data[*pos..]`, advancing
/// `*pos` past only the compressed bytes this object consumed.
///
/// Pack entries give no compressed-length prefix (spec.md §4.E.5), so a decoder that simply
/// inflates "the rest of the buffer" has no way to know where the next object begins. Using
/// `flate2`'s low-level `Decompress` (rather than the `Read`-wrapping `ZlibDecoder`) exposes
/// `total_in`/`total_out`, which this function uses to stop at the zlib stream's own end
/// marker — the approach spec.md §9 ("Delta streaming") calls for.
pub fn inflate_exact(data: &[u8], pos: &mut usize, expected_size: u64) -> Result<Vec<u8>> {
    let mut decompress = Decompress::new(true);
    let mut out = vec![0u8; expected_size as usize];
    let mut out_written = 0usize;

    loop {
        let input = data.get(*pos..).ok_or_else(|| {
            Error::decode("pack truncated inside a compressed object stream")
        })?;
        if input.is_empty() {
            return Err(Error::decode("pack truncated inside a compressed object stream"));
        }

        let in_before = decompress.total_in();
        let out_before = decompress.total_out();
        let status = decompress
            .decompress(input, &mut out[out_written..], FlushDecompress::None)
            .map_err(|e| Error::decode(format!("zlib inflate failed: {e}")))?;

        *pos += (decompress.total_in() - in_before) as usize;
        out_written += (decompress.total_out() - out_before) as usize;

        match status {
            Status::StreamEnd => break,
            Status::Ok => {
                if decompress.total_in() - in_before == 0 {
                    return Err(Error::decode(
                        "zlib inflate made no progress before end of pack",
                    ));
                }
            }
            Status::BufError => {
                return Err(Error::decode("zlib inflate buffer error decoding pack object"))
            }
        }
    }

    if out_written as u64 != expected_size {
        return Err(Error::decode(format!(
            "pack object declared size {expected_size} but inflated to {out_written} bytes"
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn inflate_exact_stops_at_the_stream_end_and_leaves_trailing_bytes_untouched() {
        let payload = b"hello pack object";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut buffer = compressed.clone();
        buffer.extend_from_slice(b"TRAILING-BYTES-FROM-THE-NEXT-OBJECT");

        let mut pos = 0;
        let out = inflate_exact(&buffer, &mut pos, payload.len() as u64).unwrap();
        assert_eq!(out, payload);
        assert_eq!(pos, compressed.len());
    }

    #[test]
    fn inflate_exact_rejects_size_mismatch() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"short").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut pos = 0;
        assert!(inflate_exact(&compressed, &mut pos, 9999).is_err());
    }
}
