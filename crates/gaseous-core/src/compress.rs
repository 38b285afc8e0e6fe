//! Multi-algorithm compression dispatch.
//!
//! Maps the frame header's algorithm id onto concrete codecs. Everything
//! here is stateless; input and output are plain byte buffers.

use std::fmt;
use std::io::{Read, Write};

use thiserror::Error;

/// Upper bound on decompressed output. A crafted payload may expand far
/// beyond its wire size; anything past this cap is a
/// `DecompressionFailure`, not an allocation. Handshake messages are at
/// most 64 KiB, so the bound is generous.
pub const MAX_DECOMPRESSED_LEN: usize = 256 * 1024;

/// Compression algorithm ids as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Algo {
    None = 0,
    Flate = 1,
    Gzip = 2,
    Brotli = 3,
    Zstd = 4,
    Lz4 = 5,
    Xz = 6,
    /// A raw frameless LZ4 block behind a 4-byte big-endian
    /// uncompressed-length prefix. Distinct from [`Algo::Lz4`], which uses
    /// the LZ4 frame format.
    Lz4Block = 7,
}

impl Algo {
    pub const ALL: [Algo; 8] = [
        Algo::None,
        Algo::Flate,
        Algo::Gzip,
        Algo::Brotli,
        Algo::Zstd,
        Algo::Lz4,
        Algo::Xz,
        Algo::Lz4Block,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Algo {
    type Error = CompressError;

    fn try_from(v: u8) -> Result<Self, CompressError> {
        match v {
            0 => Ok(Algo::None),
            1 => Ok(Algo::Flate),
            2 => Ok(Algo::Gzip),
            3 => Ok(Algo::Brotli),
            4 => Ok(Algo::Zstd),
            5 => Ok(Algo::Lz4),
            6 => Ok(Algo::Xz),
            7 => Ok(Algo::Lz4Block),
            other => Err(CompressError::UnsupportedAlgorithm(other)),
        }
    }
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algo::None => "none",
            Algo::Flate => "flate",
            Algo::Gzip => "gzip",
            Algo::Brotli => "brotli",
            Algo::Zstd => "zstd",
            Algo::Lz4 => "lz4",
            Algo::Xz => "xz",
            Algo::Lz4Block => "lz4-block",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("unsupported compression algorithm id {0}")]
    UnsupportedAlgorithm(u8),
    #[error("{0} compression failed: {1}")]
    CompressionFailure(Algo, String),
    #[error("{0} decompression failed: {1}")]
    DecompressionFailure(Algo, String),
}

/// Compress `data` with the given algorithm.
pub fn compress(algo: Algo, data: &[u8]) -> Result<Vec<u8>, CompressError> {
    let fail = |e: std::io::Error| CompressError::CompressionFailure(algo, e.to_string());
    match algo {
        Algo::None => Ok(data.to_vec()),
        Algo::Flate => {
            let mut enc =
                flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
            enc.write_all(data).map_err(fail)?;
            enc.finish().map_err(fail)
        }
        Algo::Gzip => {
            let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
            enc.write_all(data).map_err(fail)?;
            enc.finish().map_err(fail)
        }
        Algo::Brotli => {
            let mut out = Vec::new();
            {
                // quality 11, lgwin 22: best ratio, the sizes here are tiny
                let mut w = brotli::CompressorWriter::new(&mut out, 4096, 11, 22);
                w.write_all(data).map_err(fail)?;
            }
            Ok(out)
        }
        Algo::Zstd => zstd::stream::encode_all(data, 0).map_err(fail),
        Algo::Lz4 => {
            let mut enc = lz4_flex::frame::FrameEncoder::new(Vec::new());
            enc.write_all(data).map_err(fail)?;
            enc.finish()
                .map_err(|e| CompressError::CompressionFailure(algo, e.to_string()))
        }
        Algo::Xz => {
            let mut out = Vec::new();
            xz2::read::XzEncoder::new(data, 6)
                .read_to_end(&mut out)
                .map_err(fail)?;
            Ok(out)
        }
        Algo::Lz4Block => {
            if data.len() > u32::MAX as usize {
                return Err(CompressError::CompressionFailure(
                    algo,
                    "input exceeds the 4-byte length prefix".into(),
                ));
            }
            let block = lz4_flex::block::compress(data);
            let mut out = Vec::with_capacity(4 + block.len());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(&block);
            Ok(out)
        }
    }
}

/// Decompress with the default [`MAX_DECOMPRESSED_LEN`] output bound.
pub fn decompress(algo: Algo, data: &[u8]) -> Result<Vec<u8>, CompressError> {
    decompress_bounded(algo, data, MAX_DECOMPRESSED_LEN)
}

/// Decompress `data`, failing once the output would exceed `limit` bytes.
pub fn decompress_bounded(
    algo: Algo,
    data: &[u8],
    limit: usize,
) -> Result<Vec<u8>, CompressError> {
    match algo {
        Algo::None => {
            if data.len() > limit {
                return Err(oversized(algo, limit));
            }
            Ok(data.to_vec())
        }
        Algo::Flate => read_bounded(algo, flate2::read::DeflateDecoder::new(data), limit),
        Algo::Gzip => read_bounded(algo, flate2::read::GzDecoder::new(data), limit),
        Algo::Brotli => read_bounded(algo, brotli::Decompressor::new(data, 4096), limit),
        Algo::Zstd => {
            let dec = zstd::stream::read::Decoder::new(data)
                .map_err(|e| CompressError::DecompressionFailure(algo, e.to_string()))?;
            read_bounded(algo, dec, limit)
        }
        Algo::Lz4 => read_bounded(algo, lz4_flex::frame::FrameDecoder::new(data), limit),
        Algo::Xz => read_bounded(algo, xz2::read::XzDecoder::new(data), limit),
        Algo::Lz4Block => {
            if data.len() < 4 {
                return Err(CompressError::DecompressionFailure(
                    algo,
                    "truncated length prefix".into(),
                ));
            }
            let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if declared > limit {
                return Err(oversized(algo, limit));
            }
            let mut out = vec![0u8; declared];
            let written = lz4_flex::block::decompress_into(&data[4..], &mut out)
                .map_err(|e| CompressError::DecompressionFailure(algo, e.to_string()))?;
            if written != declared {
                return Err(CompressError::DecompressionFailure(
                    algo,
                    format!("block produced {written} bytes, prefix declared {declared}"),
                ));
            }
            Ok(out)
        }
    }
}

fn read_bounded<R: Read>(algo: Algo, reader: R, limit: usize) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CompressError::DecompressionFailure(algo, e.to_string()))?;
    if out.len() > limit {
        return Err(oversized(algo, limit));
    }
    Ok(out)
}

fn oversized(algo: Algo, limit: usize) -> CompressError {
    CompressError::DecompressionFailure(algo, format!("output exceeds the {limit}-byte bound"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        // Compressible but not degenerate input.
        let mut data = Vec::new();
        for i in 0..512u32 {
            data.extend_from_slice(&(i % 37).to_be_bytes());
        }
        data
    }

    #[test]
    fn round_trip_every_algorithm() {
        let data = sample();
        for algo in Algo::ALL {
            let packed = compress(algo, &data).unwrap();
            let unpacked = decompress(algo, &packed).unwrap();
            assert_eq!(unpacked, data, "{algo} round trip");
        }
    }

    #[test]
    fn round_trip_empty_input() {
        for algo in Algo::ALL {
            let packed = compress(algo, b"").unwrap();
            assert_eq!(decompress(algo, &packed).unwrap(), b"");
        }
    }

    #[test]
    fn unknown_algorithm_id_is_rejected() {
        assert!(matches!(
            Algo::try_from(99),
            Err(CompressError::UnsupportedAlgorithm(99))
        ));
    }

    #[test]
    fn lz4_block_carries_length_prefix() {
        let data = sample();
        let packed = compress(Algo::Lz4Block, &data).unwrap();
        let declared = u32::from_be_bytes([packed[0], packed[1], packed[2], packed[3]]);
        assert_eq!(declared as usize, data.len());
    }

    #[test]
    fn lz4_block_rejects_lying_prefix() {
        let data = sample();
        let mut packed = compress(Algo::Lz4Block, &data).unwrap();
        // Claim one byte more than the block really holds.
        let lie = (data.len() + 1) as u32;
        packed[..4].copy_from_slice(&lie.to_be_bytes());
        assert!(matches!(
            decompress(Algo::Lz4Block, &packed),
            Err(CompressError::DecompressionFailure(Algo::Lz4Block, _))
        ));
    }

    #[test]
    fn lz4_block_rejects_truncated_prefix() {
        assert!(matches!(
            decompress(Algo::Lz4Block, &[0x00, 0x01]),
            Err(CompressError::DecompressionFailure(Algo::Lz4Block, _))
        ));
    }

    #[test]
    fn decompression_bound_is_enforced() {
        let big = vec![0u8; 4096];
        let packed = compress(Algo::Gzip, &big).unwrap();
        assert!(matches!(
            decompress_bounded(Algo::Gzip, &packed, 1024),
            Err(CompressError::DecompressionFailure(Algo::Gzip, _))
        ));
        // And the lz4-block prefix is checked before allocating.
        let packed = compress(Algo::Lz4Block, &big).unwrap();
        assert!(matches!(
            decompress_bounded(Algo::Lz4Block, &packed, 1024),
            Err(CompressError::DecompressionFailure(Algo::Lz4Block, _))
        ));
    }

    #[test]
    fn garbage_input_fails_cleanly() {
        let garbage = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03];
        for algo in [Algo::Flate, Algo::Gzip, Algo::Zstd, Algo::Lz4, Algo::Xz] {
            assert!(
                decompress(algo, &garbage).is_err(),
                "{algo} must reject garbage"
            );
        }
    }
}
