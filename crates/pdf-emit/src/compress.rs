//! Pluggable stream compression

use crate::Result;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt;
use std::io::{self, Read, Write};

/// A byte-stream transform applied to stream payloads.
///
/// Implementations must be lossless for the filter they name. Writers size
/// scratch buffers with [`Compressor::bound`], so it must never be smaller
/// than the real output.
pub trait Compressor: fmt::Debug {
    /// Filter name written in `/Filter`, `None` for pass-through
    fn filter(&self) -> Option<&'static str>;

    /// Compress an in-memory buffer
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Compress everything readable from `input` straight into `output`
    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()>;

    /// Worst-case compressed size for `len` input bytes
    fn bound(&self, len: usize) -> usize;
}

/// zlib/deflate compression (`/FlateDecode`)
#[derive(Debug, Clone, Copy)]
pub struct Flate {
    level: Compression,
}

impl Flate {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for Flate {
    fn default() -> Self {
        Self {
            level: Compression::best(),
        }
    }
}

impl Compressor for Flate {
    fn filter(&self) -> Option<&'static str> {
        Some("FlateDecode")
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            ZlibEncoder::new(Vec::with_capacity(self.bound(data.len())), self.level);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut encoder = ZlibEncoder::new(output, self.level);
        io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    fn bound(&self, len: usize) -> usize {
        // zlib's compressBound
        len + (len >> 12) + (len >> 14) + (len >> 25) + 13
    }
}

/// Pass-through transform, used when compression is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Compressor for Identity {
    fn filter(&self) -> Option<&'static str> {
        None
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn compress_stream(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        io::copy(input, output)?;
        Ok(())
    }

    fn bound(&self, len: usize) -> usize {
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_flate_compress_within_bound() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 251) as u8).collect();
        let flate = Flate::default();
        let compressed = flate.compress(&data).unwrap();
        assert!(compressed.len() <= flate.bound(data.len()));
        assert_eq!(inflate(&compressed), data);
    }

    #[test]
    fn test_flate_stream_matches_buffer() {
        let data = b"q 1 0 0 1 0 0 cm Q ".repeat(50);
        let flate = Flate::default();
        let mut out = Vec::new();
        flate.compress_stream(&mut &data[..], &mut out).unwrap();
        assert_eq!(inflate(&out), data);
    }

    #[test]
    fn test_identity() {
        let id = Identity;
        assert_eq!(id.filter(), None);
        assert_eq!(id.compress(b"abc").unwrap(), b"abc");
        assert_eq!(id.bound(3), 3);
        let mut out = Vec::new();
        id.compress_stream(&mut &b"xyz"[..], &mut out).unwrap();
        assert_eq!(out, b"xyz");
    }
}
