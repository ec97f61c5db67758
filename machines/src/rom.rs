//! Monitor ROM loading and validation.
//!
//! The Sol-20 boots into a 2 KiB monitor (normally SOLOS) mapped at
//! 0xC000. Dumps circulate under various names; validation is by size
//! always and by CRC-32 when the caller knows which dump it expects.

use std::fmt;
use std::path::Path;

/// Size of the write-protected ROM window the image must fit.
pub const ROM_WINDOW: usize = 0x0800;

/// Errors that can occur when loading a monitor ROM image.
#[derive(Debug)]
pub enum RomError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),

    /// Image is larger than the 2 KiB ROM window.
    Oversize { size: usize },

    /// CRC-32 does not match the expected dump.
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Oversize { size } => {
                write!(f, "ROM image is {size} bytes; the window holds {ROM_WINDOW}")
            }
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "ROM CRC32 expected 0x{expected:08X}, got 0x{actual:08X}"
            ),
        }
    }
}

impl std::error::Error for RomError {}

impl From<std::io::Error> for RomError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Compute the CRC-32 checksum of a byte slice (reflected polynomial
/// 0xEDB88320 — the ZIP/PNG algorithm).
fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// A validated monitor ROM image, ready to overlay at 0xC000.
pub struct MonitorRom {
    data: Vec<u8>,
}

impl MonitorRom {
    /// Accept an image that fits the ROM window.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RomError> {
        if bytes.len() > ROM_WINDOW {
            return Err(RomError::Oversize { size: bytes.len() });
        }
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    /// Read an image from disk.
    pub fn from_file(path: &Path) -> Result<Self, RomError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Check the image against a known dump's CRC-32.
    pub fn verify_checksum(&self, expected: u32) -> Result<(), RomError> {
        let actual = crc32(&self.data);
        if actual != expected {
            return Err(RomError::ChecksumMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}
