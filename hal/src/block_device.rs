//! Block device abstraction for storage
//!
//! Provides a minimal sector-level API for reading and writing fixed-size
//! sectors. The namespace image is stored through this interface.

use thiserror::Error;

/// Sector size in bytes
pub const SECTOR_SIZE: usize = 512;

/// Block device errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// Sector index out of bounds
    #[error("sector index out of bounds")]
    OutOfBounds,
    /// I/O error (hardware failure, timeout, etc.)
    #[error("I/O error")]
    IoError,
    /// Device not ready
    #[error("device not ready")]
    NotReady,
    /// Buffer smaller than a sector
    #[error("invalid buffer size")]
    InvalidSize,
}

/// Block device trait
///
/// All operations work with whole sectors of [`SECTOR_SIZE`] bytes.
pub trait BlockDevice {
    /// Total number of sectors on this device
    fn sector_count(&self) -> u64;

    /// Read a sector into `buffer`
    ///
    /// # Errors
    /// Returns `BlockError::OutOfBounds` if `sector >= sector_count()`
    /// Returns `BlockError::InvalidSize` if `buffer` is shorter than a sector
    fn read_sector(&mut self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockError>;

    /// Write a sector from `buffer`
    ///
    /// # Errors
    /// Returns `BlockError::OutOfBounds` if `sector >= sector_count()`
    /// Returns `BlockError::InvalidSize` if `buffer` is shorter than a sector
    fn write_sector(&mut self, sector: u64, buffer: &[u8]) -> Result<(), BlockError>;

    /// Make all previous writes durable
    fn flush(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
}

impl<D: BlockDevice + ?Sized> BlockDevice for &mut D {
    fn sector_count(&self) -> u64 {
        (**self).sector_count()
    }

    fn read_sector(&mut self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockError> {
        (**self).read_sector(sector, buffer)
    }

    fn write_sector(&mut self, sector: u64, buffer: &[u8]) -> Result<(), BlockError> {
        (**self).write_sector(sector, buffer)
    }

    fn flush(&mut self) -> Result<(), BlockError> {
        (**self).flush()
    }
}

/// RAM disk - an in-memory block device
///
/// Data is lost when the disk is dropped unless the image is copied out
/// with [`RamDisk::image`].
#[derive(Debug, Clone)]
pub struct RamDisk {
    bytes: Vec<u8>,
}

impl RamDisk {
    /// Creates a zeroed disk with `sector_count` sectors
    pub fn new(sector_count: usize) -> Self {
        Self {
            bytes: vec![0; sector_count * SECTOR_SIZE],
        }
    }

    /// Wraps an existing image, padding it to a whole number of sectors
    pub fn from_image(mut image: Vec<u8>) -> Self {
        let remainder = image.len() % SECTOR_SIZE;
        if remainder != 0 {
            image.resize(image.len() + SECTOR_SIZE - remainder, 0);
        }
        Self { bytes: image }
    }

    /// Raw disk contents
    pub fn image(&self) -> &[u8] {
        &self.bytes
    }

    fn range(&self, sector: u64, len: usize) -> Result<core::ops::Range<usize>, BlockError> {
        if sector >= self.sector_count() {
            return Err(BlockError::OutOfBounds);
        }
        if len < SECTOR_SIZE {
            return Err(BlockError::InvalidSize);
        }
        let start = sector as usize * SECTOR_SIZE;
        Ok(start..start + SECTOR_SIZE)
    }
}

impl BlockDevice for RamDisk {
    fn sector_count(&self) -> u64 {
        (self.bytes.len() / SECTOR_SIZE) as u64
    }

    fn read_sector(&mut self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockError> {
        let range = self.range(sector, buffer.len())?;
        buffer[..SECTOR_SIZE].copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_sector(&mut self, sector: u64, buffer: &[u8]) -> Result<(), BlockError> {
        let range = self.range(sector, buffer.len())?;
        self.bytes[range].copy_from_slice(&buffer[..SECTOR_SIZE]);
        Ok(())
    }
}
