//! Superblock - stored in [`FS_SUPERBLOCK_SECTOR`]

use crate::StorageError;
use hal::SECTOR_SIZE;
use serde::{Deserialize, Serialize};

/// Magic number for validation
pub const FS_MAGIC: u32 = 0x534F_584F;
/// Version of the storage format
pub const FS_VERSION: u32 = 1;
/// Sector holding the superblock, after the loader and the kernel
pub const FS_SUPERBLOCK_SECTOR: u64 = 2048;
/// First payload sector, right after the superblock
pub const FS_DATA_START_SECTOR: u64 = 2049;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superblock {
    /// Magic number for validation
    pub magic: u32,
    /// Version of the storage format
    pub version: u32,
    /// Number of live table entries
    pub entry_count: u32,
    /// First sector of the payload
    pub first_data_sector: u64,
    /// Payload length in bytes
    pub payload_len: u64,
    /// CRC32 of the payload
    pub checksum: u32,
}

impl Superblock {
    /// Describes a payload written at [`FS_DATA_START_SECTOR`]
    pub fn for_payload(entry_count: usize, payload: &[u8]) -> Self {
        Self {
            magic: FS_MAGIC,
            version: FS_VERSION,
            entry_count: entry_count as u32,
            first_data_sector: FS_DATA_START_SECTOR,
            payload_len: payload.len() as u64,
            checksum: crc32fast::hash(payload),
        }
    }

    /// Number of sectors the payload spans
    pub fn payload_sectors(&self) -> u64 {
        self.payload_len.div_ceil(SECTOR_SIZE as u64)
    }

    /// Encodes into one zero-padded sector
    pub fn to_sector(&self) -> Result<[u8; SECTOR_SIZE], StorageError> {
        let json = serde_json::to_vec(self)?;
        if json.len() >= SECTOR_SIZE {
            return Err(StorageError::Corrupt("superblock exceeds one sector".to_string()));
        }
        let mut sector = [0u8; SECTOR_SIZE];
        sector[..json.len()].copy_from_slice(&json);
        Ok(sector)
    }

    /// Decodes a superblock sector
    ///
    /// An all-zero sector or a foreign magic number means the device was
    /// never formatted.
    pub fn from_sector(sector: &[u8]) -> Result<Self, StorageError> {
        // Find the end of JSON (first null or end of sector)
        let json_end = sector.iter().position(|&b| b == 0).unwrap_or(sector.len());
        if json_end == 0 {
            return Err(StorageError::Unformatted);
        }

        let superblock: Superblock = serde_json::from_slice(&sector[..json_end])
            .map_err(|_| StorageError::Unformatted)?;

        if superblock.magic != FS_MAGIC {
            return Err(StorageError::Unformatted);
        }
        if superblock.version != FS_VERSION {
            return Err(StorageError::UnsupportedVersion(superblock.version));
        }
        Ok(superblock)
    }
}
