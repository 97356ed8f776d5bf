//! Save and load of the namespace table

use crate::{EntryRecord, Superblock, FS_DATA_START_SECTOR, FS_SUPERBLOCK_SECTOR};
use fs_table::{Entry, InvariantViolation, Limits, NamespaceTable, MAX_NAME_LEN};
use hal::{BlockDevice, BlockError, SECTOR_SIZE};
use thiserror::Error;

/// Per-entry JSON framing overhead, generous upper bound
const RECORD_OVERHEAD: usize = 96;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("block device error: {0}")]
    Block(#[from] BlockError),

    #[error("no FoxOS file system on device")]
    Unformatted,

    #[error("unsupported file system version {0}")]
    UnsupportedVersion(u32),

    #[error("payload checksum mismatch (expected {expected:#010x}, found {found:#010x})")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("corrupt image: {0}")]
    Corrupt(String),

    #[error("image violates table invariants: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("device too small: need {needed} sectors, have {available}")]
    NoSpace { needed: u64, available: u64 },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub entries: usize,
    pub payload_len: usize,
    pub sectors: u64,
}

/// Persists a [`NamespaceTable`] on a block device
pub struct TableStore<D: BlockDevice> {
    device: D,
}

impl<D: BlockDevice> TableStore<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Sectors a device needs to hold any table within `limits`
    ///
    /// Saturates instead of overflowing; limits that passed
    /// [`Limits::validate`] stay far below that.
    pub fn required_sectors(limits: Limits) -> u64 {
        // Names may be escaped to six bytes per character, content is hex
        let per_entry = ((6 * MAX_NAME_LEN + RECORD_OVERHEAD) as u64)
            .saturating_add(2u64.saturating_mul(limits.max_file_size as u64));
        let payload = (limits.max_entries.max(1) as u64).saturating_mul(per_entry);
        FS_DATA_START_SECTOR.saturating_add(payload.div_ceil(SECTOR_SIZE as u64))
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    /// Returns true if the device carries a readable superblock
    pub fn is_formatted(&mut self) -> Result<bool, StorageError> {
        match self.read_superblock() {
            Ok(_) => Ok(true),
            Err(StorageError::Unformatted) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Writes an image holding only the root directory
    pub fn format(&mut self, limits: Limits) -> Result<SaveReport, StorageError> {
        self.save(&NamespaceTable::new(limits))
    }

    /// Writes the table to the device
    ///
    /// The payload goes first and the superblock last, so a failed save
    /// never produces an image whose superblock describes data that was
    /// not written.
    pub fn save(&mut self, table: &NamespaceTable) -> Result<SaveReport, StorageError> {
        let records: Vec<EntryRecord> = table.entries().iter().map(EntryRecord::from).collect();
        let payload = serde_json::to_vec(&records)?;
        let superblock = Superblock::for_payload(records.len(), &payload);

        let needed = FS_DATA_START_SECTOR + superblock.payload_sectors();
        let available = self.device.sector_count();
        if needed > available {
            return Err(StorageError::NoSpace { needed, available });
        }

        let mut sector = [0u8; SECTOR_SIZE];
        for (i, chunk) in payload.chunks(SECTOR_SIZE).enumerate() {
            sector.fill(0);
            sector[..chunk.len()].copy_from_slice(chunk);
            self.device
                .write_sector(FS_DATA_START_SECTOR + i as u64, &sector)?;
        }

        self.device
            .write_sector(FS_SUPERBLOCK_SECTOR, &superblock.to_sector()?)?;
        self.device.flush()?;

        Ok(SaveReport {
            entries: records.len(),
            payload_len: payload.len(),
            sectors: superblock.payload_sectors() + 1,
        })
    }

    /// Reads the table back, re-validating every invariant
    pub fn load(&mut self, limits: Limits) -> Result<NamespaceTable, StorageError> {
        let superblock = self.read_superblock()?;

        let end = superblock
            .first_data_sector
            .checked_add(superblock.payload_sectors())
            .ok_or_else(|| StorageError::Corrupt("payload length overflows".to_string()))?;
        if superblock.first_data_sector <= FS_SUPERBLOCK_SECTOR || end > self.device.sector_count()
        {
            return Err(StorageError::Corrupt(format!(
                "payload sectors {}..{} lie outside the device",
                superblock.first_data_sector, end
            )));
        }

        let mut payload = Vec::with_capacity(superblock.payload_len as usize);
        let mut sector = [0u8; SECTOR_SIZE];
        for index in superblock.first_data_sector..end {
            self.device.read_sector(index, &mut sector)?;
            payload.extend_from_slice(&sector);
        }
        payload.truncate(superblock.payload_len as usize);

        let found = crc32fast::hash(&payload);
        if found != superblock.checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: superblock.checksum,
                found,
            });
        }

        let records: Vec<EntryRecord> = serde_json::from_slice(&payload)
            .map_err(|e| StorageError::Corrupt(format!("payload: {}", e)))?;
        if records.len() != superblock.entry_count as usize {
            return Err(StorageError::Corrupt(format!(
                "superblock lists {} entries, payload holds {}",
                superblock.entry_count,
                records.len()
            )));
        }

        let entries = records
            .into_iter()
            .map(EntryRecord::into_entry)
            .collect::<Result<Vec<Entry>, _>>()?;

        Ok(NamespaceTable::from_entries(limits, entries)?)
    }

    fn read_superblock(&mut self) -> Result<Superblock, StorageError> {
        if self.device.sector_count() <= FS_SUPERBLOCK_SECTOR {
            return Err(StorageError::Unformatted);
        }
        let mut sector = [0u8; SECTOR_SIZE];
        self.device.read_sector(FS_SUPERBLOCK_SECTOR, &mut sector)?;
        Superblock::from_sector(&sector)
    }
}
