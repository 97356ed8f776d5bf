//! # Storage Service
//!
//! This crate persists the namespace table to a block device.
//!
//! ## On-disk layout
//!
//! - Sector [`FS_SUPERBLOCK_SECTOR`]: the [`Superblock`], JSON encoded and
//!   zero padded (magic, version, entry count, first data sector, payload
//!   length, CRC32 of the payload)
//! - Sectors from [`FS_DATA_START_SECTOR`]: the payload, a JSON array of
//!   [`EntryRecord`] values in table order
//!
//! Saving writes the payload first and the superblock last. Loading checks
//! magic, version and checksum, then rebuilds the table and re-validates
//! every table invariant before handing it back.

pub mod failing_device;
pub mod record;
pub mod store;
pub mod superblock;

pub use failing_device::{FailingBlockDevice, FailurePolicy};
pub use record::EntryRecord;
pub use store::{SaveReport, StorageError, TableStore};
pub use superblock::{
    Superblock, FS_DATA_START_SECTOR, FS_MAGIC, FS_SUPERBLOCK_SECTOR, FS_VERSION,
};
