//! File-backed block device for the host

use hal::{BlockDevice, BlockError, SECTOR_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Disk image stored in a regular file
///
/// The image is grown to the requested size when opened; an existing
/// larger image keeps its size.
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    sectors: u64,
}

impl FileDisk {
    pub fn open(path: impl AsRef<Path>, min_sectors: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let min_len = min_sectors * SECTOR_SIZE as u64;
        if file.metadata()?.len() < min_len {
            file.set_len(min_len)?;
        }
        let sectors = file.metadata()?.len() / SECTOR_SIZE as u64;

        Ok(Self { file, sectors })
    }

    fn seek_to(&mut self, sector: u64, buffer_len: usize) -> Result<(), BlockError> {
        if sector >= self.sectors {
            return Err(BlockError::OutOfBounds);
        }
        if buffer_len < SECTOR_SIZE {
            return Err(BlockError::InvalidSize);
        }
        self.file
            .seek(SeekFrom::Start(sector * SECTOR_SIZE as u64))
            .map_err(|_| BlockError::IoError)?;
        Ok(())
    }
}

impl BlockDevice for FileDisk {
    fn sector_count(&self) -> u64 {
        self.sectors
    }

    fn read_sector(&mut self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockError> {
        self.seek_to(sector, buffer.len())?;
        self.file
            .read_exact(&mut buffer[..SECTOR_SIZE])
            .map_err(|_| BlockError::IoError)
    }

    fn write_sector(&mut self, sector: u64, buffer: &[u8]) -> Result<(), BlockError> {
        self.seek_to(sector, buffer.len())?;
        self.file
            .write_all(&buffer[..SECTOR_SIZE])
            .map_err(|_| BlockError::IoError)
    }

    fn flush(&mut self) -> Result<(), BlockError> {
        self.file.sync_data().map_err(|_| BlockError::IoError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_image_is_sized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fox.img");

        let disk = FileDisk::open(&path, 8).unwrap();
        assert_eq!(disk.sector_count(), 8);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8 * SECTOR_SIZE as u64);
    }

    #[test]
    fn test_sectors_persist_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fox.img");

        let mut disk = FileDisk::open(&path, 4).unwrap();
        disk.write_sector(3, &[0x5A; SECTOR_SIZE]).unwrap();
        disk.flush().unwrap();
        drop(disk);

        // Asking for fewer sectors never shrinks the image
        let mut disk = FileDisk::open(&path, 1).unwrap();
        assert_eq!(disk.sector_count(), 4);
        let mut buffer = [0u8; SECTOR_SIZE];
        disk.read_sector(3, &mut buffer).unwrap();
        assert_eq!(buffer, [0x5A; SECTOR_SIZE]);
    }

    #[test]
    fn test_bounds_and_buffer_size() {
        let dir = tempdir().unwrap();
        let mut disk = FileDisk::open(dir.path().join("fox.img"), 2).unwrap();

        let mut buffer = [0u8; SECTOR_SIZE];
        assert_eq!(disk.read_sector(2, &mut buffer), Err(BlockError::OutOfBounds));
        assert_eq!(disk.write_sector(0, &[0u8; 16]), Err(BlockError::InvalidSize));
    }
}
