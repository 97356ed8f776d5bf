//! Table entries and their handles

use crate::LimitsError;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Longest allowed entry name, in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Default number of table slots
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Default per-file content capacity, in bytes
pub const DEFAULT_MAX_FILE_SIZE: usize = 4096;

/// Largest table capacity [`Limits::validate`] accepts
pub const MAX_TABLE_ENTRIES: usize = 4096;

/// Largest per-file capacity [`Limits::validate`] accepts, in bytes
pub const MAX_FILE_CAPACITY: usize = 64 * 1024;

/// Handle to a slot in the namespace table
///
/// Indices double as parent pointers, so a handle is only meaningful
/// until the next successful delete, which renumbers every slot after
/// the removed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryIndex(usize);

impl EntryIndex {
    /// The root directory, always slot 0
    pub const ROOT: EntryIndex = EntryIndex(0);

    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum EntryKind {
    /// Free slot
    None = 0,
    /// Regular file with bounded content
    File = 1,
    /// Directory
    Directory = 2,
}

impl EntryKind {
    pub fn is_occupied(self) -> bool {
        self != EntryKind::None
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::None => write!(f, "none"),
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
        }
    }
}

/// Capacity limits of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Number of slots, root included
    pub max_entries: usize,
    /// Bytes a single file may hold
    pub max_file_size: usize,
}

impl Limits {
    /// Checks limits that come from outside the program
    ///
    /// The table needs one slot for the root, and both bounds are capped so
    /// a table and its on-disk image stay a sane size.
    pub fn validate(&self) -> Result<(), LimitsError> {
        if self.max_entries == 0 {
            return Err(LimitsError::NoRootSlot);
        }
        if self.max_entries > MAX_TABLE_ENTRIES {
            return Err(LimitsError::TooManyEntries {
                requested: self.max_entries,
                max: MAX_TABLE_ENTRIES,
            });
        }
        if self.max_file_size > MAX_FILE_CAPACITY {
            return Err(LimitsError::FileSizeTooLarge {
                requested: self.max_file_size,
                max: MAX_FILE_CAPACITY,
            });
        }
        Ok(())
    }

    /// Same limits with room for at least the root
    pub(crate) fn with_root_slot(self) -> Self {
        Self {
            max_entries: self.max_entries.max(1),
            ..self
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// One file or directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) name: String,
    pub(crate) kind: EntryKind,
    pub(crate) parent: EntryIndex,
    pub(crate) data: Vec<u8>,
}

impl Entry {
    /// Builds an entry from raw parts
    ///
    /// No checks are made here; tables built with
    /// [`crate::NamespaceTable::from_entries`] are validated as a whole.
    pub fn new(name: impl Into<String>, kind: EntryKind, parent: EntryIndex, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent,
            data,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(String::new(), EntryKind::Directory, EntryIndex::ROOT, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn parent(&self) -> EntryIndex {
        self.parent
    }

    /// Bytes actually stored
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Stored content; empty for directories
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// One line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub index: EntryIndex,
    pub name: String,
    pub kind: EntryKind,
}

/// Returns true if `name` can label an entry
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && !name.contains(['/', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_entry() {
        let root = Entry::root();
        assert_eq!(root.name(), "");
        assert!(root.is_dir());
        assert_eq!(root.parent(), EntryIndex::ROOT);
        assert_eq!(root.size(), 0);
    }

    #[test]
    fn test_size_tracks_data() {
        let entry = Entry::new("a.txt", EntryKind::File, EntryIndex::ROOT, b"hello".to_vec());
        assert_eq!(entry.size(), 5);
        assert_eq!(entry.data(), b"hello");
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("notes.txt"));
        assert!(is_valid_name(&"x".repeat(MAX_NAME_LEN)));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name(&"x".repeat(MAX_NAME_LEN + 1)));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("nul\0"));
    }

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_entries, 256);
        assert_eq!(limits.max_file_size, 4096);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_kind_discriminants() {
        assert_eq!(EntryKind::None as u32, 0);
        assert_eq!(EntryKind::File as u32, 1);
        assert_eq!(EntryKind::Directory as u32, 2);
        assert!(!EntryKind::None.is_occupied());
    }

    #[test]
    fn test_limits_validation_bounds() {
        let at_bounds = Limits {
            max_entries: MAX_TABLE_ENTRIES,
            max_file_size: MAX_FILE_CAPACITY,
        };
        assert!(at_bounds.validate().is_ok());
        assert!(Limits { max_entries: 1, max_file_size: 0 }.validate().is_ok());

        assert_eq!(
            Limits { max_entries: 0, ..at_bounds }.validate(),
            Err(LimitsError::NoRootSlot)
        );
        assert_eq!(
            Limits { max_entries: MAX_TABLE_ENTRIES + 1, ..at_bounds }.validate(),
            Err(LimitsError::TooManyEntries {
                requested: MAX_TABLE_ENTRIES + 1,
                max: MAX_TABLE_ENTRIES,
            })
        );
        assert_eq!(
            Limits { max_file_size: usize::MAX, ..at_bounds }.validate(),
            Err(LimitsError::FileSizeTooLarge {
                requested: usize::MAX,
                max: MAX_FILE_CAPACITY,
            })
        );
    }
}
