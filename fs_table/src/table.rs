//! The namespace table
//!
//! A fixed-capacity arena of [`Entry`] values. Slot 0 is the root and the
//! occupied slots are always the contiguous prefix `[0, live_count)`.

use crate::entry::is_valid_name;
use crate::path::{DirectoryLookup, PathResolver};
use crate::{DirEntry, Entry, EntryIndex, EntryKind, FsError, InvariantViolation, Limits, MAX_NAME_LEN};
use std::collections::HashMap;

/// Longest encoding of one listing line: name, `/` and newline
pub const MAX_LISTING_LINE: usize = MAX_NAME_LEN + 2;

/// Metadata about a resolved entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatInfo {
    pub index: EntryIndex,
    pub kind: EntryKind,
    pub parent: EntryIndex,
    /// Bytes stored (files only)
    pub size: usize,
    /// Number of children (directories only)
    pub child_count: usize,
}

/// Result of serializing a listing into a caller buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSummary {
    /// Entries written
    pub count: usize,
    /// Bytes of the buffer that were filled
    pub bytes_written: usize,
    /// True if the buffer ran out before every child was written
    pub truncated: bool,
}

/// File and directory namespace
///
/// The table is owned by whatever represents the running environment and
/// passed by reference to every operation; there is no global instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    limits: Limits,
    entries: Vec<Entry>,
    revision: u64,
}

impl NamespaceTable {
    /// Creates a table holding only the root directory
    ///
    /// A capacity of zero is raised to one so the root always fits; callers
    /// taking limits from configuration should run [`Limits::validate`]
    /// first and then size storage from [`NamespaceTable::limits`].
    pub fn new(limits: Limits) -> Self {
        let mut table = Self {
            limits: limits.with_root_slot(),
            entries: Vec::new(),
            revision: 0,
        };
        table.install_root();
        table
    }

    /// Builds a table from decoded entries, checking every invariant
    pub fn from_entries(limits: Limits, entries: Vec<Entry>) -> Result<Self, InvariantViolation> {
        let table = Self {
            limits: limits.with_root_slot(),
            entries,
            revision: 0,
        };
        table.validate()?;
        Ok(table)
    }

    /// Resets the table to the root directory alone
    ///
    /// Intended to run once per boot; calling it again yields the same table.
    pub fn init(&mut self) {
        self.install_root();
        self.revision += 1;
    }

    fn install_root(&mut self) {
        self.entries.clear();
        self.entries.push(Entry::root());
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Maximum number of entries, root included
    pub fn capacity(&self) -> usize {
        self.limits.max_entries
    }

    /// Number of occupied slots
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limits.max_entries
    }

    /// Counter bumped by every successful mutation
    ///
    /// Owners compare revisions to decide when the table must be saved.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All occupied entries in table order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, index: EntryIndex) -> Option<&Entry> {
        self.entries.get(index.get())
    }

    /// Resolves `path` to a table index
    pub fn resolve(&self, path: &str) -> Result<EntryIndex, FsError> {
        PathResolver::resolve(self, path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// Returns metadata for the entry at `path`
    pub fn stat(&self, path: &str) -> Result<StatInfo, FsError> {
        let index = self.resolve(path)?;
        let entry = &self.entries[index.get()];
        Ok(StatInfo {
            index,
            kind: entry.kind,
            parent: entry.parent,
            size: entry.size(),
            child_count: self.children(index).count(),
        })
    }

    /// Rebuilds the absolute path of `index` by walking its parents
    pub fn path_of(&self, index: EntryIndex) -> Option<String> {
        let mut current = self.entry(index)?;
        let mut current_index = index;
        let mut names = Vec::new();

        while !current_index.is_root() {
            if names.len() >= self.entries.len() {
                return None;
            }
            names.push(current.name.as_str());
            current_index = current.parent;
            current = self.entry(current_index)?;
        }

        names.reverse();
        Some(format!("/{}", names.join("/")))
    }

    /// Appends a new entry under `parent`
    pub fn create_entry(
        &mut self,
        name: &str,
        kind: EntryKind,
        parent: EntryIndex,
    ) -> Result<EntryIndex, FsError> {
        if self.is_full() {
            return Err(FsError::Full);
        }
        if !kind.is_occupied() {
            return Err(FsError::InvalidKind);
        }
        if !is_valid_name(name) {
            return Err(FsError::InvalidName);
        }
        if !self.is_directory(parent) {
            return Err(FsError::NotADirectory);
        }
        if self.find_child(parent, name).is_some() {
            return Err(FsError::AlreadyExists);
        }

        let index = EntryIndex::new(self.entries.len());
        self.entries.push(Entry::new(name, kind, parent, Vec::new()));
        self.revision += 1;
        Ok(index)
    }

    /// Creates an entry at `path`, whose parent directory must already exist
    pub fn create_by_path(&mut self, path: &str, kind: EntryKind) -> Result<EntryIndex, FsError> {
        let (parent_path, leaf) = PathResolver::split_parent_and_leaf(path)?;
        let parent = self.resolve(parent_path)?;
        self.create_entry(leaf, kind, parent)
    }

    pub fn create_file(&mut self, path: &str) -> Result<EntryIndex, FsError> {
        self.create_by_path(path, EntryKind::File)
    }

    pub fn create_dir(&mut self, path: &str) -> Result<EntryIndex, FsError> {
        self.create_by_path(path, EntryKind::Directory)
    }

    /// Replaces the content of the file at `path`
    ///
    /// Input longer than the per-file capacity is truncated, not rejected.
    /// Returns the number of bytes stored.
    pub fn write(&mut self, path: &str, bytes: &[u8]) -> Result<usize, FsError> {
        let index = self.resolve_file(path)?;
        let stored = bytes.len().min(self.limits.max_file_size);

        let entry = &mut self.entries[index.get()];
        entry.data.clear();
        entry.data.extend_from_slice(&bytes[..stored]);
        self.revision += 1;
        Ok(stored)
    }

    /// Reads at most `capacity` bytes of the file at `path`
    pub fn read(&self, path: &str, capacity: usize) -> Result<Vec<u8>, FsError> {
        let index = self.resolve_file(path)?;
        let data = &self.entries[index.get()].data;
        Ok(data[..capacity.min(data.len())].to_vec())
    }

    /// Copies file content into `buf`, returning the number of bytes copied
    pub fn read_into(&self, path: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        let index = self.resolve_file(path)?;
        let data = &self.entries[index.get()].data;
        let len = buf.len().min(data.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    /// Lists the children of the directory at `path` in creation order
    pub fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let index = self.resolve_dir(path)?;
        Ok(self
            .children(index)
            .map(|(child, entry)| DirEntry {
                index: child,
                name: entry.name.clone(),
                kind: entry.kind,
            })
            .collect())
    }

    /// Writes a listing into `buf`, one child per line
    ///
    /// Directories carry a trailing `/`. Serialization stops before any
    /// child once the space left could not hold a maximum-length line, so
    /// the buffer never ends in a partial entry.
    pub fn list_directory_into(&self, path: &str, buf: &mut [u8]) -> Result<ListingSummary, FsError> {
        let index = self.resolve_dir(path)?;
        let mut summary = ListingSummary {
            count: 0,
            bytes_written: 0,
            truncated: false,
        };

        for (_, entry) in self.children(index) {
            if buf.len() - summary.bytes_written < MAX_LISTING_LINE {
                summary.truncated = true;
                break;
            }

            let mut pos = summary.bytes_written;
            let name = entry.name.as_bytes();
            buf[pos..pos + name.len()].copy_from_slice(name);
            pos += name.len();
            if entry.is_dir() {
                buf[pos] = b'/';
                pos += 1;
            }
            buf[pos] = b'\n';

            summary.bytes_written = pos + 1;
            summary.count += 1;
        }

        Ok(summary)
    }

    /// Removes the file or empty directory at `path`
    ///
    /// The table is compacted afterwards, so every index greater than the
    /// removed one shifts down by one.
    pub fn delete_by_path(&mut self, path: &str) -> Result<(), FsError> {
        let index = self.resolve(path)?;
        if index.is_root() {
            return Err(FsError::RootDirectory);
        }
        if self.entries[index.get()].is_dir() && self.children(index).next().is_some() {
            return Err(FsError::DirectoryNotEmpty);
        }

        self.compact(index);
        self.revision += 1;
        Ok(())
    }

    /// Drops slot `removed` and renumbers parent references past it
    fn compact(&mut self, removed: EntryIndex) {
        self.entries.remove(removed.get());
        for entry in &mut self.entries {
            if entry.parent > removed {
                entry.parent = EntryIndex::new(entry.parent.get() - 1);
            }
        }
    }

    /// Checks every structural invariant of the table
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let root = self.entries.first().ok_or(InvariantViolation::MissingRoot)?;
        if !root.is_dir() || !root.name.is_empty() || !root.parent.is_root() || !root.data.is_empty() {
            return Err(InvariantViolation::MalformedRoot);
        }
        if self.entries.len() > self.limits.max_entries {
            return Err(InvariantViolation::OverCapacity {
                count: self.entries.len(),
                capacity: self.limits.max_entries,
            });
        }

        let mut siblings: HashMap<(EntryIndex, &str), EntryIndex> = HashMap::new();
        for (index, entry) in self.entries.iter().enumerate().skip(1) {
            let index = EntryIndex::new(index);

            if !entry.kind.is_occupied() {
                return Err(InvariantViolation::FreeSlot { index });
            }
            if !is_valid_name(&entry.name) {
                return Err(InvariantViolation::InvalidName { index });
            }
            if !self.is_directory(entry.parent) {
                return Err(InvariantViolation::DanglingParent {
                    index,
                    parent: entry.parent,
                });
            }
            if entry.is_file() && entry.size() > self.limits.max_file_size {
                return Err(InvariantViolation::FileTooLarge {
                    index,
                    size: entry.size(),
                    limit: self.limits.max_file_size,
                });
            }
            if entry.is_dir() && !entry.data.is_empty() {
                return Err(InvariantViolation::DirectoryWithContent { index });
            }
            if let Some(sibling) = siblings.insert((entry.parent, entry.name.as_str()), index) {
                return Err(InvariantViolation::DuplicateName { index, sibling });
            }
            if self.path_of(index).is_none() {
                return Err(InvariantViolation::Unreachable { index });
            }
        }

        Ok(())
    }

    fn is_directory(&self, index: EntryIndex) -> bool {
        self.entry(index).is_some_and(Entry::is_dir)
    }

    fn resolve_file(&self, path: &str) -> Result<EntryIndex, FsError> {
        let index = self.resolve(path)?;
        if !self.entries[index.get()].is_file() {
            return Err(FsError::NotAFile);
        }
        Ok(index)
    }

    fn resolve_dir(&self, path: &str) -> Result<EntryIndex, FsError> {
        let index = self.resolve(path)?;
        if !self.entries[index.get()].is_dir() {
            return Err(FsError::NotADirectory);
        }
        Ok(index)
    }

    /// Children of `parent`; the root is never its own child
    fn children(&self, parent: EntryIndex) -> impl Iterator<Item = (EntryIndex, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .skip(1)
            .filter(move |(_, entry)| entry.parent == parent)
            .map(|(index, entry)| (EntryIndex::new(index), entry))
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl DirectoryLookup for NamespaceTable {
    fn find_child(&self, parent: EntryIndex, name: &str) -> Option<EntryIndex> {
        self.children(parent)
            .find(|(_, entry)| entry.name == name)
            .map(|(index, _)| index)
    }
}
