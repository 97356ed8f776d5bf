//! Error types for namespace operations

use crate::EntryIndex;
use thiserror::Error;

/// Errors returned by namespace operations
///
/// These are plain values: the table never panics on bad input and never
/// produces user-facing text. The shell decides how to present them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// A path component does not exist
    #[error("no such file or directory")]
    NotFound,

    /// The operation requires a directory
    #[error("not a directory")]
    NotADirectory,

    /// The operation requires a regular file
    #[error("not a file")]
    NotAFile,

    /// A sibling with the same name already exists
    #[error("already exists")]
    AlreadyExists,

    /// Delete attempted on a directory that still has children
    #[error("directory not empty")]
    DirectoryNotEmpty,

    /// The table is at capacity
    #[error("namespace table is full")]
    Full,

    /// Empty, oversized or malformed entry name
    #[error("invalid name")]
    InvalidName,

    /// Creation asked for a free slot instead of a file or directory
    #[error("invalid entry kind")]
    InvalidKind,

    /// The root directory cannot be removed
    #[error("cannot remove the root directory")]
    RootDirectory,
}

/// Table limits that cannot be used
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LimitsError {
    #[error("max_entries must be at least 1 to hold the root directory")]
    NoRootSlot,

    #[error("max_entries {requested} exceeds the supported maximum of {max}")]
    TooManyEntries { requested: usize, max: usize },

    #[error("max_file_size {requested} exceeds the supported maximum of {max}")]
    FileSizeTooLarge { requested: usize, max: usize },
}

/// A broken table invariant, found by [`crate::NamespaceTable::validate`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("table has no root entry")]
    MissingRoot,

    #[error("root entry must be an unnamed directory that is its own parent")]
    MalformedRoot,

    #[error("{count} entries exceed the table capacity of {capacity}")]
    OverCapacity { count: usize, capacity: usize },

    #[error("entry {index} is an unoccupied slot inside the live range")]
    FreeSlot { index: EntryIndex },

    #[error("entry {index} has an invalid name")]
    InvalidName { index: EntryIndex },

    #[error("entry {index} refers to parent {parent} which is not a live directory")]
    DanglingParent {
        index: EntryIndex,
        parent: EntryIndex,
    },

    #[error("entry {index} is not reachable from the root")]
    Unreachable { index: EntryIndex },

    #[error("entry {index} duplicates the name of sibling {sibling}")]
    DuplicateName {
        index: EntryIndex,
        sibling: EntryIndex,
    },

    #[error("entry {index} stores {size} bytes, limit is {limit}")]
    FileTooLarge {
        index: EntryIndex,
        size: usize,
        limit: usize,
    },

    #[error("directory entry {index} carries file content")]
    DirectoryWithContent { index: EntryIndex },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(FsError::NotFound.to_string(), "no such file or directory");
        assert_eq!(FsError::DirectoryNotEmpty.to_string(), "directory not empty");
        assert_eq!(FsError::Full.to_string(), "namespace table is full");
    }

    #[test]
    fn test_violation_message_names_index() {
        let violation = InvariantViolation::DanglingParent {
            index: EntryIndex::new(4),
            parent: EntryIndex::new(2),
        };
        assert_eq!(
            violation.to_string(),
            "entry 4 refers to parent 2 which is not a live directory"
        );
    }
}
