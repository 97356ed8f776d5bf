//! # Namespace Table
//!
//! This crate provides the FoxOS file namespace: a hierarchical store of files
//! and directories kept in one fixed-capacity flat table.
//!
//! ## Design
//!
//! - Entries live in a single owned arena; parents are referenced by
//!   [`EntryIndex`] handles, never by pointers
//! - The root is slot 0 and is its own parent
//! - Creation appends; deletion compacts the table and renumbers every
//!   parent reference that pointed past the removed slot
//! - Paths are resolved component by component by [`PathResolver`]
//! - The table has no notion of a current directory; that belongs to the shell
//!
//! Every operation either succeeds completely or leaves the table untouched.

pub mod entry;
pub mod error;
pub mod path;
pub mod table;

pub use entry::{
    DirEntry, Entry, EntryIndex, EntryKind, Limits, MAX_FILE_CAPACITY, MAX_NAME_LEN,
    MAX_TABLE_ENTRIES,
};
pub use error::{FsError, InvariantViolation, LimitsError};
pub use path::{DirectoryLookup, PathResolver};
pub use table::{ListingSummary, NamespaceTable, StatInfo, MAX_LISTING_LINE};
