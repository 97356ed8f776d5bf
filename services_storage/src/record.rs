//! On-disk encoding of one table entry

use crate::StorageError;
use fs_table::{Entry, EntryIndex, EntryKind};
use serde::{Deserialize, Serialize};

/// Serialized form of an [`Entry`]
///
/// `data` is hex encoded. `size` is stored redundantly and must agree with
/// the decoded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub kind: EntryKind,
    pub size: u32,
    pub parent: u32,
    pub data: String,
}

impl From<&Entry> for EntryRecord {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.name().to_string(),
            kind: entry.kind(),
            size: entry.size() as u32,
            parent: entry.parent().get() as u32,
            data: hex::encode(entry.data()),
        }
    }
}

impl EntryRecord {
    /// Decodes back into an entry
    ///
    /// Only the record itself is checked here; table-level invariants are
    /// checked once the whole table is rebuilt.
    pub fn into_entry(self) -> Result<Entry, StorageError> {
        let data = hex::decode(&self.data)
            .map_err(|e| StorageError::Corrupt(format!("entry {:?}: {}", self.name, e)))?;
        if data.len() != self.size as usize {
            return Err(StorageError::Corrupt(format!(
                "entry {:?}: size {} does not match {} content bytes",
                self.name,
                self.size,
                data.len()
            )));
        }
        Ok(Entry::new(
            self.name,
            self.kind,
            EntryIndex::new(self.parent as usize),
            data,
        ))
    }
}
