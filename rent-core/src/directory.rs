//! Read-only suburb directory used to resolve distances to the depot.

use tracing::debug;

use crate::models::SuburbRecord;

/// Maximum number of matches returned by [`SuburbDirectory::search`].
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct SuburbDirectory {
    records: Vec<SuburbRecord>,
}

impl SuburbDirectory {
    pub fn new(records: Vec<SuburbRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SuburbRecord] {
        &self.records
    }

    /// Case-insensitive substring search on the suburb name.
    ///
    /// Returns at most [`MAX_SEARCH_RESULTS`] records in directory order. A
    /// blank query matches nothing.
    pub fn search(
        &self,
        query: &str,
    ) -> Vec<&SuburbRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let matches: Vec<_> = self
            .records
            .iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .take(MAX_SEARCH_RESULTS)
            .collect();
        debug!(query, matches = matches.len(), "suburb search");
        matches
    }

    /// Selects a directory entry by exact (case-insensitive) name.
    ///
    /// Several suburbs share a name across towns; pass `town` to pick one.
    /// Without it the first match in directory order wins.
    pub fn resolve(
        &self,
        name: &str,
        town: Option<&str>,
    ) -> Option<&SuburbRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let name = name.to_lowercase();
        let town = town.map(|town| town.trim().to_lowercase());
        self.records.iter().find(|record| {
            record.name.to_lowercase() == name
                && town.as_ref().is_none_or(|town| record.town.to_lowercase() == *town)
        })
    }
}
