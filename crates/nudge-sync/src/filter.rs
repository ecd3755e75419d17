//! Client-side record filtering.

use std::slice;

use nudge_core::Record;

/// Lazily filter records by a case-insensitive substring of their label.
///
/// An empty query yields every record. Nothing is cached: each call walks the
/// given slice afresh.
pub fn filter_records<'a>(records: &'a [Record], query: &str) -> Filtered<'a> {
    Filtered {
        records: records.iter(),
        needle: query.to_lowercase(),
    }
}

/// Iterator returned by [`filter_records`].
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    records: slice::Iter<'a, Record>,
    needle: String,
}

impl<'a> Iterator for Filtered<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.records.find(|record| record.label_contains(needle))
    }
}
