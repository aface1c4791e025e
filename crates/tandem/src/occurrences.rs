//
// occurrences.rs
//
// Occurrence index: identifier name -> ordered spans in the current buffer
//

use std::ops::Range;

use indexmap::IndexMap;
use tower_lsp::lsp_types::Range as LspRange;

use crate::locator::{Occurrence, Snapshot};
use crate::perf::TimingGuard;

/// Occurrences of a single name, in document order.
///
/// Invariant: strictly increasing start offsets and no two spans overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceSet(Vec<Occurrence>);

impl OccurrenceSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Occurrence> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Occurrence> {
        self.0.iter()
    }

    /// Drop any occurrence overlapping `span`.
    pub fn without(self, span: &Range<usize>) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|o| o.end <= span.start || o.start >= span.end)
                .collect(),
        )
    }

    pub fn ranges(&self) -> Vec<LspRange> {
        self.0.iter().map(Occurrence::range).collect()
    }

    /// 0-based line of each occurrence.
    pub fn lines(&self) -> Vec<u32> {
        self.0.iter().map(|o| o.line).collect()
    }

    /// Index of the first occurrence starting at or after `offset`.
    pub fn first_at_or_after(&self, offset: usize) -> usize {
        self.0.partition_point(|o| o.start < offset)
    }
}

impl<'a> IntoIterator for &'a OccurrenceSet {
    type Item = &'a Occurrence;
    type IntoIter = std::slice::Iter<'a, Occurrence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// All identifier occurrences of one buffer snapshot.
///
/// Rebuilt in full on every change; edits anywhere can add or remove
/// identifiers.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    /// Every occurrence, in document order
    all: Vec<Occurrence>,
    /// Positions into `all`, keyed by name in first-appearance order
    by_name: IndexMap<String, Vec<usize>>,
}

impl OccurrenceIndex {
    pub fn build(snapshot: Snapshot<'_>) -> Self {
        let _guard = TimingGuard::with_threshold("occurrence_index_build", 20);

        let mut index = Self::default();
        for occurrence in snapshot.identifiers() {
            let position = index.all.len();
            index
                .by_name
                .entry(occurrence.name.clone())
                .or_default()
                .push(position);
            index.all.push(occurrence);
        }
        log::trace!(
            "Indexed {} occurrences of {} names",
            index.all.len(),
            index.by_name.len()
        );
        index
    }

    /// All occurrences of exactly `name`, in document order.
    pub fn find_occurrences(&self, name: &str) -> OccurrenceSet {
        let occurrences = self
            .by_name
            .get(name)
            .map(|positions| positions.iter().map(|&i| self.all[i].clone()).collect())
            .unwrap_or_default();
        OccurrenceSet(occurrences)
    }

    /// The occurrence containing byte `offset`, either edge inclusive.
    pub fn occurrence_at(&self, offset: usize) -> Option<&Occurrence> {
        self.occurrence_touching(&(offset..offset))
    }

    /// The occurrence whose span contains (or touches) `range`.
    pub fn occurrence_touching(&self, range: &Range<usize>) -> Option<&Occurrence> {
        let after = self.all.partition_point(|o| o.start <= range.start);
        let candidate = self.all[..after].last()?;
        candidate.touches(range).then_some(candidate)
    }

    /// The occurrence spanning exactly `span`.
    pub fn occurrence_exact(&self, span: &Range<usize>) -> Option<&Occurrence> {
        self.all
            .binary_search_by_key(&span.start, |o| o.start)
            .ok()
            .map(|i| &self.all[i])
            .filter(|o| o.end == span.end)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
