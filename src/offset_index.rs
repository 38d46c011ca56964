//! Cumulative byte boundaries for attributing corpus positions to documents.

use std::ops::Range;

use crate::{
    corpus::ByteCount,
    error::{Error, Result},
};

/// Boundary table over the corpus built from per-document byte counts.
///
/// Holds `D + 1` boundaries: `0` followed by the running sums of the byte
/// counts, so document `i` owns `boundaries[i]..boundaries[i + 1]`.
///
/// # Examples
///
/// ```
/// use docsim::offset_index::OffsetIndex;
///
/// let index = OffsetIndex::build(&[4, 0, 6]);
/// assert_eq!(index.total_bytes(), 10);
/// assert_eq!(index.locate(0).unwrap(), 0);
/// assert_eq!(index.locate(4).unwrap(), 0);
/// assert_eq!(index.locate(5).unwrap(), 2);
/// assert!(index.locate(11).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    boundaries: Vec<u64>,
}

impl OffsetIndex {
    pub fn build(byte_counts: &[u64]) -> Self {
        let mut boundaries = Vec::with_capacity(byte_counts.len() + 1);
        boundaries.push(0);
        let mut total = 0u64;
        for &count in byte_counts {
            total += count;
            boundaries.push(total);
        }
        Self { boundaries }
    }

    pub fn from_byte_counts(records: &[ByteCount]) -> Self {
        let counts: Vec<u64> = records.iter().map(|r| r.bytes).collect();
        Self::build(&counts)
    }

    /// Number of documents covered.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The final cumulative boundary.
    pub fn total_bytes(&self) -> u64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }

    /// Byte span owned by document `doc`.
    pub fn span(&self, doc: usize) -> Option<Range<u64>> {
        let start = *self.boundaries.get(doc)?;
        let end = *self.boundaries.get(doc + 1)?;
        Some(start..end)
    }

    /// Index of the document owning byte position `position`.
    ///
    /// Returns the smallest `i` whose cumulative sum is `>= position`, so a
    /// position sitting exactly on a boundary belongs to the document whose
    /// span ends there. Positions past the final boundary, or any position
    /// when there are no documents, are [`Error::OutOfRange`].
    pub fn locate(&self, position: u64) -> Result<usize> {
        let total = self.total_bytes();
        if self.is_empty() || position > total {
            return Err(Error::OutOfRange { position, total });
        }
        Ok(self.boundaries[1..].partition_point(|&b| b < position))
    }
}
