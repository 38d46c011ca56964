//! Ranked similarity results and the threshold report.

use std::{collections::BTreeSet, io::Write};

use crate::{error::Result, similarity::Similarity};

/// Similarities kept in ascending order with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    entries: BTreeSet<Similarity>,
}

pub fn rank<I>(similarities: I) -> Ranking
where
    I: IntoIterator<Item = Similarity>,
{
    Ranking {
        entries: similarities.into_iter().collect(),
    }
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest count first.
    pub fn iter_descending(&self) -> impl Iterator<Item = &Similarity> {
        self.entries.iter().rev()
    }

    /// Remove and return the top entry if its count reaches `threshold`.
    ///
    /// An entry below the threshold is left in place.
    pub fn pop_above(&mut self, threshold: u64) -> Option<Similarity> {
        if self.entries.last()?.count < threshold {
            return None;
        }
        self.entries.pop_last()
    }

    /// Remove every entry whose count reaches `threshold`, highest first.
    pub fn drain_above(&mut self, threshold: u64) -> Vec<Similarity> {
        std::iter::from_fn(|| self.pop_above(threshold)).collect()
    }

    /// Write one line per qualifying entry, highest count first, stopping at
    /// the first entry below `threshold`. Returns the number of lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use docsim::{ranking::rank, similarity::Similarity};
    ///
    /// let mut ranking = rank([
    ///     Similarity::new("a", "b", 9),
    ///     Similarity::new("a", "c", 1),
    /// ]);
    /// let mut out = Vec::new();
    /// assert_eq!(ranking.report(5, &mut out).unwrap(), 1);
    /// assert_eq!(String::from_utf8(out).unwrap(), "a b 9\n");
    /// ```
    pub fn report<W: Write>(
        &mut self,
        threshold: u64,
        out: &mut W,
    ) -> Result<usize> {
        let mut lines = 0;
        while let Some(sim) = self.pop_above(threshold) {
            writeln!(out, "{sim}")?;
            lines += 1;
        }
        Ok(lines)
    }

    /// Same walk as [`Ranking::report`], one JSON object per line.
    pub fn report_json<W: Write>(
        &mut self,
        threshold: u64,
        out: &mut W,
    ) -> Result<usize> {
        let mut lines = 0;
        while let Some(sim) = self.pop_above(threshold) {
            serde_json::to_writer(&mut *out, &sim)?;
            writeln!(out)?;
            lines += 1;
        }
        Ok(lines)
    }
}

impl FromIterator<Similarity> for Ranking {
    fn from_iter<I: IntoIterator<Item = Similarity>>(iter: I) -> Self {
        rank(iter)
    }
}
