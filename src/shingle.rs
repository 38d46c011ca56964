//! Streaming word shingler.
//!
//! A [`Shingler`] reads characters from a [`BufRead`] one line at a time,
//! extracts maximal runs of alphabetic characters as lowercased words, and
//! yields every window of `n` consecutive words concatenated without a
//! separator. Digits, punctuation and whitespace all separate words.
//!
//! Windows overlap: each emitted shingle drops the oldest word of the
//! previous one and appends the next word. A trailing window with fewer than
//! `n` words is never emitted.

use std::{
    collections::VecDeque,
    io::BufRead,
    iter::FusedIterator,
};

use crate::error::{Error, Result};

/// A lazy, single-pass sequence of `n`-word shingles over a character stream.
///
/// A read failure on the underlying stream ends the sequence; the partially
/// read line is discarded so no garbled word is ever produced.
///
/// # Examples
///
/// ```
/// use docsim::shingle::Shingler;
///
/// let text = "The quick, brown fox!";
/// let shingles: Vec<String> =
///     Shingler::new(text.as_bytes(), 2).unwrap().collect();
/// assert_eq!(shingles, vec!["thequick", "quickbrown", "brownfox"]);
/// ```
pub struct Shingler<R> {
    reader: R,
    n: usize,
    line: String,
    pos: usize,
    window: VecDeque<String>,
    exhausted: bool,
}

impl<R: BufRead> Shingler<R> {
    /// Create a shingler producing windows of `n` words.
    ///
    /// Fails with [`Error::InvalidShingleSize`] when `n` is zero.
    pub fn new(reader: R, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidShingleSize(n));
        }
        Ok(Self {
            reader,
            n,
            line: String::new(),
            pos: 0,
            window: VecDeque::with_capacity(n),
            exhausted: false,
        })
    }

    /// Window width in words.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Return the next shingle, or [`Error::Exhausted`] when none remain.
    pub fn next_shingle(&mut self) -> Result<String> {
        self.next().ok_or(Error::Exhausted)
    }

    /// Load the next line into the buffer. Returns false at end of stream.
    fn fill_line(&mut self) -> bool {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => false,
            Ok(_) => {
                self.line = String::from_utf8_lossy(&buf).into_owned();
                self.pos = 0;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "read failed, ending shingles");
                false
            }
        }
    }

    fn next_word(&mut self) -> Option<String> {
        while !self.exhausted {
            if let Some((start, len)) = letter_run(&self.line[self.pos..]) {
                let begin = self.pos + start;
                self.pos = begin + len;
                return Some(self.line[begin..self.pos].to_lowercase());
            }
            if !self.fill_line() {
                self.exhausted = true;
                self.line.clear();
                self.pos = 0;
            }
        }
        None
    }
}

/// Byte offset and length of the first run of letters in `s`.
fn letter_run(s: &str) -> Option<(usize, usize)> {
    let start = s.find(char::is_alphabetic)?;
    let tail = &s[start..];
    let len = tail
        .find(|c: char| !c.is_alphabetic())
        .unwrap_or(tail.len());
    Some((start, len))
}

impl<R: BufRead> Iterator for Shingler<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.window.len() < self.n {
            let word = self.next_word()?;
            self.window.push_back(word);
        }
        let shingle: String = self.window.iter().map(String::as_str).collect();
        self.window.pop_front();
        Some(shingle)
    }
}

impl<R: BufRead> FusedIterator for Shingler<R> {}

/// Collect every `n`-word shingle of an in-memory string.
pub fn shingles_of_str(text: &str, n: usize) -> Result<Vec<String>> {
    Ok(Shingler::new(text.as_bytes(), n)?.collect())
}
