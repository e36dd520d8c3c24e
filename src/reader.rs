//! Sorted SEG input with one-record lookahead.
//!
//! The join engine needs three things from its inputs: records in sorted
//! order, a fatal error the moment that assumption breaks, and an edge
//! signal when the anchor sequence name changes. Validation happens
//! inline as records stream through, so a file is never read twice.

use crate::error::{Result, SegError};
use crate::scan::{is_data_line, read_line};
use crate::seg::Seg;
use std::cmp::Ordering;
use std::io::BufRead;

/// Streaming reader over one sorted SEG file.
///
/// Records must be ordered by anchor name, then non-decreasing anchor
/// start; a violation is the fatal `input not sorted properly`. Blank
/// lines and `#` comments are skipped anywhere in the stream.
#[derive(Debug)]
pub struct SortedSegReader<R> {
    input: R,
    line: Vec<u8>,
    cur: Option<Seg>,
    is_new_seq: bool,
}

impl<R: BufRead> SortedSegReader<R> {
    /// Create a reader and position it on the first record.
    pub fn new(input: R) -> Result<Self> {
        let mut reader = Self {
            input,
            line: Vec::new(),
            cur: None,
            is_new_seq: true,
        };
        reader.advance()?;
        Ok(reader)
    }

    /// True while a record is available.
    #[inline]
    pub fn is_more(&self) -> bool {
        self.cur.is_some()
    }

    /// The current record, if any.
    #[inline]
    pub fn get(&self) -> Option<&Seg> {
        self.cur.as_ref()
    }

    /// True if the current record is the first one, or its anchor name
    /// differs from the previous record's.
    #[inline]
    pub fn is_new_seq_name(&self) -> bool {
        self.is_new_seq
    }

    /// Step to the next record.
    pub fn advance(&mut self) -> Result<()> {
        self.take_and_advance().map(|_| ())
    }

    /// Step to the next record, handing the current one to the caller.
    ///
    /// This is how the join engine's kept window takes ownership of
    /// reference records without copying their line buffers.
    pub fn take_and_advance(&mut self) -> Result<Option<Seg>> {
        let next = self.read_record()?;
        match (&self.cur, &next) {
            (Some(s), Some(t)) => {
                let c = s.name_cmp(t, 0);
                if c == Ordering::Greater || (c == Ordering::Equal && s.beg0() > t.beg0()) {
                    return Err(SegError::NotSorted);
                }
                self.is_new_seq = c != Ordering::Equal;
            }
            _ => self.is_new_seq = true,
        }
        Ok(std::mem::replace(&mut self.cur, next))
    }

    /// Discard the rest of the current anchor sequence.
    pub fn skip_sequence(&mut self) -> Result<()> {
        loop {
            self.advance()?;
            if self.is_new_seq_name() {
                return Ok(());
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<Seg>> {
        while read_line(&mut self.input, &mut self.line)? {
            if is_data_line(&self.line) {
                return Seg::parse(std::mem::take(&mut self.line)).map(Some);
            }
        }
        Ok(None)
    }
}
