//! Sweep-line join over two sorted SEG streams.
//!
//! # Algorithm
//!
//! One side drives (the query); the other is the reference. For each query
//! record the engine maintains a kept window of reference records whose
//! anchor intervals could still overlap it:
//!
//! 1. When the query moves to a new anchor name, the window is dropped and
//!    the reference reader skips whole sequences until it reaches that
//!    name (or passes it).
//! 2. Otherwise, kept records that end at or before the query start are
//!    evicted with a stable compaction.
//! 3. Reference records on the same name are admitted while they begin
//!    before the query end; records already ended before the query start
//!    are dropped instead of admitted.
//!
//! Admission moves records out of the reader, so a reference line buffer
//! is owned by exactly one place at all times.
//!
//! # Memory
//!
//! O(k) where k is the maximum number of reference records overlapping or
//! ahead of any one query anchor on the same sequence name. The window is
//! never re-sorted; insertion order is file order, which is ascending
//! anchor start.

use crate::error::Result;
use crate::reader::SortedSegReader;
use crate::seg::Seg;
use crate::writer::SegWriter;
use std::cmp::Ordering;
use std::io::{BufRead, Write};

/// An overlap threshold, kept as numerator/denominator so the comparison
/// stays exact in the integer range that matters.
#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    pub numer: f64,
    pub denom: f64,
}

impl Fraction {
    /// Parse `N` (percent) or `N/D`. Negative values, zero denominators,
    /// and fractions above one are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let (numer, denom) = match text.split_once('/') {
            Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
            None => (text.parse::<f64>().ok()?, 100.0),
        };
        if !numer.is_finite() || !denom.is_finite() || numer < 0.0 || denom <= 0.0 || numer > denom
        {
            return None;
        }
        Some(Self { numer, denom })
    }

    /// The `-x` form: both terms negated, which turns the at-least
    /// predicate into at-most.
    pub fn negated(self) -> Self {
        Self {
            numer: -self.numer,
            denom: -self.denom,
        }
    }

    /// Any overlap at all qualifies: one part in an effectively infinite
    /// whole.
    pub fn any_overlap() -> Self {
        Self {
            numer: 1.0,
            denom: (u64::MAX / 2 + 1) as f64,
        }
    }

    #[inline]
    fn accepts(&self, overlap: i64, length: i64) -> bool {
        overlap as f64 * self.denom >= length as f64 * self.numer
    }
}

/// Which input file an option refers to.
pub const FILE1: u8 = 1;
pub const FILE2: u8 = 2;

/// Join configuration, mirroring the seg-join command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinCommand {
    /// Only use records of file 1 that are contained in their join partner.
    pub complete1: bool,
    /// Only use records of file 2 that are contained in their join partner.
    pub complete2: bool,
    /// Write whole records of this file that overlap anything in the other.
    pub overlapping_file: Option<u8>,
    /// Write only the unjoinable residues of this file.
    pub unjoinable_file: Option<u8>,
    /// Join on whole segment tuples, not just anchors.
    pub join_all_segments: bool,
    /// Coverage threshold for the overlapping mode.
    pub min_overlap: Option<Fraction>,
}

impl JoinCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the join over two sorted SEG inputs.
    pub fn run<R1, R2, W>(&self, input1: R1, input2: R2, output: W) -> Result<()>
    where
        R1: BufRead,
        R2: BufRead,
        W: Write,
    {
        let mut r1 = SortedSegReader::new(input1)?;
        let mut r2 = SortedSegReader::new(input2)?;
        let mut out = SegWriter::new(output);
        match (self.unjoinable_file, self.overlapping_file) {
            (Some(FILE1), _) => {
                self.write_unjoinable(&mut r1, &mut r2, self.complete1, &mut out)?
            }
            (Some(_), _) => self.write_unjoinable(&mut r2, &mut r1, self.complete2, &mut out)?,
            (None, Some(FILE1)) => self.write_overlapping(&mut r1, &mut r2, &mut out)?,
            (None, Some(_)) => self.write_overlapping(&mut r2, &mut r1, &mut out)?,
            (None, None) => self.write_joined(&mut r1, &mut r2, &mut out)?,
        }
        out.flush()
    }

    /// Default mode: emit one line per overlapping pair.
    fn write_joined<R1, R2, W>(
        &self,
        query: &mut SortedSegReader<R1>,
        reference: &mut SortedSegReader<R2>,
        out: &mut SegWriter<W>,
    ) -> Result<()>
    where
        R1: BufRead,
        R2: BufRead,
        W: Write,
    {
        let mut kept: Vec<Seg> = Vec::new();
        loop {
            let Some(s) = query.get() else { break };
            update_kept(&mut kept, reference, s, query.is_new_seq_name())?;
            let ibeg = s.beg0();
            let iend = s.end0();
            for t in &kept {
                let jbeg = t.beg0();
                if jbeg >= iend {
                    break;
                }
                if self.join_all_segments && !s.is_overlappable(t) {
                    continue;
                }
                let jend = t.end0();
                if self.complete1 && (ibeg < jbeg || iend > jend) {
                    continue;
                }
                if self.complete2 && (jbeg < ibeg || jend > iend) {
                    continue;
                }
                let beg = ibeg.max(jbeg);
                let end = iend.min(jend);
                if self.join_all_segments {
                    out.write_slice(s, beg, end)?;
                } else {
                    out.write_join(s, t, beg, end)?;
                }
            }
            query.advance()?;
        }
        Ok(())
    }

    /// `-v` mode: walk each query anchor left to right and emit the spans
    /// not covered by any kept record. With `-c` the record is all-or-
    /// nothing: any overlap silences it entirely.
    fn write_unjoinable<R1, R2, W>(
        &self,
        query: &mut SortedSegReader<R1>,
        reference: &mut SortedSegReader<R2>,
        is_complete: bool,
        out: &mut SegWriter<W>,
    ) -> Result<()>
    where
        R1: BufRead,
        R2: BufRead,
        W: Write,
    {
        let mut kept: Vec<Seg> = Vec::new();
        loop {
            let Some(s) = query.get() else { break };
            update_kept(&mut kept, reference, s, query.is_new_seq_name())?;
            let mut ibeg = s.beg0();
            let iend = s.end0();
            for t in &kept {
                let jbeg = t.beg0();
                if jbeg >= iend {
                    break;
                }
                if self.join_all_segments && !s.is_overlappable(t) {
                    continue;
                }
                if is_complete {
                    ibeg = iend;
                    break;
                }
                let jend = t.end0();
                if jbeg > ibeg {
                    out.write_slice(s, ibeg, jbeg)?;
                }
                if jend > ibeg {
                    ibeg = jend;
                }
            }
            if iend > ibeg {
                out.write_slice(s, ibeg, iend)?;
            }
            query.advance()?;
        }
        Ok(())
    }

    /// `-f`/`-n`/`-x` mode: emit whole query records whose anchor coverage
    /// by the kept union clears the threshold.
    fn write_overlapping<R1, R2, W>(
        &self,
        query: &mut SortedSegReader<R1>,
        reference: &mut SortedSegReader<R2>,
        out: &mut SegWriter<W>,
    ) -> Result<()>
    where
        R1: BufRead,
        R2: BufRead,
        W: Write,
    {
        let min_overlap = self.min_overlap.unwrap_or_else(Fraction::any_overlap);
        let mut kept: Vec<Seg> = Vec::new();
        loop {
            let Some(s) = query.get() else { break };
            update_kept(&mut kept, reference, s, query.is_new_seq_name())?;
            let ibeg = s.beg0();
            let iend = s.end0();
            let mut overlap = 0;
            let mut kbeg = ibeg;
            for t in &kept {
                let jbeg = t.beg0();
                let jend = t.end0();
                if jbeg >= iend {
                    break;
                }
                if jend <= kbeg {
                    continue;
                }
                if self.join_all_segments && !s.is_overlappable(t) {
                    continue;
                }
                let end = iend.min(jend);
                overlap += end - jbeg.max(kbeg);
                kbeg = end;
            }
            if min_overlap.accepts(overlap, iend - ibeg) {
                out.write_slice(s, ibeg, iend)?;
            }
            query.advance()?;
        }
        Ok(())
    }
}

/// Compare the query anchor name against the reference reader's current
/// record; an exhausted reference compares less so callers stop.
fn new_name_cmp<R: BufRead>(s: &Seg, r: &SortedSegReader<R>) -> Ordering {
    match r.get() {
        Some(t) => s.name_cmp(t, 0),
        None => Ordering::Less,
    }
}

/// Bring the kept window up to date for query record `s`.
///
/// Window invariants on return: every kept record shares s's anchor name
/// and ends after s's anchor start, and the reference reader sits on the
/// first record not yet admitted (or on a later name).
fn update_kept<R: BufRead>(
    kept: &mut Vec<Seg>,
    reference: &mut SortedSegReader<R>,
    s: &Seg,
    query_is_new_name: bool,
) -> Result<()> {
    let ibeg = s.beg0();
    let iend = s.end0();

    if query_is_new_name {
        kept.clear();
        if reference.is_new_seq_name() {
            loop {
                match new_name_cmp(s, reference) {
                    Ordering::Less => return Ok(()),
                    Ordering::Equal => break,
                    Ordering::Greater => reference.skip_sequence()?,
                }
            }
        } else {
            // The reference is mid-sequence: whatever is left of its
            // current name was already offered to earlier queries.
            loop {
                reference.skip_sequence()?;
                match new_name_cmp(s, reference) {
                    Ordering::Less => return Ok(()),
                    Ordering::Equal => break,
                    Ordering::Greater => {}
                }
            }
        }
    } else {
        kept.retain(|t| t.end0() > ibeg);
        if reference.is_new_seq_name() && new_name_cmp(s, reference) != Ordering::Equal {
            return Ok(());
        }
    }

    loop {
        let (jbeg, jend) = match reference.get() {
            Some(t) => (t.beg0(), t.end0()),
            None => break,
        };
        if jbeg >= iend {
            break;
        }
        if jend > ibeg {
            if let Some(t) = reference.take_and_advance()? {
                kept.push(t);
            }
        } else {
            reference.advance()?;
        }
        if reference.is_new_seq_name() {
            break;
        }
    }
    Ok(())
}
