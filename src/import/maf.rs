//! MAF decoder.
//!
//! `s` lines accumulate into an alignment block; any line that does not
//! begin with a graphic character flushes it. Within a block the columns
//! are swept once: maximal gapless runs become SEG records whose parts
//! are every row at the position where the run began.
//!
//! Translated alignments carry two scaling factors per row. A row whose
//! gapless letter count is below its span is protein against DNA
//! coordinates: each letter advances the position by three. A row whose
//! letter count exceeds its span is DNA against protein coordinates: its
//! start is lifted to letter scale on parse and divided back on
//! emission, and the whole block's emitted lengths divide by three. The
//! frameshift symbols `/` and `\` adjust a row's position by -1 and +1.

use crate::coords;
use crate::error::{Result, SegError};
use crate::import::{write_alignment_seg, ImportCommand, OutPart};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};
use std::ops::Range;

#[derive(Debug, Default)]
struct MafRow {
    line: Vec<u8>,
    name: Range<usize>,
    seq: Range<usize>,
    start: i64,
    letter_length: i64,
    length_per_letter: i64,
}

impl MafRow {
    #[inline]
    fn symbol(&self, aln_pos: usize) -> u8 {
        self.line[self.seq.start + aln_pos]
    }
}

/// Parse the accumulated `s` lines of one block, then sweep its columns.
fn do_one_maf<W: Write>(
    out: &mut SegWriter<W>,
    rows: &mut [MafRow],
    aln_num: u64,
    cmd: &ImportCommand,
) -> Result<()> {
    let mut aln_len = 0;
    let mut len_div = 1;
    for (i, row) in rows.iter_mut().enumerate() {
        let MafRow {
            line,
            name,
            seq,
            start,
            letter_length,
            length_per_letter,
        } = row;
        let mut sc = Scanner::new(line);
        let parsed = (|| {
            sc.word()?; // the "s"
            let name = sc.word_span()?;
            let start = sc.long()?;
            let span = sc.long()?;
            let strand = sc.word()?;
            let seq_len = sc.long()?;
            let seq = sc.word_span()?;
            Some((name, start, span, strand, seq_len, seq))
        })();
        let Some((name_span, row_start, span, strand, seq_len, seq_span)) = parsed else {
            return Err(SegError::bad_line("MAF", line));
        };
        let seq_bytes = &line[seq_span.0..seq_span.1];
        if i == 0 {
            aln_len = seq_bytes.len();
        } else if seq_bytes.len() != aln_len {
            return Err(SegError::InvalidFormat(format!(
                "unequal alignment length:\n{}",
                String::from_utf8_lossy(line)
            )));
        }
        let mut gaps = 0;
        let mut has_frameshift = false;
        for &b in seq_bytes {
            match b {
                b'-' => gaps += 1,
                b'/' | b'\\' => has_frameshift = true,
                _ => {}
            }
        }
        let letters = (seq_bytes.len() - gaps) as i64;
        *letter_length = if has_frameshift || letters < span { 3 } else { 1 };
        *length_per_letter = 1;
        *start = row_start;
        if strand == b"-" {
            *start = coords::apply_reverse(*start, seq_len);
        }
        if letters > span {
            *length_per_letter = 3;
            *start *= 3;
            len_div = 3;
        }
        *name = name_span.0..name_span.1;
        *seq = seq_span.0..seq_span.1;
    }

    let mut run = 0;
    for pos in 0..aln_len {
        if rows.iter().all(|r| r.symbol(pos) != b'-') {
            run += 1;
        } else {
            if run > 0 {
                emit(out, run, rows, len_div, aln_num, pos as i64, cmd)?;
            }
            run = 0;
        }
        for r in rows.iter_mut() {
            match r.symbol(pos) {
                b'/' => r.start -= 1,
                b'\\' => r.start += 1,
                b'-' => {}
                _ => r.start += r.letter_length,
            }
        }
    }
    if run > 0 {
        emit(out, run, rows, len_div, aln_num, aln_len as i64, cmd)?;
    }
    Ok(())
}

/// Emit one gapless run. `aln_pos` is the column just past the run.
fn emit<W: Write>(
    out: &mut SegWriter<W>,
    run: i64,
    rows: &[MafRow],
    len_div: i64,
    aln_num: u64,
    aln_pos: i64,
    cmd: &ImportCommand,
) -> Result<()> {
    let length = coords::scale_translated(run, len_div);
    let mut parts: Vec<OutPart> = rows
        .iter()
        .map(|r| OutPart {
            name: &r.line[r.name.clone()],
            start: coords::scale_translated(
                r.start - run * r.letter_length,
                r.length_per_letter,
            ),
            letter_length: r.letter_length,
        })
        .collect();
    let aln = cmd
        .alignment_columns
        .then(|| (aln_num, coords::scale_translated(aln_pos - run, len_div)));
    write_alignment_seg(out, length, &mut parts, cmd.forward_segment, aln)
}

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
    aln_num: &mut u64,
) -> Result<()> {
    let mut rows: Vec<MafRow> = Vec::new();
    let mut num_rows = 0;
    let mut line = Vec::new();
    while read_line(&mut input, &mut line)? {
        if line.first() == Some(&b's') {
            num_rows += 1;
            if rows.len() < num_rows {
                rows.push(MafRow::default());
            }
            std::mem::swap(&mut rows[num_rows - 1].line, &mut line);
        } else if !line.first().is_some_and(|&b| b > b' ') {
            if num_rows > 0 {
                *aln_num += 1;
                do_one_maf(out, &mut rows[..num_rows], *aln_num, cmd)?;
            }
            num_rows = 0;
        }
    }
    if num_rows > 0 {
        *aln_num += 1;
        do_one_maf(out, &mut rows[..num_rows], *aln_num, cmd)?;
    }
    Ok(())
}
