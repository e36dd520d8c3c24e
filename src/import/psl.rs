//! PSL decoder.
//!
//! 21 columns; the strand field holds the query strand and optionally the
//! target strand. Starts come from the three comma lists, shifted to
//! right-anchored negative form on reverse strands. Translated PSL is
//! detected from the last block: the distance from its start to the
//! declared end, divided by its size, gives each side's per-letter
//! multiplier (1 or 3).

use crate::coords;
use crate::error::{Result, SegError};
use crate::import::{write_alignment_seg, ImportCommand, OutPart};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

#[inline]
fn is_strand(c: u8) -> bool {
    c == b'+' || c == b'-'
}

/// Last entry of a comma-separated integer list.
fn last_long(list: &[u8]) -> Option<i64> {
    let mut sc = Scanner::new(list);
    let mut last = None;
    while let Some(x) = sc.long() {
        last = Some(x);
        sc.skip_byte();
    }
    last
}

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
    aln_num: &mut u64,
) -> Result<()> {
    let mut line = Vec::new();
    while read_line(&mut input, &mut line)? {
        let mut sc = Scanner::new(&line);
        let Some(first) = sc.word() else { continue };
        if !first[0].is_ascii_digit() {
            continue; // header lines
        }
        let parsed = (|| {
            for _ in 0..7 {
                sc.word()?; // misMatches .. tBaseInsert
            }
            let strand = sc.word()?;
            let q_name = sc.word()?;
            let q_size = sc.long()?;
            sc.word()?; // qStart
            let q_end = sc.long()?;
            let t_name = sc.word()?;
            let t_size = sc.long()?;
            sc.word()?; // tStart
            let t_end = sc.long()?;
            sc.word()?; // blockCount
            let block_sizes = sc.word()?;
            let q_starts = sc.word()?;
            let t_starts = sc.word()?;
            Some((
                strand, q_name, q_size, q_end, t_name, t_size, t_end, block_sizes, q_starts,
                t_starts,
            ))
        })();
        let Some((strand, q_name, q_size, q_end, t_name, t_size, t_end, block_sizes, q_starts, t_starts)) =
            parsed
        else {
            return Err(SegError::bad_line("PSL", &line));
        };
        let q_strand = strand[0];
        let t_strand = if strand.len() > 1 { strand[1] } else { b'+' };
        if strand.len() > 2 || !is_strand(q_strand) || !is_strand(t_strand) {
            return Err(SegError::InvalidFormat(format!(
                "unrecognized strand:\n{}",
                String::from_utf8_lossy(&line)
            )));
        }
        let (last_size, last_t, last_q) = match (
            last_long(block_sizes),
            last_long(t_starts),
            last_long(q_starts),
        ) {
            (Some(s), Some(t), Some(q)) if s > 0 => (s, t, q),
            _ => continue,
        };
        let signed_t = |x| {
            if t_strand == b'-' {
                coords::apply_reverse(x, t_size)
            } else {
                x
            }
        };
        let signed_q = |x| {
            if q_strand == b'-' {
                coords::apply_reverse(x, q_size)
            } else {
                x
            }
        };
        let t_end_signed = signed_t(t_end);
        let q_end_signed = signed_q(q_end);
        let last_t_signed = signed_t(last_t);
        let last_q_signed = signed_q(last_q);
        let t_mul = ((t_end_signed - last_t_signed) / last_size).max(1);
        let q_mul = ((q_end_signed - last_q_signed) / last_size).max(1);

        *aln_num += 1;
        let mut aln_pos = 0;
        let mut prev_ends: Option<(i64, i64)> = None;
        let mut sizes = Scanner::new(block_sizes);
        let mut ts = Scanner::new(t_starts);
        let mut qs = Scanner::new(q_starts);
        while let (Some(size), Some(t0), Some(q0)) = (sizes.long(), ts.long(), qs.long()) {
            let t_start = signed_t(t0);
            let q_start = signed_q(q0);
            if let Some((t_prev, q_prev)) = prev_ends {
                aln_pos += (t_start - t_prev) / t_mul + (q_start - q_prev) / q_mul;
            }
            let aln = cmd.alignment_columns.then_some((*aln_num, aln_pos));
            let mut parts = [
                OutPart {
                    name: t_name,
                    start: t_start,
                    letter_length: t_mul,
                },
                OutPart {
                    name: q_name,
                    start: q_start,
                    letter_length: q_mul,
                },
            ];
            write_alignment_seg(out, size, &mut parts, cmd.forward_segment, aln)?;
            aln_pos += size;
            prev_ends = Some((t_start + size * t_mul, q_start + size * q_mul));
            sizes.skip_byte();
            ts.skip_byte();
            qs.skip_byte();
        }
    }
    Ok(())
}
