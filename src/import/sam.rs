//! SAM decoder.
//!
//! Header lines start with `@`; unmapped records (flag 4) are dropped.
//! The CIGAR walk accumulates M/=/X into gapless blocks, flushing on the
//! operators that shift one side (I/S/H the query, D/N the reference);
//! unknown operators are ignored. On reverse-strand records the query
//! starts are rewritten relative to the total query advance, which makes
//! them negative; `-f 2` then pivots the whole record forward.

use crate::error::{Result, SegError};
use crate::import::{write_alignment_seg, ImportCommand, OutPart};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy)]
struct SegmentPair {
    r_start: i64,
    q_start: i64,
    length: i64,
}

/// Walk a CIGAR string, collecting gapless blocks and advancing both
/// positions past its total extent.
fn parse_cigar(blocks: &mut Vec<SegmentPair>, cigar: &[u8], rpos: &mut i64, qpos: &mut i64) {
    let mut sc = Scanner::new(cigar);
    let mut length = 0;
    loop {
        let (Some(size), Some(op)) = (sc.long(), sc.byte()) else {
            break;
        };
        match op {
            b'M' | b'=' | b'X' => length += size,
            b'D' | b'N' => {
                if length > 0 {
                    blocks.push(SegmentPair {
                        r_start: *rpos,
                        q_start: *qpos,
                        length,
                    });
                }
                *rpos += length + size;
                *qpos += length;
                length = 0;
            }
            b'I' | b'S' | b'H' => {
                if length > 0 {
                    blocks.push(SegmentPair {
                        r_start: *rpos,
                        q_start: *qpos,
                        length,
                    });
                }
                *rpos += length;
                *qpos += length + size;
                length = 0;
            }
            _ => {}
        }
    }
    if length > 0 {
        blocks.push(SegmentPair {
            r_start: *rpos,
            q_start: *qpos,
            length,
        });
    }
    *rpos += length;
    *qpos += length;
}

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
) -> Result<()> {
    let mut line = Vec::new();
    let mut blocks: Vec<SegmentPair> = Vec::new();
    let mut q_name = Vec::new();
    while read_line(&mut input, &mut line)? {
        if line.first() == Some(&b'@') {
            continue;
        }
        let mut sc = Scanner::new(&line);
        let Some(qname) = sc.word() else { continue };
        let parsed = (|| {
            let flag = sc.long()?;
            let r_name = sc.word()?;
            let r_pos = sc.long()?;
            sc.word()?; // mapq
            let cigar = sc.word()?;
            Some((flag, r_name, r_pos, cigar))
        })();
        let Some((flag, r_name, r_pos, cigar)) = parsed else {
            return Err(SegError::bad_line("SAM", &line));
        };
        if flag & 4 != 0 {
            continue; // unmapped
        }
        let is_reverse = flag & 16 != 0;
        let suffix: &[u8] = if flag & 64 != 0 {
            b"/1"
        } else if flag & 128 != 0 {
            b"/2"
        } else {
            b""
        };
        let mut rpos = r_pos - 1;
        let mut qpos = 0;
        parse_cigar(&mut blocks, cigar, &mut rpos, &mut qpos);
        q_name.clear();
        q_name.extend_from_slice(qname);
        q_name.extend_from_slice(suffix);
        for x in &blocks {
            let q_start = if is_reverse { x.q_start - qpos } else { x.q_start };
            let mut parts = [
                OutPart {
                    name: r_name,
                    start: x.r_start,
                    letter_length: 1,
                },
                OutPart {
                    name: &q_name,
                    start: q_start,
                    letter_length: 1,
                },
            ];
            write_alignment_seg(out, x.length, &mut parts, cmd.forward_segment, None)?;
        }
        blocks.clear();
    }
    Ok(())
}
