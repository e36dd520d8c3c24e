//! lastTab decoder.
//!
//! Tabular LAST output: a score, then (name, start, span, strand, seqlen)
//! for reference and query, then a blocks string alternating gapless
//! sizes with `rgap:qgap` pairs. The walked distance must match the
//! declared spans; a mismatch means the input was a translated alignment,
//! which this format cannot express.

use crate::coords;
use crate::error::{Result, SegError};
use crate::import::{write_alignment_seg, ImportCommand, OutPart};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

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
        if first[0] == b'#' {
            continue;
        }
        let parsed = (|| {
            let r_name = sc.word()?;
            let r_beg = sc.long()?;
            let r_span = sc.long()?;
            let r_strand = sc.word()?;
            let r_seq_len = sc.long()?;
            let q_name = sc.word()?;
            let q_beg = sc.long()?;
            let q_span = sc.long()?;
            let q_strand = sc.word()?;
            let q_seq_len = sc.long()?;
            let blocks = sc.word()?;
            Some((
                r_name, r_beg, r_span, r_strand, r_seq_len, q_name, q_beg, q_span, q_strand,
                q_seq_len, blocks,
            ))
        })();
        let Some((
            r_name,
            mut r_beg,
            r_span,
            r_strand,
            r_seq_len,
            q_name,
            mut q_beg,
            q_span,
            q_strand,
            q_seq_len,
            blocks,
        )) = parsed
        else {
            return Err(SegError::bad_line("lastTab", &line));
        };
        if r_strand == b"-" {
            r_beg = coords::apply_reverse(r_beg, r_seq_len);
        }
        let r_end = r_beg + r_span;
        if q_strand == b"-" {
            q_beg = coords::apply_reverse(q_beg, q_seq_len);
        }
        let q_end = q_beg + q_span;
        *aln_num += 1;
        let mut aln_pos = 0;
        let mut bs = Scanner::new(blocks);
        loop {
            let Some(x) = bs.long() else {
                return Err(SegError::bad_line("lastTab", &line));
            };
            if bs.byte() == Some(b':') {
                let Some(y) = bs.long() else {
                    return Err(SegError::bad_line("lastTab", &line));
                };
                r_beg += x;
                q_beg += y;
                aln_pos += x + y;
                bs.byte();
            } else {
                let aln = cmd.alignment_columns.then_some((*aln_num, aln_pos));
                let mut parts = [
                    OutPart {
                        name: r_name,
                        start: r_beg,
                        letter_length: 1,
                    },
                    OutPart {
                        name: q_name,
                        start: q_beg,
                        letter_length: 1,
                    },
                ];
                write_alignment_seg(out, x, &mut parts, cmd.forward_segment, aln)?;
                r_beg += x;
                q_beg += x;
                aln_pos += x;
            }
            if !bs.ok() {
                break;
            }
        }
        if r_beg != r_end || q_beg != q_end {
            return Err(SegError::InvalidFormat(format!(
                "failed on this line:\n{}",
                String::from_utf8_lossy(&line)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::Format;

    fn import_lasttab(with_aln: bool, input: &str) -> String {
        let mut cmd = ImportCommand::new(Format::LastTab);
        cmd.alignment_columns = with_aln;
        let mut out = Vec::new();
        let mut aln_num = 0;
        {
            let mut w = SegWriter::new(&mut out);
            import(input.as_bytes(), &mut w, &cmd, &mut aln_num).unwrap();
            w.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    const LINE: &str = "37\tref\t10\t10\t+\t1000\tqry\t5\t11\t+\t500\t4,1:2,5\n";

    #[test]
    fn test_blocks_and_gaps() {
        assert_eq!(
            import_lasttab(false, LINE),
            "4\tref\t10\tqry\t5\n5\tref\t15\tqry\t11\n"
        );
    }

    #[test]
    fn test_alignment_columns() {
        assert_eq!(
            import_lasttab(true, LINE),
            "4\tref\t10\tqry\t5\t1\t0\n5\tref\t15\tqry\t11\t1\t7\n"
        );
    }

    #[test]
    fn test_alignment_number_counts_lines() {
        let two = format!("{LINE}{LINE}");
        let got = import_lasttab(true, &two);
        let nums: Vec<&str> = got
            .lines()
            .map(|l| l.split('\t').nth(5).unwrap())
            .collect();
        assert_eq!(nums, ["1", "1", "2", "2"]);
    }

    #[test]
    fn test_reverse_strand_subtracts_seq_length() {
        let line = "5\tref\t10\t4\t-\t1000\tqry\t5\t4\t+\t500\t4\n";
        assert_eq!(import_lasttab(false, line), "4\tref\t-990\tqry\t5\n");
    }

    #[test]
    fn test_span_mismatch_is_fatal() {
        let mut cmd = ImportCommand::new(Format::LastTab);
        let mut out = Vec::new();
        let mut aln_num = 0;
        let mut w = SegWriter::new(&mut out);
        let line = b"5\tref\t10\t9\t+\t1000\tqry\t5\t10\t+\t500\t4\n";
        let err = import(&line[..], &mut w, &cmd, &mut aln_num).unwrap_err();
        assert!(err.to_string().starts_with("failed on this line:"));
    }

    #[test]
    fn test_garbage_blocks_are_fatal() {
        let mut cmd = ImportCommand::new(Format::LastTab);
        let mut out = Vec::new();
        let mut aln_num = 0;
        let mut w = SegWriter::new(&mut out);
        let line = b"5\tref\t10\t9\t+\t1000\tqry\t5\t10\t+\t500\t4,x\n";
        let err = import(&line[..], &mut w, &cmd, &mut aln_num).unwrap_err();
        assert!(err.to_string().starts_with("bad lastTab line:"));
    }
}
