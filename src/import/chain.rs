//! UCSC chain decoder.
//!
//! A `chain` header line establishes the current target and query
//! positions (shifted to right-anchored negative form on the reverse
//! strand); the numeric lines that follow are `size [dt dq]` blocks, with
//! a bare `size` ending the chain. Each block becomes one SEG record
//! before the gaps advance the positions.

use crate::error::{Result, SegError};
use crate::import::{write_alignment_seg, ImportCommand, OutPart};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};
use std::ops::Range;

struct ChainState {
    line: Vec<u8>,
    t_name: Range<usize>,
    q_name: Range<usize>,
    t_pos: i64,
    q_pos: i64,
}

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
) -> Result<()> {
    let mut line = Vec::new();
    let mut state: Option<ChainState> = None;
    while read_line(&mut input, &mut line)? {
        let mut sc = Scanner::new(&line);
        let Some(word) = sc.word() else { continue };
        if word[0] == b'#' {
            continue;
        }
        if word == b"chain" {
            let parsed = (|| {
                sc.word()?; // score
                let t_name = sc.word_span()?;
                let t_size = sc.long()?;
                let t_strand = sc.word()?;
                let t_pos = sc.long()?;
                sc.word()?; // tEnd
                let q_name = sc.word_span()?;
                let q_size = sc.long()?;
                let q_strand = sc.word()?;
                let q_pos = sc.long()?;
                Some((t_name, t_size, t_strand, t_pos, q_name, q_size, q_strand, q_pos))
            })();
            let Some((t_name, t_size, t_strand, mut t_pos, q_name, q_size, q_strand, mut q_pos)) =
                parsed
            else {
                return Err(SegError::bad_line("CHAIN", &line));
            };
            if t_strand == b"-" {
                t_pos -= t_size;
            }
            if q_strand == b"-" {
                q_pos -= q_size;
            }
            state = Some(ChainState {
                line: line.clone(),
                t_name: t_name.0..t_name.1,
                q_name: q_name.0..q_name.1,
                t_pos,
                q_pos,
            });
        } else {
            let Some(st) = state.as_mut() else {
                return Err(SegError::bad_line("CHAIN", &line));
            };
            let mut sc = Scanner::new(&line);
            let Some(size) = sc.long() else {
                return Err(SegError::bad_line("CHAIN", &line));
            };
            let mut parts = [
                OutPart {
                    name: &st.line[st.t_name.clone()],
                    start: st.t_pos,
                    letter_length: 1,
                },
                OutPart {
                    name: &st.line[st.q_name.clone()],
                    start: st.q_pos,
                    letter_length: 1,
                },
            ];
            write_alignment_seg(out, size, &mut parts, cmd.forward_segment, None)?;
            if let (Some(dt), Some(dq)) = (sc.long(), sc.long()) {
                st.t_pos += size + dt;
                st.q_pos += size + dq;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::Format;

    fn import_chain(forward_segment: Option<usize>, input: &str) -> String {
        let mut cmd = ImportCommand::new(Format::Chain);
        cmd.forward_segment = forward_segment;
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            import(input.as_bytes(), &mut w, &cmd).unwrap();
            w.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    const CHAIN: &str = concat!(
        "chain 1000 chrT 1000 + 0 45 chrQ 500 - 10 45 1\n",
        "10\t5\t5\n",
        "20\n",
        "\n",
    );

    #[test]
    fn test_blocks_advance_positions() {
        let got = import_chain(None, CHAIN);
        assert_eq!(got, "10\tchrT\t0\tchrQ\t-490\n20\tchrT\t15\tchrQ\t-475\n");
    }

    #[test]
    fn test_forward_segment_flips_whole_records() {
        let got = import_chain(Some(2), CHAIN);
        assert_eq!(got, "10\tchrT\t-10\tchrQ\t480\n20\tchrT\t-35\tchrQ\t455\n");
    }

    #[test]
    fn test_forward_strands_unchanged() {
        let input = concat!(
            "chain 99 chrT 1000 + 100 120 chrQ 500 + 7 27 2\n",
            "20\n",
        );
        assert_eq!(import_chain(None, input), "20\tchrT\t100\tchrQ\t7\n");
    }

    #[test]
    fn test_comments_between_chains() {
        let input = concat!(
            "# liftover chains\n",
            "chain 99 chrT 1000 + 100 120 chrQ 500 + 7 27 2\n",
            "20\n",
        );
        assert_eq!(import_chain(None, input), "20\tchrT\t100\tchrQ\t7\n");
    }

    #[test]
    fn test_bad_header_is_fatal() {
        let mut cmd = ImportCommand::new(Format::Chain);
        let mut out = Vec::new();
        let mut w = SegWriter::new(&mut out);
        let err = import(&b"chain 1000 chrT\n"[..], &mut w, &cmd).unwrap_err();
        assert!(err.to_string().starts_with("bad CHAIN line:"));
    }

    #[test]
    fn test_non_numeric_block_is_fatal() {
        let mut cmd = ImportCommand::new(Format::Chain);
        let mut out = Vec::new();
        let mut w = SegWriter::new(&mut out);
        let input = b"chain 99 chrT 1000 + 100 120 chrQ 500 + 7 27 2\nxyz\n";
        let err = import(&input[..], &mut w, &cmd).unwrap_err();
        assert!(err.to_string().starts_with("bad CHAIN line:"));
    }
}
