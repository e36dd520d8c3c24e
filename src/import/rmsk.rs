//! RepeatMasker decoder.
//!
//! Two schemas share this importer. RepeatMasker `.out` lines lead with
//! the score and three divergence percentages, use 1-based begins, and
//! pack the repeat class into one field. The UCSC rmsk table adds a bin
//! column, is already 0-based, and splits class and family into two
//! fields. Lines fitting neither schema (the `.out` header) are skipped.
//!
//! The repeat side of each record starts at 0 on the forward strand and
//! at minus the match length on the reverse strand (RepeatMasker writes
//! `C` for reverse).

use crate::error::Result;
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

struct Rmsk<'a> {
    q_name: &'a [u8],
    beg: i64,
    end: i64,
    strand: &'a [u8],
    r_name: &'a [u8],
    r_type: &'a [u8],
    r_type2: Option<&'a [u8]>,
}

/// RepeatMasker `.out` field order; begin is 1-based.
fn parse_out(line: &[u8]) -> Option<Rmsk<'_>> {
    let mut sc = Scanner::new(line);
    for _ in 0..4 {
        sc.word()?; // score, divergence, deletion, insertion
    }
    let q_name = sc.word()?;
    let beg = sc.long()?;
    let end = sc.long()?;
    sc.word()?; // left
    let strand = sc.word()?;
    let r_name = sc.word()?;
    let r_type = sc.word()?;
    Some(Rmsk {
        q_name,
        beg: beg - 1,
        end,
        strand,
        r_name,
        r_type,
        r_type2: None,
    })
}

/// UCSC rmsk table field order; already 0-based.
fn parse_table(line: &[u8]) -> Option<Rmsk<'_>> {
    let mut sc = Scanner::new(line);
    for _ in 0..5 {
        sc.word()?; // bin, score, divergence, deletion, insertion
    }
    let q_name = sc.word()?;
    let beg = sc.long()?;
    let end = sc.long()?;
    sc.word()?; // left
    let strand = sc.word()?;
    let r_name = sc.word()?;
    let r_type = sc.word()?;
    let r_type2 = sc.word()?;
    Some(Rmsk {
        q_name,
        beg,
        end,
        strand,
        r_name,
        r_type,
        r_type2: Some(r_type2),
    })
}

pub(crate) fn import<R: BufRead, W: Write>(mut input: R, out: &mut SegWriter<W>) -> Result<()> {
    let mut line = Vec::new();
    let mut repeat_name = Vec::new();
    while read_line(&mut input, &mut line)? {
        let Some(r) = parse_out(&line).or_else(|| parse_table(&line)) else {
            continue;
        };
        repeat_name.clear();
        repeat_name.extend_from_slice(r.r_name);
        repeat_name.push(b'#');
        repeat_name.extend_from_slice(r.r_type);
        if let Some(r_type2) = r.r_type2 {
            if r_type2 != r.r_type {
                repeat_name.push(b'/');
                repeat_name.extend_from_slice(r_type2);
            }
        }
        let repeat_start = if r.strand == b"+" { 0 } else { r.beg - r.end };
        out.write_record(
            r.end - r.beg,
            [(r.q_name, r.beg), (&repeat_name[..], repeat_start)],
            None,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_rmsk(input: &str) -> String {
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            import(input.as_bytes(), &mut w).unwrap();
            w.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_out_schema_is_one_based() {
        let line = "463\t1.3\t0.6\t1.7\tchr1\t1001\t1100\t(248955322)\t+\tAluYb8\tSINE/Alu\n";
        assert_eq!(import_rmsk(line), "100\tchr1\t1000\tAluYb8#SINE/Alu\t0\n");
    }

    #[test]
    fn test_out_schema_reverse_strand() {
        let line = "463\t1.3\t0.6\t1.7\tchr1\t1001\t1100\t(0)\tC\tAluYb8\tSINE/Alu\n";
        assert_eq!(import_rmsk(line), "100\tchr1\t1000\tAluYb8#SINE/Alu\t-100\n");
    }

    #[test]
    fn test_table_schema_with_family() {
        let line = "585\t463\t13\t6\t17\tchr1\t1000\t1100\t-248955322\t+\tAluYb8\tSINE\tAlu\n";
        assert_eq!(import_rmsk(line), "100\tchr1\t1000\tAluYb8#SINE/Alu\t0\n");
    }

    #[test]
    fn test_table_schema_equal_family_elides_suffix() {
        let line = "585\t463\t13\t6\t17\tchr1\t1000\t1100\t-1\t+\tLow\tSimple\tSimple\n";
        assert_eq!(import_rmsk(line), "100\tchr1\t1000\tLow#Simple\t0\n");
    }

    #[test]
    fn test_header_lines_are_skipped() {
        let input = concat!(
            "   SW   perc perc perc  query     position in query\n",
            "score   div. del. ins.  sequence  begin end\n",
            "\n",
            "463\t1.3\t0.6\t1.7\tchr1\t1001\t1100\t(0)\t+\tAluYb8\tSINE/Alu\n",
        );
        assert_eq!(import_rmsk(input), "100\tchr1\t1000\tAluYb8#SINE/Alu\t0\n");
    }
}
