//! GTF decoder.
//!
//! GTF interleaves transcripts, so this decoder is two-pass: collect the
//! exon and codon lines, parse them with their transcript_id, sort by
//! (transcript, chrom, strand, begin), then scan the sorted records
//! emitting one gene per group. The CDS interval comes from the codon
//! features: begin of the first seen, end of the last.

use crate::error::{Result, SegError};
use crate::import::gene::{self, ExonRange};
use crate::import::ImportCommand;
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use memchr::memchr;
use std::io::{BufRead, Write};

struct GtfRecord<'a> {
    name: &'a [u8],
    chrom: &'a [u8],
    strand: &'a [u8],
    feature: &'a [u8],
    beg: i64,
    end: i64,
}

/// Find the transcript_id value in the attributes column, unquoting and
/// dropping a trailing semicolon.
fn transcript_id<'a>(sc: &mut Scanner<'a>) -> Option<&'a [u8]> {
    loop {
        let tag = sc.word()?;
        let mut value = sc.word()?;
        if tag == b"transcript_id" {
            if value.last() == Some(&b';') {
                value = &value[..value.len() - 1];
            }
            if value.first() == Some(&b'"') {
                value = &value[1..];
            }
            if value.last() == Some(&b'"') {
                value = &value[..value.len() - 1];
            }
            return Some(value);
        }
    }
}

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
) -> Result<()> {
    // pass 1: keep exon and codon lines (and short lines, so they get
    // reported below instead of vanishing)
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut line = Vec::new();
    while read_line(&mut input, &mut line)? {
        let mut sc = Scanner::new(&line);
        let Some(first) = sc.word() else { continue };
        if first[0] == b'#' {
            continue;
        }
        sc.word();
        match sc.word() {
            Some(f) if f != b"exon" && f != b"start_codon" && f != b"stop_codon" => {}
            _ => lines.push(line.clone()),
        }
    }

    // pass 2: parse
    let mut records: Vec<GtfRecord> = Vec::with_capacity(lines.len());
    for raw in &lines {
        let data = match memchr(b'#', raw) {
            Some(i) => &raw[..i],
            None => &raw[..],
        };
        let mut sc = Scanner::new(data);
        let parsed = (|| {
            let chrom = sc.word()?;
            sc.word()?; // source
            let feature = sc.word()?;
            let beg = sc.long()?;
            let end = sc.long()?;
            sc.word()?; // score
            let strand = sc.word()?;
            sc.word()?; // frame
            Some((chrom, feature, beg, end, strand))
        })();
        let Some((chrom, feature, beg, end, strand)) = parsed else {
            return Err(SegError::bad_line("GTF", raw));
        };
        let Some(name) = transcript_id(&mut sc) else {
            return Err(SegError::InvalidFormat(format!(
                "missing transcript_id:\n{}",
                String::from_utf8_lossy(raw)
            )));
        };
        records.push(GtfRecord {
            name,
            chrom,
            strand,
            feature,
            beg: beg - 1,
            end,
        });
    }

    records.sort_by(|a, b| {
        a.name
            .cmp(b.name)
            .then_with(|| a.chrom.cmp(b.chrom))
            .then_with(|| a.strand.cmp(b.strand))
            .then_with(|| a.beg.cmp(&b.beg))
    });

    // grouped scan
    let mut exons: Vec<ExonRange> = Vec::new();
    let mut cds_beg = 0;
    let mut cds_end = 0;
    for (i, r) in records.iter().enumerate() {
        if r.feature == b"exon" {
            exons.push(ExonRange {
                beg: r.beg,
                end: r.end,
            });
        } else {
            if cds_end == 0 {
                cds_beg = r.beg;
            }
            cds_end = r.end;
        }
        let group_ends = match records.get(i + 1) {
            Some(next) => {
                (r.name, r.chrom, r.strand) != (next.name, next.chrom, next.strand)
            }
            None => true,
        };
        if group_ends {
            gene::write_gene(
                out,
                r.chrom,
                r.name,
                r.strand == b"+",
                &exons,
                cds_beg,
                cds_end,
                &cmd.regions,
            )?;
            exons.clear();
            cds_beg = 0;
            cds_end = 0;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{Format, GeneRegions};

    fn import_gtf(regions: GeneRegions, input: &str) -> String {
        let mut cmd = ImportCommand::new(Format::Gtf);
        cmd.regions = regions;
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            import(input.as_bytes(), &mut w, &cmd).unwrap();
            w.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    const TWO_EXONS: &str = concat!(
        "chr1\thavana\texon\t101\t110\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";\n",
        "chr1\thavana\tCDS\t106\t120\t.\t+\t0\tgene_id \"g1\"; transcript_id \"t1\";\n",
        "chr1\thavana\texon\t116\t130\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";\n",
        "chr1\thavana\tstart_codon\t106\t108\t.\t+\t0\tgene_id \"g1\"; transcript_id \"t1\";\n",
        "chr1\thavana\tstop_codon\t118\t120\t.\t+\t0\tgene_id \"g1\"; transcript_id \"t1\";\n",
    );

    #[test]
    fn test_exons_one_transcript() {
        let got = import_gtf(GeneRegions::default(), TWO_EXONS);
        assert_eq!(got, "10\tchr1\t100\tt1\t0\n15\tchr1\t115\tt1\t10\n");
    }

    #[test]
    fn test_cds_from_codons() {
        let regions = GeneRegions {
            cds: true,
            ..GeneRegions::default()
        };
        let got = import_gtf(regions, TWO_EXONS);
        assert_eq!(got, "5\tchr1\t105\tt1\t5\n5\tchr1\t115\tt1\t10\n");
    }

    #[test]
    fn test_interleaved_transcripts_are_grouped() {
        let input = concat!(
            "chr1\tx\texon\t201\t210\t.\t+\t.\ttranscript_id \"t2\";\n",
            "chr1\tx\texon\t101\t110\t.\t+\t.\ttranscript_id \"t1\";\n",
            "chr1\tx\texon\t221\t230\t.\t+\t.\ttranscript_id \"t2\";\n",
        );
        let regions = GeneRegions {
            introns: true,
            ..GeneRegions::default()
        };
        let got = import_gtf(regions, input);
        assert_eq!(got, "10\tchr1\t210\tt2\t10\n");
    }

    #[test]
    fn test_inline_comment_is_stripped() {
        let input = "chr1\tx\texon\t101\t110\t.\t+\t.\ttranscript_id \"t1\"; # note\n";
        let got = import_gtf(GeneRegions::default(), input);
        assert_eq!(got, "10\tchr1\t100\tt1\t0\n");
    }

    #[test]
    fn test_unquoted_transcript_id() {
        let input = "chr1\tx\texon\t101\t110\t.\t+\t.\ttranscript_id t1;\n";
        let got = import_gtf(GeneRegions::default(), input);
        assert_eq!(got, "10\tchr1\t100\tt1\t0\n");
    }

    #[test]
    fn test_other_features_are_ignored() {
        let input = concat!(
            "chr1\tx\tgene\t1\t500\t.\t+\t.\ttranscript_id \"t1\";\n",
            "chr1\tx\texon\t101\t110\t.\t+\t.\ttranscript_id \"t1\";\n",
        );
        let got = import_gtf(GeneRegions::default(), input);
        assert_eq!(got, "10\tchr1\t100\tt1\t0\n");
    }

    #[test]
    fn test_codon_only_transcript_emits_nothing() {
        // a transcript group can consist solely of codon features; with
        // no exon line there is nothing to anchor, so nothing is written
        let input = concat!(
            "chr1\tx\tstart_codon\t101\t103\t.\t+\t0\ttranscript_id \"t1\";\n",
            "chr1\tx\tstop_codon\t131\t133\t.\t+\t0\ttranscript_id \"t1\";\n",
            "chr1\tx\texon\t201\t210\t.\t+\t.\ttranscript_id \"t2\";\n",
        );
        let got = import_gtf(GeneRegions::default(), input);
        assert_eq!(got, "10\tchr1\t200\tt2\t0\n");
    }

    #[test]
    fn test_missing_transcript_id_is_fatal() {
        let mut cmd = ImportCommand::new(Format::Gtf);
        cmd.regions = GeneRegions::default();
        let mut out = Vec::new();
        let mut w = SegWriter::new(&mut out);
        let input = b"chr1\tx\texon\t101\t110\t.\t+\t.\tgene_id \"g1\";\n";
        let err = import(&input[..], &mut w, &cmd).unwrap_err();
        assert!(err.to_string().starts_with("missing transcript_id:"));
    }

    #[test]
    fn test_short_line_is_fatal() {
        let mut cmd = ImportCommand::new(Format::Gtf);
        cmd.regions = GeneRegions::default();
        let mut out = Vec::new();
        let mut w = SegWriter::new(&mut out);
        let err = import(&b"chr1\tx\n"[..], &mut w, &cmd).unwrap_err();
        assert!(err.to_string().starts_with("bad GTF line:"));
    }
}
