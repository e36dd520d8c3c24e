//! Gene-region extraction shared by the gene-shaped formats (BED,
//! genePred, GTF).
//!
//! A gene arrives as a sorted exon list plus a CDS interval; what gets
//! emitted depends on the region flags. Every record pairs the genomic
//! side (chrom) with the transcript side (name), so downstream joins can
//! relate the two coordinate systems.

use crate::error::Result;
use crate::import::GeneRegions;
use crate::writer::SegWriter;
use std::io::Write;

/// Half-open exon span on the forward strand.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExonRange {
    pub beg: i64,
    pub end: i64,
}

/// Emit the records for one gene.
pub(crate) fn write_gene<W: Write>(
    out: &mut SegWriter<W>,
    chrom: &[u8],
    name: &[u8],
    is_forward: bool,
    exons: &[ExonRange],
    cds_beg: i64,
    cds_end: i64,
    regions: &GeneRegions,
) -> Result<()> {
    if exons.is_empty() {
        return Ok(());
    }
    if regions.primary_transcripts {
        primary_transcript(out, chrom, name, is_forward, exons)
    } else if regions.introns {
        introns(out, chrom, name, is_forward, exons)
    } else {
        exon_windows(out, chrom, name, is_forward, exons, cds_beg, cds_end, regions)
    }
}

/// One record spanning first exon start to last exon end, anchored at the
/// gene's 5' end.
fn primary_transcript<W: Write>(
    out: &mut SegWriter<W>,
    chrom: &[u8],
    name: &[u8],
    is_forward: bool,
    exons: &[ExonRange],
) -> Result<()> {
    let beg = exons[0].beg;
    let end = exons[exons.len() - 1].end;
    let size = end - beg;
    let pos = if is_forward { 0 } else { -size };
    out.write_record(size, [(chrom, beg), (name, pos)], None)
}

/// One record per gap between adjacent exons. The transcript side counts
/// from the gene's 5' end; on the reverse strand the genomic side carries
/// the strand sign instead.
fn introns<W: Write>(
    out: &mut SegWriter<W>,
    chrom: &[u8],
    name: &[u8],
    is_forward: bool,
    exons: &[ExonRange],
) -> Result<()> {
    if is_forward {
        let origin = exons[0].beg;
        for pair in exons.windows(2) {
            let i = pair[0].end;
            let j = pair[1].beg;
            out.write_record(j - i, [(chrom, i), (name, i - origin)], None)?;
        }
    } else {
        let origin = exons[exons.len() - 1].end;
        for pair in exons.windows(2) {
            let i = pair[0].end;
            let j = pair[1].beg;
            out.write_record(j - i, [(chrom, -j), (name, origin - j)], None)?;
        }
    }
    Ok(())
}

/// Intersect each exon with a print window and emit the surviving pieces.
/// The transcript-side position accumulates exon lengths; on the reverse
/// strand it starts at minus the total, so transcript starts come out
/// negative.
fn print_exons<W: Write>(
    out: &mut SegWriter<W>,
    chrom: &[u8],
    name: &[u8],
    is_forward: bool,
    exons: &[ExonRange],
    print_beg: i64,
    print_end: i64,
) -> Result<()> {
    let mut pos = if is_forward {
        0
    } else {
        -exons.iter().map(|r| r.end - r.beg).sum::<i64>()
    };
    for r in exons {
        let beg = r.beg.max(print_beg);
        let end = r.end.min(print_end);
        if beg < end {
            out.write_record(end - beg, [(chrom, beg), (name, pos + beg - r.beg)], None)?;
        }
        pos += r.end - r.beg;
    }
    Ok(())
}

/// Choose the print window(s) from the CDS/UTR flags. 5' and 3' swap
/// sides on the reverse strand.
fn exon_windows<W: Write>(
    out: &mut SegWriter<W>,
    chrom: &[u8],
    name: &[u8],
    is_forward: bool,
    exons: &[ExonRange],
    cds_beg: i64,
    cds_end: i64,
    regions: &GeneRegions,
) -> Result<()> {
    if cds_beg >= cds_end && (regions.utr5 || regions.utr3) {
        return Ok(());
    }
    let is_beg_utr = if is_forward { regions.utr5 } else { regions.utr3 };
    let is_end_utr = if is_forward { regions.utr3 } else { regions.utr5 };
    let min_beg = exons[0].beg;
    let max_end = exons[exons.len() - 1].end;
    if regions.cds {
        let (beg, end) = match (is_beg_utr, is_end_utr) {
            (true, true) => (min_beg, max_end),
            (true, false) => (min_beg, cds_end),
            (false, true) => (cds_beg, max_end),
            (false, false) => (cds_beg, cds_end),
        };
        print_exons(out, chrom, name, is_forward, exons, beg, end)
    } else {
        match (is_beg_utr, is_end_utr) {
            (true, true) => {
                print_exons(out, chrom, name, is_forward, exons, min_beg, cds_beg)?;
                print_exons(out, chrom, name, is_forward, exons, cds_end, max_end)
            }
            (true, false) => print_exons(out, chrom, name, is_forward, exons, min_beg, cds_beg),
            (false, true) => print_exons(out, chrom, name, is_forward, exons, cds_end, max_end),
            (false, false) => print_exons(out, chrom, name, is_forward, exons, min_beg, max_end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<F>(f: F) -> String
    where
        F: FnOnce(&mut SegWriter<&mut Vec<u8>>),
    {
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            f(&mut w);
            w.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    const EXONS: [ExonRange; 2] = [
        ExonRange { beg: 100, end: 110 },
        ExonRange { beg: 115, end: 130 },
    ];

    #[test]
    fn test_primary_transcript_forward() {
        let got = collect(|w| {
            write_gene(
                w,
                b"chr1",
                b"g",
                true,
                &EXONS,
                100,
                100,
                &GeneRegions {
                    primary_transcripts: true,
                    ..GeneRegions::default()
                },
            )
            .unwrap();
        });
        assert_eq!(got, "30\tchr1\t100\tg\t0\n");
    }

    #[test]
    fn test_primary_transcript_reverse() {
        let got = collect(|w| {
            write_gene(
                w,
                b"chr1",
                b"g",
                false,
                &EXONS,
                100,
                100,
                &GeneRegions {
                    primary_transcripts: true,
                    ..GeneRegions::default()
                },
            )
            .unwrap();
        });
        assert_eq!(got, "30\tchr1\t100\tg\t-30\n");
    }

    #[test]
    fn test_introns_forward() {
        let got = collect(|w| {
            write_gene(
                w,
                b"chr1",
                b"g",
                true,
                &EXONS,
                100,
                100,
                &GeneRegions {
                    introns: true,
                    ..GeneRegions::default()
                },
            )
            .unwrap();
        });
        assert_eq!(got, "5\tchr1\t110\tg\t10\n");
    }

    #[test]
    fn test_introns_reverse_signs() {
        let got = collect(|w| {
            write_gene(
                w,
                b"chr1",
                b"g",
                false,
                &EXONS,
                100,
                100,
                &GeneRegions {
                    introns: true,
                    ..GeneRegions::default()
                },
            )
            .unwrap();
        });
        // genomic side right-anchored negative, transcript side forward
        assert_eq!(got, "5\tchr1\t-115\tg\t15\n");
    }

    #[test]
    fn test_whole_exons_forward() {
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", true, &EXONS, 100, 100, &GeneRegions::default()).unwrap();
        });
        assert_eq!(got, "10\tchr1\t100\tg\t0\n15\tchr1\t115\tg\t10\n");
    }

    #[test]
    fn test_whole_exons_reverse() {
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", false, &EXONS, 100, 100, &GeneRegions::default())
                .unwrap();
        });
        assert_eq!(got, "10\tchr1\t100\tg\t-25\n15\tchr1\t115\tg\t-15\n");
    }

    #[test]
    fn test_cds_window() {
        let got = collect(|w| {
            write_gene(
                w,
                b"chr1",
                b"g",
                true,
                &EXONS,
                105,
                120,
                &GeneRegions {
                    cds: true,
                    ..GeneRegions::default()
                },
            )
            .unwrap();
        });
        assert_eq!(got, "5\tchr1\t105\tg\t5\n5\tchr1\t115\tg\t10\n");
    }

    #[test]
    fn test_utrs_are_cds_complement() {
        let regions = GeneRegions {
            utr5: true,
            utr3: true,
            ..GeneRegions::default()
        };
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", true, &EXONS, 105, 120, &regions).unwrap();
        });
        assert_eq!(got, "5\tchr1\t100\tg\t0\n10\tchr1\t120\tg\t15\n");
    }

    #[test]
    fn test_utr5_forward_is_left_of_cds() {
        let regions = GeneRegions {
            utr5: true,
            ..GeneRegions::default()
        };
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", true, &EXONS, 105, 120, &regions).unwrap();
        });
        assert_eq!(got, "5\tchr1\t100\tg\t0\n");
    }

    #[test]
    fn test_utr5_reverse_is_right_of_cds() {
        let regions = GeneRegions {
            utr5: true,
            ..GeneRegions::default()
        };
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", false, &EXONS, 105, 120, &regions).unwrap();
        });
        assert_eq!(got, "10\tchr1\t120\tg\t-10\n");
    }

    #[test]
    fn test_cds_plus_utr_extends_window() {
        let regions = GeneRegions {
            cds: true,
            utr5: true,
            ..GeneRegions::default()
        };
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", true, &EXONS, 105, 120, &regions).unwrap();
        });
        assert_eq!(got, "10\tchr1\t100\tg\t0\n5\tchr1\t115\tg\t10\n");
    }

    #[test]
    fn test_missing_cds_with_utr_emits_nothing() {
        let regions = GeneRegions {
            utr3: true,
            ..GeneRegions::default()
        };
        let got = collect(|w| {
            write_gene(w, b"chr1", b"g", true, &EXONS, 100, 100, &regions).unwrap();
        });
        assert_eq!(got, "");
    }
}
