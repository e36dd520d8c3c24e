//! genePred decoder.
//!
//! UCSC tables sometimes carry a leading bin column; it is detected by
//! checking whether the third field looks like a strand, and the fields
//! shift left by one when it does not.

use crate::error::{Result, SegError};
use crate::import::gene::{self, ExonRange};
use crate::import::ImportCommand;
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

pub(crate) fn import<R: BufRead, W: Write>(
    mut input: R,
    out: &mut SegWriter<W>,
    cmd: &ImportCommand,
) -> Result<()> {
    let mut line = Vec::new();
    let mut exons: Vec<ExonRange> = Vec::new();
    while read_line(&mut input, &mut line)? {
        let mut sc = Scanner::new(&line);
        let Some(first) = sc.word() else { continue };
        let parsed = (|| {
            let mut name = first;
            let mut chrom = sc.word()?;
            let mut strand = sc.word()?;
            if strand != b"+" && strand != b"-" {
                name = chrom;
                chrom = strand;
                strand = sc.word()?;
            }
            sc.word()?; // txStart
            sc.word()?; // txEnd
            let cds_beg = sc.long()?;
            let cds_end = sc.long()?;
            sc.word()?; // exon count
            let exon_begs = sc.word()?;
            let exon_ends = sc.word()?;
            Some((name, chrom, strand, cds_beg, cds_end, exon_begs, exon_ends))
        })();
        let Some((name, chrom, strand, cds_beg, cds_end, exon_begs, exon_ends)) = parsed else {
            return Err(SegError::bad_line("genePred", &line));
        };
        let mut begs = Scanner::new(exon_begs);
        let mut ends = Scanner::new(exon_ends);
        while let (Some(beg), Some(end)) = (begs.long(), ends.long()) {
            exons.push(ExonRange { beg, end });
            begs.skip_byte();
            ends.skip_byte();
        }
        gene::write_gene(
            out,
            chrom,
            name,
            strand == b"+",
            &exons,
            cds_beg,
            cds_end,
            &cmd.regions,
        )?;
        exons.clear();
    }
    Ok(())
}
