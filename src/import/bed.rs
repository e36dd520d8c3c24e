//! BED decoder (12-column superset).
//!
//! Three columns make a bare anchored segment. With a name the record
//! goes through the gene-region filter, using the block arrays as exons
//! when they parse and the whole span otherwise.

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
        let Some(chrom) = sc.word() else { continue };
        let (Some(beg), Some(end)) = (sc.long(), sc.long()) else {
            return Err(SegError::bad_line("BED", &line));
        };
        let Some(name) = sc.word() else {
            out.write_record(end - beg, [(chrom, beg)], None)?;
            continue;
        };
        sc.word(); // score
        let is_reverse = matches!(sc.word(), Some(s) if s == b"-");
        let mut cds_beg = beg;
        let mut cds_end = beg;
        let block_lists = (|| {
            cds_beg = sc.long()?;
            cds_end = sc.long()?;
            sc.word()?; // item color
            sc.word()?; // block count
            let sizes = sc.word()?;
            let starts = sc.word()?;
            Some((sizes, starts))
        })();
        if let Some((sizes, starts)) = block_lists {
            let mut lens = Scanner::new(sizes);
            let mut begs = Scanner::new(starts);
            while let (Some(elen), Some(ebeg)) = (lens.long(), begs.long()) {
                exons.push(ExonRange {
                    beg: beg + ebeg,
                    end: beg + ebeg + elen,
                });
                lens.skip_byte();
                begs.skip_byte();
            }
        } else {
            exons.push(ExonRange { beg, end });
        }
        gene::write_gene(out, chrom, name, !is_reverse, &exons, cds_beg, cds_end, &cmd.regions)?;
        exons.clear();
    }
    Ok(())
}
