//! GFF decoder.
//!
//! GFF is 1-based and closed on both ends, so begin drops by one. The
//! source and feature columns are scanned tab-delimited because some
//! dialects put spaces inside them.

use crate::error::{Result, SegError};
use crate::scan::{read_line, Scanner};
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

pub(crate) fn import<R: BufRead, W: Write>(mut input: R, out: &mut SegWriter<W>) -> Result<()> {
    let mut line = Vec::new();
    while read_line(&mut input, &mut line)? {
        let mut sc = Scanner::new(&line);
        let Some(seqname) = sc.word() else { continue };
        if seqname[0] == b'#' {
            continue;
        }
        let parsed = (|| {
            sc.field()?; // source
            sc.field()?; // feature
            let beg = sc.long()?;
            let end = sc.long()?;
            sc.word()?; // score
            let strand = sc.word()?;
            Some((beg, end, strand))
        })();
        let Some((beg, end, strand)) = parsed else {
            return Err(SegError::bad_line("GFF", &line));
        };
        let beg = beg - 1;
        let size = end - beg;
        let start = if strand == b"-" { -end } else { beg };
        out.write_record(size, [(seqname, start)], None)?;
    }
    Ok(())
}
