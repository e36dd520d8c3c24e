//! Format decoders that turn external genomics formats into SEG records.
//!
//! Every decoder streams its input line by line (GTF buffers, because its
//! records need sorting) and emits zero or more SEG lines per record. All
//! of them share the same failure policy: a malformed line is fatal and
//! echoes the original text, so a corrupt input can never silently drop
//! records.

use crate::coords;
use crate::error::Result;
use crate::writer::SegWriter;
use std::io::{BufRead, Write};

mod bed;
mod chain;
mod gene;
mod genepred;
mod gff;
mod gtf;
mod lasttab;
mod maf;
mod psl;
mod rmsk;
mod sam;

/// The closed set of input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bed,
    Chain,
    GenePred,
    Gff,
    Gtf,
    LastTab,
    Maf,
    Psl,
    Rmsk,
    Sam,
}

impl Format {
    /// Look up a format by its case-insensitive name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bed" => Some(Format::Bed),
            "chain" => Some(Format::Chain),
            "genepred" => Some(Format::GenePred),
            "gff" => Some(Format::Gff),
            "gtf" => Some(Format::Gtf),
            "lasttab" => Some(Format::LastTab),
            "maf" => Some(Format::Maf),
            "psl" => Some(Format::Psl),
            "rmsk" => Some(Format::Rmsk),
            "sam" => Some(Format::Sam),
            _ => None,
        }
    }

    /// Display name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Format::Bed => "BED",
            Format::Chain => "CHAIN",
            Format::GenePred => "genePred",
            Format::Gff => "GFF",
            Format::Gtf => "GTF",
            Format::LastTab => "lastTab",
            Format::Maf => "MAF",
            Format::Psl => "PSL",
            Format::Rmsk => "rmsk",
            Format::Sam => "SAM",
        }
    }
}

/// Which gene regions the gene-shaped formats extract.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneRegions {
    pub cds: bool,
    pub utr5: bool,
    pub utr3: bool,
    pub introns: bool,
    pub primary_transcripts: bool,
}

/// Import configuration, mirroring the seg-import command line.
#[derive(Debug, Clone, Copy)]
pub struct ImportCommand {
    pub format: Format,
    pub regions: GeneRegions,
    /// `-f N`: pivot records whose part N is reverse-stranded.
    pub forward_segment: Option<usize>,
    /// `-a`: append alignment number/position columns (lastTab, maf, psl).
    pub alignment_columns: bool,
}

impl ImportCommand {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            regions: GeneRegions::default(),
            forward_segment: None,
            alignment_columns: false,
        }
    }

    /// Decode one input stream, writing SEG records.
    ///
    /// `aln_num` is the running alignment counter; it is shared across
    /// input files so numbering continues from one file to the next.
    pub fn run<R: BufRead, W: Write>(
        &self,
        input: R,
        out: &mut SegWriter<W>,
        aln_num: &mut u64,
    ) -> Result<()> {
        match self.format {
            Format::Bed => bed::import(input, out, self),
            Format::Chain => chain::import(input, out, self),
            Format::GenePred => genepred::import(input, out, self),
            Format::Gff => gff::import(input, out),
            Format::Gtf => gtf::import(input, out, self),
            Format::LastTab => lasttab::import(input, out, self, aln_num),
            Format::Maf => maf::import(input, out, self, aln_num),
            Format::Psl => psl::import(input, out, self, aln_num),
            Format::Rmsk => rmsk::import(input, out),
            Format::Sam => sam::import(input, out, self),
        }
    }
}

/// One part of an alignment record about to be emitted.
pub(crate) struct OutPart<'a> {
    pub name: &'a [u8],
    pub start: i64,
    pub letter_length: i64,
}

/// Emit one alignment SEG record, applying the forward-segment pivot
/// first: if the chosen part's start is negative, every part flips.
pub(crate) fn write_alignment_seg<W: Write>(
    out: &mut SegWriter<W>,
    length: i64,
    parts: &mut [OutPart<'_>],
    forward_segment: Option<usize>,
    aln: Option<(u64, i64)>,
) -> Result<()> {
    if let Some(n) = forward_segment {
        if (1..=parts.len()).contains(&n) && parts[n - 1].start < 0 {
            for p in parts.iter_mut() {
                p.start = coords::maybe_flip(p.start, length, p.letter_length, true);
            }
        }
    }
    out.write_record(length, parts.iter().map(|p| (p.name, p.start)), aln)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_is_case_insensitive() {
        assert_eq!(Format::parse("BED"), Some(Format::Bed));
        assert_eq!(Format::parse("genePred"), Some(Format::GenePred));
        assert_eq!(Format::parse("LASTTAB"), Some(Format::LastTab));
        assert_eq!(Format::parse("sam"), Some(Format::Sam));
        assert_eq!(Format::parse("fastq"), None);
    }

    #[test]
    fn test_forward_flip_pivots_whole_record() {
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            let mut parts = [
                OutPart {
                    name: b"t",
                    start: 10,
                    letter_length: 1,
                },
                OutPart {
                    name: b"q",
                    start: -20,
                    letter_length: 1,
                },
            ];
            write_alignment_seg(&mut w, 5, &mut parts, Some(2), None).unwrap();
            w.flush().unwrap();
        }
        assert_eq!(out, b"5\tt\t-15\tq\t15\n");
    }

    #[test]
    fn test_forward_flip_noop_when_already_forward() {
        let mut out = Vec::new();
        {
            let mut w = SegWriter::new(&mut out);
            let mut parts = [OutPart {
                name: b"t",
                start: 10,
                letter_length: 1,
            }];
            write_alignment_seg(&mut w, 5, &mut parts, Some(1), None).unwrap();
            w.flush().unwrap();
        }
        assert_eq!(out, b"5\tt\t10\n");
    }
}
