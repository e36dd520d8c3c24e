//! seg-import: read segments or alignments in various formats, and write
//! them in SEG format.

use clap::Parser;
use segkit::import::{Format, GeneRegions, ImportCommand};
use segkit::{open_input, Result, SegError, SegWriter};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "seg-import")]
#[command(version)]
#[command(about = "Read segments or alignments in various formats, and write them in SEG format")]
struct Cli {
    /// Flip records so that segment number N is on the forward strand
    #[arg(short = 'f', value_name = "N")]
    forward_segment: Option<usize>,

    /// Append alignment number and position columns (lastTab, maf, psl)
    #[arg(short = 'a')]
    alignment_columns: bool,

    /// Get CDS (coding regions)
    #[arg(short = 'c', conflicts_with_all = ["introns", "primary_transcripts"])]
    cds: bool,

    /// Get 5' untranslated regions (UTRs)
    #[arg(short = '5', conflicts_with_all = ["introns", "primary_transcripts"])]
    utr5: bool,

    /// Get 3' untranslated regions (UTRs)
    #[arg(short = '3', conflicts_with_all = ["introns", "primary_transcripts"])]
    utr3: bool,

    /// Get introns
    #[arg(short = 'i', conflicts_with = "primary_transcripts")]
    introns: bool,

    /// Get primary transcripts (exons plus introns)
    #[arg(short = 'p')]
    primary_transcripts: bool,

    /// Input format: bed, chain, genePred, gff, gtf, lastTab, maf, psl,
    /// rmsk, or sam (case-insensitive)
    format: String,

    /// Input files (use - for standard input)
    files: Vec<PathBuf>,
}

fn run(cli: &Cli) -> Result<()> {
    let format = Format::parse(&cli.format)
        .ok_or_else(|| SegError::InvalidFormat(format!("unknown format: {}", cli.format)))?;
    let cmd = ImportCommand {
        format,
        regions: GeneRegions {
            cds: cli.cds,
            utr5: cli.utr5,
            utr3: cli.utr3,
            introns: cli.introns,
            primary_transcripts: cli.primary_transcripts,
        },
        forward_segment: cli.forward_segment,
        alignment_columns: cli.alignment_columns,
    };

    let stdout = io::stdout();
    let mut out = SegWriter::new(stdout.lock());
    let mut aln_num = 0;
    if cli.files.is_empty() {
        cmd.run(io::stdin().lock(), &mut out, &mut aln_num)?;
    } else {
        for file in &cli.files {
            let input = open_input(file)?;
            cmd.run(input, &mut out, &mut aln_num)?;
        }
    }
    out.flush()
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("seg-import: {e}");
        process::exit(1);
    }
}
