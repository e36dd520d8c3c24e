//! seg-join: read two sorted SEG files, and write their join.

use clap::{ArgAction, Parser};
use segkit::join::{Fraction, JoinCommand, FILE2};
use segkit::{open_input, Result, SegError};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "seg-join")]
#[command(version)]
#[command(about = "Read two SEG files, and write their JOIN")]
struct Cli {
    /// Only use complete/contained records of file FILENUM
    #[arg(short = 'c', value_name = "FILENUM", action = ArgAction::Append,
          value_parser = clap::value_parser!(u8).range(1..=2))]
    complete: Vec<u8>,

    /// Write records of file FILENUM that overlap anything in the other file
    #[arg(short = 'f', value_name = "FILENUM", action = ArgAction::Append,
          value_parser = clap::value_parser!(u8).range(1..=2))]
    overlapping: Vec<u8>,

    /// Write each record of file 2, if at least PERCENT of it is covered
    /// by file 1 (or N/D as a fraction)
    #[arg(short = 'n', value_name = "PERCENT", action = ArgAction::Append,
          conflicts_with = "max_covered")]
    min_covered: Vec<String>,

    /// Write each record of file 2, if at most PERCENT of it is covered
    /// by file 1
    #[arg(short = 'x', value_name = "PERCENT", action = ArgAction::Append)]
    max_covered: Vec<String>,

    /// Only write unjoinable parts of file FILENUM
    #[arg(short = 'v', value_name = "FILENUM", action = ArgAction::Append,
          value_parser = clap::value_parser!(u8).range(1..=2))]
    unjoinable: Vec<u8>,

    /// Join on whole segment-tuples, not just first segments
    #[arg(short = 'w')]
    whole_tuples: bool,

    file1: PathBuf,
    file2: PathBuf,
}

fn build_command(cli: &Cli) -> Result<JoinCommand> {
    if cli.overlapping.len() > 1 {
        return Err(SegError::InvalidFormat(
            "option -f: cannot use twice".to_string(),
        ));
    }
    if cli.unjoinable.len() > 1 {
        return Err(SegError::InvalidFormat(
            "option -v: cannot use twice".to_string(),
        ));
    }
    if cli.min_covered.len() + cli.max_covered.len() > 1 {
        return Err(SegError::InvalidFormat(
            "option -n/-x: cannot use twice".to_string(),
        ));
    }
    let mut cmd = JoinCommand {
        complete1: cli.complete.contains(&1),
        complete2: cli.complete.contains(&2),
        overlapping_file: cli.overlapping.first().copied(),
        unjoinable_file: cli.unjoinable.first().copied(),
        join_all_segments: cli.whole_tuples,
        min_overlap: None,
    };
    if let Some(text) = cli.min_covered.first() {
        cmd.min_overlap = Some(
            Fraction::parse(text)
                .ok_or_else(|| SegError::InvalidFormat("option -n: bad value".to_string()))?,
        );
    }
    if let Some(text) = cli.max_covered.first() {
        cmd.min_overlap = Some(
            Fraction::parse(text)
                .ok_or_else(|| SegError::InvalidFormat("option -x: bad value".to_string()))?
                .negated(),
        );
    }
    if cmd.min_overlap.is_some() && cmd.overlapping_file.is_none() {
        cmd.overlapping_file = Some(FILE2);
    }
    Ok(cmd)
}

fn run(cli: &Cli) -> Result<()> {
    let cmd = build_command(cli)?;
    let input1 = open_input(&cli.file1)?;
    let input2 = open_input(&cli.file2)?;
    let stdout = io::stdout();
    cmd.run(input1, input2, stdout.lock())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("seg-join: {e}");
        process::exit(1);
    }
}
