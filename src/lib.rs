#![allow(clippy::too_many_arguments)]

//! segkit: tools for the SEG segment/alignment format.
//!
//! SEG is a minimal tuple format for genomic segments and alignments: a
//! length plus one or more (sequence name, start) pairs per line, where a
//! negative start means the reverse strand, right-anchored. This library
//! backs two command-line tools:
//!
//! - **seg-import** decodes ten common genomics formats (BED, chain,
//!   genePred, GFF, GTF, lastTab, MAF, PSL, rmsk, SAM) into SEG.
//! - **seg-join** streams two sorted SEG files through a sweep-line
//!   engine, producing their join, set difference, or coverage-filtered
//!   selection.
//!
//! # Example
//!
//! ```rust
//! use segkit::join::JoinCommand;
//!
//! let cmd = JoinCommand::new();
//! let mut out = Vec::new();
//! cmd.run(
//!     &b"10\tchrA\t0\n"[..],
//!     &b"4\tchrA\t5\n"[..],
//!     &mut out,
//! )
//! .unwrap();
//! assert_eq!(out, b"4\tchrA\t5\n");
//! ```

pub mod coords;
pub mod error;
pub mod import;
pub mod join;
pub mod reader;
pub mod scan;
pub mod seg;
pub mod writer;

pub use error::{Result, SegError};
pub use reader::SortedSegReader;
pub use seg::{Seg, SegPart};
pub use writer::SegWriter;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input buffer size (256 KB).
const INPUT_BUFFER: usize = 256 * 1024;

/// Open a named input, with `-` meaning standard input.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|_| SegError::Open(path.display().to_string()))?;
    Ok(Box::new(BufReader::with_capacity(INPUT_BUFFER, file)))
}
