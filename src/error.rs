//! Error types shared by both tools.

use std::io;
use thiserror::Error;

/// Errors that can occur while importing or joining SEG data.
#[derive(Error, Debug)]
pub enum SegError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("can't open file: {0}")]
    Open(String),

    #[error("bad {format} line: {line}")]
    Syntax { format: &'static str, line: String },

    #[error("{0}")]
    InvalidFormat(String),

    #[error("input not sorted properly")]
    NotSorted,

    #[error("write error")]
    Write,
}

impl SegError {
    /// Fatal per-record error that echoes the offending input line.
    pub fn bad_line(format: &'static str, line: &[u8]) -> Self {
        SegError::Syntax {
            format,
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SegError>;
