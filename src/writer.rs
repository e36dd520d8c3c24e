//! SEG output.
//!
//! Two emit paths share one writer. The importer builds records field by
//! field, formatted forward with itoa. The join engine re-slices existing
//! records, where most of the output bytes already sit in the record's
//! line buffer; that path fills a reusable scratch line backwards from
//! the end, which lets names be block-copied and numbers written without
//! knowing their width up front.

use crate::error::{Result, SegError};
use crate::seg::Seg;
use std::io::{BufWriter, Write};

/// Output buffer size (1 MB).
const DEFAULT_OUTPUT_BUFFER: usize = 1024 * 1024;

/// Per-part slack in the scratch line: a 64-bit integer, its sign, and
/// two tabs fit comfortably.
const INT_SPACE: usize = 32;

/// Buffered SEG writer.
pub struct SegWriter<W: Write> {
    out: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    scratch: Vec<u8>,
}

impl<W: Write> SegWriter<W> {
    /// Create a writer with the default buffer size.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a writer with the given buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            out: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            scratch: Vec::new(),
        }
    }

    #[inline]
    fn write_int(&mut self, x: i64) -> Result<()> {
        let s = self.itoa_buf.format(x);
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Write one SEG record: length, (name, start) parts, and optionally
    /// the trailing alignment number/position columns.
    pub fn write_record<'a, I>(&mut self, length: i64, parts: I, aln: Option<(u64, i64)>) -> Result<()>
    where
        I: IntoIterator<Item = (&'a [u8], i64)>,
    {
        self.write_int(length)?;
        for (name, start) in parts {
            self.out.write_all(b"\t")?;
            self.out.write_all(name)?;
            self.out.write_all(b"\t")?;
            self.write_int(start)?;
        }
        if let Some((num, pos)) = aln {
            self.out.write_all(b"\t")?;
            let s = self.itoa_buf.format(num);
            self.out.write_all(s.as_bytes())?;
            self.out.write_all(b"\t")?;
            self.write_int(pos)?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Write the `[beg, end)` slice of a record: the anchor is narrowed
    /// and every follower start shifts by the same offset.
    pub fn write_slice(&mut self, s: &Seg, beg: i64, end: i64) -> Result<()> {
        let space = s.line_len() + INT_SPACE * (s.num_parts() + 2);
        if self.scratch.len() < space {
            self.scratch.resize(space, 0);
        }
        let mut e = self.scratch.len();
        e -= 1;
        self.scratch[e] = b'\n';
        e = slice_tail(&mut self.scratch, e, s, beg);
        e = slice_head(&mut self.scratch, e, s, beg, end);
        self.out.write_all(&self.scratch[e..])?;
        Ok(())
    }

    /// Write the join of two records over `[beg, end)`: s's head and
    /// followers, then t's followers. t's anchor is omitted; after
    /// alignment it is identical to s's.
    pub fn write_join(&mut self, s: &Seg, t: &Seg, beg: i64, end: i64) -> Result<()> {
        let parts = s.num_parts() + t.num_parts();
        let space = s.line_len() + t.line_len() + INT_SPACE * (parts + 2);
        if self.scratch.len() < space {
            self.scratch.resize(space, 0);
        }
        let mut e = self.scratch.len();
        e -= 1;
        self.scratch[e] = b'\n';
        e = slice_tail(&mut self.scratch, e, t, beg);
        e = slice_tail(&mut self.scratch, e, s, beg);
        e = slice_head(&mut self.scratch, e, s, beg, end);
        self.out.write_all(&self.scratch[e..])?;
        Ok(())
    }

    /// Flush buffered output. A failure here is the user-visible
    /// `write error`.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(|_| SegError::Write)
    }
}

/// Write a signed integer backwards, ending at `e`. Returns the new end.
#[inline]
fn put_long(buf: &mut [u8], mut e: usize, x: i64) -> usize {
    let mut y = x.unsigned_abs();
    loop {
        e -= 1;
        buf[e] = b'0' + (y % 10) as u8;
        y /= 10;
        if y == 0 {
            break;
        }
    }
    if x < 0 {
        e -= 1;
        buf[e] = b'-';
    }
    e
}

/// Copy a name backwards, ending at `e`. Returns the new end.
#[inline]
fn put_name(buf: &mut [u8], mut e: usize, name: &[u8]) -> usize {
    e -= name.len();
    buf[e..e + name.len()].copy_from_slice(name);
    e
}

/// Follower parts of `s`, shifted so they line up with an anchor that now
/// begins at `beg`. Written backwards, so the parts come out in order.
fn slice_tail(buf: &mut [u8], mut e: usize, s: &Seg, beg: i64) -> usize {
    let offset = beg - s.beg0();
    for i in (1..s.num_parts()).rev() {
        e = put_long(buf, e, s.start(i) + offset);
        e -= 1;
        buf[e] = b'\t';
        e = put_name(buf, e, s.name(i));
        e -= 1;
        buf[e] = b'\t';
    }
    e
}

/// Length, anchor name, and anchor start for the `[beg, end)` slice.
fn slice_head(buf: &mut [u8], mut e: usize, s: &Seg, beg: i64, end: i64) -> usize {
    e = put_long(buf, e, beg);
    e -= 1;
    buf[e] = b'\t';
    e = put_name(buf, e, s.name(0));
    e -= 1;
    buf[e] = b'\t';
    e = put_long(buf, e, end - beg);
    e
}
