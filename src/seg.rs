//! The SEG record: a length plus one or more (sequence name, start) parts.
//!
//! A record owns the text line it was parsed from; part names are stored
//! as (offset, length) into that line, so moving a `Seg` around (into the
//! join engine's kept window, for example) never copies or re-allocates
//! the names.

use crate::error::{Result, SegError};
use crate::scan::Scanner;
use std::cmp::Ordering;

/// One (sequence name, start) pair of a SEG record.
#[derive(Debug, Clone, Copy)]
pub struct SegPart {
    name_beg: usize,
    name_len: usize,
    pub start: i64,
}

/// A parsed SEG record.
///
/// The first part is the anchor: it drives file ordering and the join
/// sweep. `end0` caches the anchor end (`parts[0].start + length`).
#[derive(Debug)]
pub struct Seg {
    line: Vec<u8>,
    parts: Vec<SegPart>,
    end0: i64,
}

impl Seg {
    /// Parse one SEG line, taking ownership of its buffer.
    ///
    /// The grammar is a length followed by one or more (name, start)
    /// pairs; anything else is a fatal syntax error.
    pub fn parse(line: Vec<u8>) -> Result<Self> {
        let mut parts = Vec::new();
        let mut length = 0;
        {
            let mut sc = Scanner::new(&line);
            if let Some(x) = sc.long() {
                length = x;
            }
            while let Some((beg, end)) = sc.word_span() {
                match sc.long() {
                    Some(start) => parts.push(SegPart {
                        name_beg: beg,
                        name_len: end - beg,
                        start,
                    }),
                    None => return Err(SegError::bad_line("SEG", &line)),
                }
            }
        }
        if parts.is_empty() {
            return Err(SegError::bad_line("SEG", &line));
        }
        let end0 = parts[0].start + length;
        Ok(Self { line, parts, end0 })
    }

    #[inline]
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// Anchor start.
    #[inline]
    pub fn beg0(&self) -> i64 {
        self.parts[0].start
    }

    /// Anchor end.
    #[inline]
    pub fn end0(&self) -> i64 {
        self.end0
    }

    #[inline]
    pub fn start(&self, part: usize) -> i64 {
        self.parts[part].start
    }

    #[inline]
    pub fn name(&self, part: usize) -> &[u8] {
        let p = &self.parts[part];
        &self.line[p.name_beg..p.name_beg + p.name_len]
    }

    #[inline]
    pub fn line_len(&self) -> usize {
        self.line.len()
    }

    /// Compare one part's sequence name against another record's.
    #[inline]
    pub fn name_cmp(&self, other: &Seg, part: usize) -> Ordering {
        self.name(part).cmp(other.name(part))
    }

    /// Two records can join as whole tuples: same arity, same follower
    /// names, and the same start offset between the records in every
    /// follower as in the anchor.
    pub fn is_overlappable(&self, t: &Seg) -> bool {
        if self.num_parts() != t.num_parts() {
            return false;
        }
        let d = self.beg0() - t.beg0();
        for i in 1..self.num_parts() {
            if self.name_cmp(t, i) != Ordering::Equal {
                return false;
            }
            if self.start(i) - t.start(i) != d {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Seg {
        Seg::parse(text.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_parse_single_part() {
        let s = seg("10\tchr1\t20");
        assert_eq!(s.num_parts(), 1);
        assert_eq!(s.name(0), b"chr1");
        assert_eq!(s.beg0(), 20);
        assert_eq!(s.end0(), 30);
    }

    #[test]
    fn test_parse_multi_part_negative() {
        let s = seg("5\tchr1\t100\tread7\t-12");
        assert_eq!(s.num_parts(), 2);
        assert_eq!(s.name(1), b"read7");
        assert_eq!(s.start(1), -12);
        assert_eq!(s.end0(), 105);
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(Seg::parse(b"nonsense".to_vec()).is_err());
        assert!(Seg::parse(b"10".to_vec()).is_err());
        assert!(Seg::parse(b"10\tchr1".to_vec()).is_err());
        assert!(Seg::parse(b"".to_vec()).is_err());
    }

    #[test]
    fn test_name_cmp() {
        let a = seg("1\tchr1\t0");
        let b = seg("1\tchr10\t0");
        assert_eq!(a.name_cmp(&b, 0), Ordering::Less);
        assert_eq!(b.name_cmp(&a, 0), Ordering::Greater);
        assert_eq!(a.name_cmp(&a, 0), Ordering::Equal);
    }

    #[test]
    fn test_is_overlappable() {
        let s = seg("10\tchrA\t5\tq\t105");
        let same_offset = seg("4\tchrA\t8\tq\t108");
        let wrong_offset = seg("4\tchrA\t8\tq\t109");
        let wrong_name = seg("4\tchrA\t8\tr\t108");
        let wrong_arity = seg("4\tchrA\t8");
        assert!(s.is_overlappable(&same_offset));
        assert!(!s.is_overlappable(&wrong_offset));
        assert!(!s.is_overlappable(&wrong_name));
        assert!(!s.is_overlappable(&wrong_arity));
    }
}
