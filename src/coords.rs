//! Coordinate policy.
//!
//! SEG keeps strand as the sign of a start: a negative start means the
//! segment lies on the reverse strand, and its magnitude is measured from
//! the sequence's right end. None of these helpers need the sequence
//! length; it cancels out of every operation downstream.

/// Pivot a start so the segment reads forward, when `do_flip` is set.
///
/// `letter_length` is the genomic span of one aligned letter (3 for the
/// protein rows of translated alignments, otherwise 1).
#[inline]
pub fn maybe_flip(start: i64, length: i64, letter_length: i64, do_flip: bool) -> i64 {
    if do_flip {
        -(start + length * letter_length)
    } else {
        start
    }
}

/// Convert a reverse-strand position to SEG's right-anchored signed form.
///
/// Formats that report reverse-strand coordinates from the sequence start
/// (chain, lastTab, MAF, PSL) subtract the sequence length once; after
/// that the sign carries the strand everywhere.
#[inline]
pub fn apply_reverse(start: i64, seq_length: i64) -> i64 {
    start - seq_length
}

/// Scale an aligned-letter count or a letter-scaled start back to the
/// row's native coordinate units.
#[inline]
pub fn scale_translated(value: i64, length_per_letter: i64) -> i64 {
    value / length_per_letter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_flip() {
        assert_eq!(maybe_flip(10, 5, 1, false), 10);
        assert_eq!(maybe_flip(10, 5, 1, true), -15);
        assert_eq!(maybe_flip(-15, 5, 1, true), 10);
        assert_eq!(maybe_flip(-30, 5, 3, true), 15);
    }

    #[test]
    fn test_flip_is_an_involution() {
        for (start, length, letter) in [(0, 7, 1), (-42, 9, 1), (100, 4, 3)] {
            let once = maybe_flip(start, length, letter, true);
            assert_eq!(maybe_flip(once, length, letter, true), start);
        }
    }

    #[test]
    fn test_apply_reverse() {
        // a segment at forward position 30 of a 100-long sequence, reported
        // in reverse-strand coordinates (60..), becomes right-anchored
        assert_eq!(apply_reverse(60, 100), -40);
    }

    #[test]
    fn test_scale_translated() {
        assert_eq!(scale_translated(9, 3), 3);
        assert_eq!(scale_translated(9, 1), 9);
        assert_eq!(scale_translated(-27, 3), -9);
    }
}
