//! Self-terminating codewords.
//!
//! A codeword is a positive integer written MSB first with no leading zero padding. Valid
//! codewords never contain two adjacent zero bits and never start or end with a zero bit.
//! That leaves "00" free to act as the terminator after every codeword: two consecutive
//! zero bits in a stream can only ever be a terminator, so no length prefix is needed.
//!
//! Valid values in order: 1, 11, 101, 111, 1011, 1101, 1111, 10101, ...

use std::fmt::{self, Display, Formatter};
use std::io;

/// Number of zero bits written after every codeword.
pub const TERMINATOR_BITS: u8 = 2;
/// Longest codeword the decoder will accumulate.
pub const MAX_CODEWORD_BITS: u8 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codeword(u64);

impl Codeword {
    /// Wrap a value, rejecting anything that is not self-terminating.
    pub fn new(value: u64) -> Option<Self> {
        if is_self_terminating(value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Number of significant bits.
    pub fn bit_len(&self) -> u8 {
        bit_len(self.0)
    }
}

impl Display for Codeword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:b}", self.0)
    }
}

#[inline(always)]
fn bit_len(value: u64) -> u8 {
    (64 - value.leading_zeros()) as u8
}

/// Returns a mask with bit j set wherever bits j and j+1 of `value` are both zero,
/// looking only inside the significant bits.
#[inline(always)]
fn double_zeros(value: u64) -> u64 {
    let len = bit_len(value);
    if len < 2 {
        return 0;
    }
    let inside = u64::MAX >> (64 - (len - 1));
    !(value | (value >> 1)) & inside
}

/// True if `value` can be used as a codeword: non-zero, odd, no "00" anywhere, and short
/// enough for the decoder.
pub fn is_self_terminating(value: u64) -> bool {
    value != 0
        && value & 1 == 1
        && double_zeros(value) == 0
        && bit_len(value) <= MAX_CODEWORD_BITS
}

/// Find the smallest valid codeword that is >= `from`.
///
/// Rather than testing every integer, each rejected candidate is advanced to the first
/// value that clears its highest violation: the highest "00" pair gets its low bit set
/// (and everything below cleared), and an even value becomes odd.
pub fn next_codeword(from: u64) -> io::Result<Codeword> {
    let mut candidate = from.max(1);
    loop {
        let zeros = double_zeros(candidate);
        if zeros != 0 {
            let low = 63 - zeros.leading_zeros();
            candidate = ((candidate >> low) | 1) << low;
        } else if candidate & 1 == 0 {
            candidate += 1;
        } else if bit_len(candidate) > MAX_CODEWORD_BITS {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Ran out of codewords. Too many distinct patterns.",
            ));
        } else {
            return Ok(Codeword(candidate));
        }
    }
}

/// Hands out valid codewords in increasing order.
#[derive(Debug)]
pub struct CodewordGenerator {
    counter: u64,
}

impl CodewordGenerator {
    pub fn new() -> Self {
        Self { counter: 1 }
    }

    /// The next unused codeword.
    pub fn next_codeword(&mut self) -> io::Result<Codeword> {
        let codeword = next_codeword(self.counter)?;
        self.counter = codeword.value() + 1;
        Ok(codeword)
    }
}

impl Default for CodewordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the bits of one codeword until its terminator shows up.
///
/// Every bit is shifted in as it arrives. When a zero follows a zero, the pair is the
/// terminator: the earlier zero is dropped again and the codeword is complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodewordScanner {
    value: u64,
    bits: u8,
    last_zero: bool,
}

impl CodewordScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no bit has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Feed one bit. Returns the finished codeword value when this bit completes a
    /// terminator, after which the scanner is empty again.
    pub fn push(&mut self, bit: bool) -> io::Result<Option<u64>> {
        if !bit && self.last_zero {
            let value = self.value >> 1;
            *self = Self::new();
            return Ok(Some(value));
        }
        if self.bits > MAX_CODEWORD_BITS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Corrupt compressed data: codeword longer than 63 bits.",
            ));
        }
        self.value = (self.value << 1) | bit as u64;
        self.bits += 1;
        self.last_zero = !bit;
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::{is_self_terminating, next_codeword, Codeword, CodewordGenerator, CodewordScanner};

    /// Straightforward version of the constraint on the binary text.
    fn text_rule(value: u64) -> bool {
        let bits = format!("{:b}", value);
        !bits.contains("00") && !bits.starts_with('0') && !bits.ends_with('0')
    }

    #[test]
    fn first_codewords_test() {
        let mut generator = CodewordGenerator::new();
        let first: Vec<u64> = (0..12)
            .map(|_| generator.next_codeword().unwrap().value())
            .collect();
        assert_eq!(first, vec![1, 3, 5, 7, 11, 13, 15, 21, 23, 27, 29, 31]);
    }

    #[test]
    fn matches_text_rule_test() {
        for value in 1..20_000_u64 {
            assert_eq!(is_self_terminating(value), text_rule(value), "value {}", value);
        }
        assert!(!is_self_terminating(0));
    }

    #[test]
    fn next_codeword_is_smallest_test() {
        for from in 1..5_000_u64 {
            let expected = (from..).find(|&v| text_rule(v)).unwrap();
            assert_eq!(next_codeword(from).unwrap().value(), expected, "from {}", from);
        }
    }

    #[test]
    fn generator_matches_scan_test() {
        let mut generator = CodewordGenerator::new();
        let mut expected = (1_u64..).filter(|&v| text_rule(v));
        for _ in 0..2_000 {
            assert_eq!(
                generator.next_codeword().unwrap().value(),
                expected.next().unwrap()
            );
        }
    }

    #[test]
    fn new_and_display_test() {
        assert_eq!(Codeword::new(22), None);
        assert_eq!(Codeword::new(9), None);
        let cw = Codeword::new(27).unwrap();
        assert_eq!(cw.to_string(), "11011");
        assert_eq!(cw.bit_len(), 5);
    }

    #[test]
    fn scanner_test() {
        let mut scanner = CodewordScanner::new();
        // 1011 followed by the terminator
        let bits = [true, false, true, true, false, false];
        let mut found = vec![];
        for bit in bits {
            if let Some(value) = scanner.push(bit).unwrap() {
                found.push(value);
            }
        }
        assert_eq!(found, vec![0b1011]);
        assert!(scanner.is_empty());
    }

    #[test]
    fn scanner_rejects_runaway_codeword_test() {
        let mut scanner = CodewordScanner::new();
        let mut result = Ok(None);
        for _ in 0..70 {
            result = scanner.push(true);
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
    }
}
