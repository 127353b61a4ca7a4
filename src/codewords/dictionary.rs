//! The compression dictionary: a bijection between patterns and codewords.
//!
//! Patterns are ranked by how many input bytes they account for (text length times
//! frequency). The highest ranked pattern gets the smallest, and therefore shortest,
//! codeword. The dictionary is fixed once built.

use std::io;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use super::codeword::{Codeword, CodewordGenerator};
use crate::tools::pattern_stats::PatternStats;

/// How many of the top ranked patterns to report at debug level.
const REPORTED_PATTERNS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// (pattern, codeword) in priority order, which is also increasing codeword order.
    entries: Vec<(String, Codeword)>,
    lookup: FxHashMap<String, Codeword>,
}

impl Dictionary {
    /// Rank the patterns in `stats` and give each one a codeword.
    pub fn assign(stats: &PatternStats) -> io::Result<Self> {
        // Bytes each pattern takes up in the input. The sort is stable, so equal
        // priorities keep their discovery order.
        let mut ranked: Vec<(&str, u64)> = stats
            .patterns()
            .iter()
            .map(|(pattern, freq)| (pattern.as_str(), pattern.len() as u64 * freq))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut generator = CodewordGenerator::new();
        let mut entries = Vec::with_capacity(ranked.len());
        for (pattern, _) in &ranked {
            entries.push((pattern.to_string(), generator.next_codeword()?));
        }

        for ((pattern, cw), (_, bytes)) in entries.iter().zip(&ranked).take(REPORTED_PATTERNS) {
            debug!("Pattern {:?} ({} bytes) -> {}", pattern, bytes, cw);
        }

        let lookup = entries.iter().cloned().collect();
        Ok(Self { entries, lookup })
    }

    /// Rebuild a dictionary from stored (pattern, codeword) pairs, checking that they still
    /// form a valid bijection of self-terminating codewords.
    pub fn from_entries(stored: Vec<(String, u64)>) -> io::Result<Self> {
        let mut entries = Vec::with_capacity(stored.len());
        let mut lookup = FxHashMap::default();
        let mut seen = FxHashSet::default();

        for (pattern, value) in stored {
            let cw = Codeword::new(value).ok_or_else(|| {
                invalid(&format!("{} is not a valid codeword", value))
            })?;
            if !seen.insert(value) {
                return Err(invalid(&format!("codeword {} is used twice", cw)));
            }
            if lookup.insert(pattern.clone(), cw).is_some() {
                return Err(invalid(&format!("pattern {:?} is listed twice", pattern)));
            }
            entries.push((pattern, cw));
        }
        Ok(Self { entries, lookup })
    }

    /// Codeword for a pattern. Missing patterns mean the input changed after it was scanned.
    pub fn codeword(&self, pattern: &str) -> io::Result<Codeword> {
        self.lookup.get(pattern).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Pattern {:?} is not in the dictionary.", pattern),
            )
        })
    }

    /// Codeword to pattern map used by the decoder.
    pub fn inverse(&self) -> FxHashMap<u64, String> {
        self.entries
            .iter()
            .map(|(pattern, cw)| (cw.value(), pattern.clone()))
            .collect()
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[(String, Codeword)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn invalid(reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Invalid dictionary: {}", reason),
    )
}

#[cfg(test)]
mod test {
    use super::Dictionary;
    use crate::codewords::codeword::is_self_terminating;
    use crate::tools::pattern_stats::PatternStats;
    use rustc_hash::FxHashSet;

    #[test]
    fn priority_order_test() {
        let mut stats = PatternStats::new();
        stats.upsert("A", 3); // 3 bytes
        stats.upsert("BBBB", 1); // 4 bytes
        stats.upsert(",", 7); // 7 bytes
        stats.upsert("CC", 2); // 4 bytes, ties with BBBB which was seen first
        let dict = Dictionary::assign(&stats).unwrap();
        let order: Vec<(&str, u64)> = dict
            .entries()
            .iter()
            .map(|(p, cw)| (p.as_str(), cw.value()))
            .collect();
        assert_eq!(order, vec![(",", 1), ("BBBB", 3), ("CC", 5), ("A", 7)]);
    }

    #[test]
    fn bijection_test() {
        let input = "AAPL,Q,B,,1000,1050,123.45,100\r\nAAPL,Q,S,,1200,1300,123.50,50\r\n\
                     MSFT,N,B,T,1301,1302,99,7\r\n";
        let stats = PatternStats::scan(input.as_bytes()).unwrap();
        let dict = Dictionary::assign(&stats).unwrap();
        assert_eq!(dict.len(), stats.len());

        let mut values = FxHashSet::default();
        for (_, cw) in dict.entries() {
            assert!(is_self_terminating(cw.value()));
            assert!(values.insert(cw.value()));
        }

        let inverse = dict.inverse();
        for (pattern, _) in stats.patterns() {
            let cw = dict.codeword(pattern).unwrap();
            assert_eq!(&inverse[&cw.value()], pattern);
        }
    }

    #[test]
    fn unknown_pattern_test() {
        let dict = Dictionary::default();
        assert!(dict.is_empty());
        assert_eq!(
            dict.codeword("AAPL").unwrap_err().kind(),
            std::io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn from_entries_test() {
        let dict =
            Dictionary::from_entries(vec![(",".to_string(), 1), ("AAPL".to_string(), 3)]).unwrap();
        assert_eq!(dict.codeword("AAPL").unwrap().value(), 3);

        // Not self-terminating
        assert!(Dictionary::from_entries(vec![("x".to_string(), 4)]).is_err());
        // Codeword reused
        assert!(Dictionary::from_entries(vec![("x".to_string(), 1), ("y".to_string(), 1)]).is_err());
        // Pattern reused
        assert!(Dictionary::from_entries(vec![("x".to_string(), 1), ("x".to_string(), 3)]).is_err());
    }
}
