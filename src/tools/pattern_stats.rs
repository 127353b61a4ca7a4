//! First pass over the input: count how often every pattern occurs.
//!
//! A pattern is any reusable piece of a serialized record: field values, timestamp
//! deltas, the pieces of a price and the punctuation between them. Patterns are
//! identified by their text alone, so a delta of "100" and a size of "100" share one
//! entry.

use std::io::{self, BufRead};

use log::{info, trace};
use rustc_hash::FxHashMap;

use super::delta::TimeDeltas;
use super::record::{Tick, CR, DECIMAL_POINT, FIELD_COUNT, FIELD_SEPARATOR, LF};

/// Pattern frequencies in the order the patterns were first seen.
#[derive(Debug, Default)]
pub struct PatternStats {
    /// (pattern, frequency) in discovery order. Ties in priority keep this order.
    patterns: Vec<(String, u64)>,
    /// Position of each pattern in `patterns`.
    index: FxHashMap<String, usize>,
    /// Number of records scanned.
    records: u64,
    /// Number of input bytes the scanned records occupy, with CR LF line endings.
    input_bytes: u64,
}

impl PatternStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every line of the input and return the pattern statistics.
    pub fn scan<R: BufRead>(input: R) -> io::Result<Self> {
        let mut stats = Self::new();
        let mut deltas = TimeDeltas::new();

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = idx as u64 + 1;
            let tick = Tick::parse(&line, line_no)?;
            let times = deltas.next(&tick, line_no)?;
            trace!("Line {}: send {}, recv {}", line_no, times.send, times.recv);

            stats.upsert(&times.recv, 1);
            stats.upsert(&times.send, 1);
            stats.upsert(FIELD_SEPARATOR, FIELD_COUNT as u64 - 1);
            stats.upsert(tick.ticker, 1);
            stats.upsert(tick.size, 1);
            stats.upsert(tick.price.whole, 1);
            if let Some(fraction) = tick.price.fraction {
                stats.upsert(DECIMAL_POINT, 1);
                stats.upsert(fraction, 1);
            }
            stats.upsert(tick.exchange, 1);
            stats.upsert(tick.side, 1);
            stats.upsert(tick.condition, 1);
            stats.upsert(CR, 1);
            stats.upsert(LF, 1);

            stats.records += 1;
            stats.input_bytes += line.len() as u64 + 2;
        }

        info!(
            "Scanned {} records, found {} distinct patterns.",
            stats.records,
            stats.patterns.len()
        );
        Ok(stats)
    }

    /// Add `freq` occurrences of `pattern`, registering it if it is new.
    pub fn upsert(&mut self, pattern: &str, freq: u64) {
        match self.index.get(pattern) {
            Some(&pos) => self.patterns[pos].1 += freq,
            None => {
                self.index.insert(pattern.to_string(), self.patterns.len());
                self.patterns.push((pattern.to_string(), freq));
            }
        }
    }

    /// Frequency of a pattern, zero if it never occurred.
    pub fn freq(&self, pattern: &str) -> u64 {
        self.index
            .get(pattern)
            .map_or(0, |&pos| self.patterns[pos].1)
    }

    /// All (pattern, frequency) pairs in discovery order.
    pub fn patterns(&self) -> &[(String, u64)] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn input_bytes(&self) -> u64 {
        self.input_bytes
    }
}
