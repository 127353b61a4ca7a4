//! Constrained time-crunch compression for market data tick files.
//!
//! Losslessly compresses a stream of fixed-schema tick records
//! (`ticker,exchange,side,condition,sendTime,recvTime,price,size`, CR LF terminated) into a
//! dense bitstream, and restores it byte for byte.
//!
//! Compression makes two passes over the input. The first counts every reusable pattern
//! (field values, timestamp deltas, punctuation) and hands the patterns that account for
//! the most input bytes the shortest codewords. The second pass replaces every pattern
//! with its codeword and a "00" terminator and packs the bits. Timestamps after the first
//! record are stored as deltas.
//!
//! The compressed file has no header. Its dictionary is saved beside it and is required to
//! decompress it.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> timecrunch -c ticks.csv ticks.ct`
//!
//! This creates ticks.ct and the hidden dictionary .ticks.ct.ctcd next to it.
//!
//! `$> timecrunch -d ticks.ct restored.csv`
//!
pub mod bitstream;
pub mod codewords;
pub mod compression;
pub mod tools;
