//! The tools module provides the supporting pieces of the codec.
//!
//! The tools are:
//! - cli: Command line interface and run options.
//! - record: The tick record schema and line parsing.
//! - delta: Timestamp delta encoding and its reversal.
//! - pattern_stats: Pattern frequency count (the first compression pass).
//! - sidecar: Saving and loading the dictionary that belongs to a compressed file.
//!
pub mod cli;
pub mod delta;
pub mod pattern_stats;
pub mod record;
pub mod sidecar;
