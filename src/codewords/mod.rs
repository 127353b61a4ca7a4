//! The codewords module turns pattern statistics into the compression dictionary.
//!
//! Codewords are not prefix codes. Instead every codeword is followed by the terminator
//! "00", and the codeword values are chosen so that they can never contain or create
//! that bit pair themselves. The decoder therefore finds codeword boundaries by looking
//! for two zero bits in a row and nothing else.
//!
//! - codeword: the constraint, the codeword generator and the bit scanner.
//! - dictionary: ranking patterns and assigning codewords, plus the inverse map.
//!
pub mod codeword;
pub mod dictionary;
