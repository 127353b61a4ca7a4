//! The compression module runs both directions of the codec.
//!
//! Compression happens in the following steps:
//! - Pattern statistics: read every record once and count each pattern, with timestamps
//!   already replaced by their deltas.
//! - Codeword assignment: rank patterns by the input bytes they cover and give the highest
//!   ranked ones the smallest self-terminating codewords.
//! - Encoding: read the records again and pack each field's codeword plus a "00"
//!   terminator, flushing whole bytes after every record.
//! - The dictionary is saved next to the compressed file.
//!
//! Decompression is the inverse, done in one pass over bounded chunks of the compressed
//! file.
//! - Split the bits on "00" terminators and look each codeword up.
//! - Rebuild each record from its patterns until the LF codeword closes it.
//! - Restore absolute timestamps from the previous record.
//!
//! Both directions are single threaded. Each record depends on the one before it.
//!

pub mod compress;
pub mod decompress;
