//! The bitstream module forms the I/O subsystem of the codec.
//!
//! Codewords are packed MSB first with no alignment. The encoder flushes whole bytes after
//! every record and carries the leftover bits into the next one. The decoder reads the
//! artifact in bounded chunks and walks their bits one at a time.
//!
//! This I/O subsystem is designed to efficiently interface with the other modules of the codec. It is not intended for
//! more general use.
//!
pub mod bitpacker;
pub mod bitreader;
