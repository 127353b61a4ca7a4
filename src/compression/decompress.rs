use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use log::{debug, error, info, trace, warn};
use rustc_hash::FxHashMap;

use crate::bitstream::bitreader::{bits, BitReader};
use crate::codewords::codeword::CodewordScanner;
use crate::codewords::dictionary::Dictionary;
use crate::tools::cli::CtOpts;
use crate::tools::delta::reverse_deltas;
use crate::tools::record::LF;
use crate::tools::sidecar::DictionaryStore;

/// Where the decoder is in the bitstream.
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// At a record boundary: the start of the stream or right after an LF codeword. A zero
    /// bit here is the end-of-stream padding.
    LineComplete,
    /// Inside a record, between a terminator and the next codeword.
    AwaitingBit,
    /// Collecting the bits of a codeword.
    AccumulatingCodeword(CodewordScanner),
    /// The end-of-stream padding has started. Only zero bits may follow.
    Finished,
}

/// Streaming decoder. Feed it chunks of the compressed stream in order with decode_chunk()
/// and call finish() after the last one. Everything that straddles a chunk boundary (a
/// partial codeword, the record being rebuilt, the previous record) is kept between calls,
/// so the output does not depend on where the chunks were cut.
pub struct Decoder {
    inverse: FxHashMap<u64, String>,
    phase: Phase,
    /// Last fully reconstructed line, needed to undo the recvTime delta.
    previous_line: Option<String>,
    /// Patterns of the record being rebuilt.
    current_line: String,
    records: u64,
    /// Bits consumed so far, for error messages.
    position: u64,
}

impl Decoder {
    pub fn new(dictionary: &Dictionary) -> Self {
        Self {
            inverse: dictionary.inverse(),
            phase: Phase::LineComplete,
            previous_line: None,
            current_line: String::new(),
            records: 0,
            position: 0,
        }
    }

    /// Decode one chunk, writing every record it completes to `out`.
    pub fn decode_chunk<W: Write>(&mut self, chunk: &[u8], out: &mut W) -> io::Result<()> {
        for bit in bits(chunk) {
            self.phase = match self.phase {
                Phase::LineComplete if bit => Phase::AccumulatingCodeword(start(bit)?),
                Phase::LineComplete => {
                    debug!("End of stream found at bit {}.", self.position);
                    Phase::Finished
                }
                Phase::AwaitingBit if bit => Phase::AccumulatingCodeword(start(bit)?),
                Phase::AwaitingBit => {
                    return Err(self.corrupt("a codeword starts with a zero bit"));
                }
                Phase::AccumulatingCodeword(mut scanner) => match scanner.push(bit) {
                    Ok(Some(value)) => self.emit(value, out)?,
                    Ok(None) => Phase::AccumulatingCodeword(scanner),
                    Err(e) => {
                        error!("{} at bit {}", e, self.position);
                        return Err(e);
                    }
                },
                Phase::Finished if bit => {
                    return Err(self.corrupt("data follows the end of stream"));
                }
                Phase::Finished => Phase::Finished,
            };
            self.position += 1;
        }
        trace!("Chunk done at bit {}, {} records so far.", self.position, self.records);
        Ok(())
    }

    /// Handle a complete codeword. Returns the phase that follows it.
    fn emit<W: Write>(&mut self, value: u64, out: &mut W) -> io::Result<Phase> {
        let pattern = match self.inverse.get(&value) {
            Some(pattern) => pattern,
            None => return Err(self.corrupt(&format!("unknown codeword {:b}", value))),
        };

        if pattern != LF {
            self.current_line.push_str(pattern);
            return Ok(Phase::AwaitingBit);
        }

        // A whole record is in. Restore its timestamps and write it out.
        let line = reverse_deltas(self.previous_line.as_deref(), &self.current_line)
            .map_err(|e| {
                error!("{} in record {}", e, self.records + 1);
                e
            })?;
        out.write_all(line.as_bytes())?;
        out.write_all(LF.as_bytes())?;
        self.previous_line = Some(line);
        self.current_line.clear();
        self.records += 1;
        Ok(Phase::LineComplete)
    }

    /// Check that the stream ended cleanly. Returns the number of records decoded.
    pub fn finish(self) -> io::Result<u64> {
        match self.phase {
            Phase::Finished => Ok(self.records),
            Phase::LineComplete => {
                warn!("Compressed stream ends without its end-of-stream padding.");
                Ok(self.records)
            }
            Phase::AwaitingBit | Phase::AccumulatingCodeword(_) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Compressed stream ends inside record {}.",
                    self.records + 1
                ),
            )),
        }
    }

    /// Records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    fn corrupt(&self, reason: &str) -> io::Error {
        error!("Corrupt compressed data at bit {}: {}", self.position, reason);
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Corrupt compressed data at bit {}: {}. Is this the right dictionary?",
                self.position, reason
            ),
        )
    }
}

/// A fresh scanner holding the first bit of a codeword.
fn start(bit: bool) -> io::Result<CodewordScanner> {
    let mut scanner = CodewordScanner::new();
    scanner.push(bit)?;
    Ok(scanner)
}

/// Decode a whole compressed stream, reading it `chunk_size` bytes at a time.
/// Returns the number of records written.
pub fn decode<R: Read, W: Write>(
    input: R,
    dictionary: &Dictionary,
    chunk_size: usize,
    out: &mut W,
) -> io::Result<u64> {
    let mut br = BitReader::new(input, chunk_size);
    let mut decoder = Decoder::new(dictionary);
    while let Some(chunk) = br.next_chunk()? {
        decoder.decode_chunk(chunk, out)?;
    }
    debug!("Read {} chunks.", br.chunks());
    decoder.finish()
}

/// Decompress an in-memory artifact.
pub fn decompress_bytes(
    input: &[u8],
    dictionary: &Dictionary,
    chunk_size: usize,
) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 2);
    decode(input, dictionary, chunk_size, &mut out)?;
    Ok(out)
}

/// Decompress the file specified in opts (CtOpts), using the dictionary from `store`.
pub fn decompress(opts: &CtOpts, store: &impl DictionaryStore) -> io::Result<()> {
    let dictionary = store.load(opts.artifact())?;
    store.verify(&dictionary, opts.artifact())?;

    let fin = File::open(&opts.input)?;
    let mut f_out = BufWriter::new(File::create(&opts.output)?);
    let records = decode(fin, &dictionary, opts.chunk_size, &mut f_out)?;
    f_out.flush()?;

    info!(
        "Restored {} records to {}.",
        records,
        opts.output.display()
    );
    Ok(())
}
