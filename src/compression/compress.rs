use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use log::{info, trace};

use crate::bitstream::bitpacker::BitPacker;
use crate::codewords::dictionary::Dictionary;
use crate::tools::cli::CtOpts;
use crate::tools::delta::TimeDeltas;
use crate::tools::pattern_stats::PatternStats;
use crate::tools::record::{Tick, CR, DECIMAL_POINT, FIELD_SEPARATOR, LF};
use crate::tools::sidecar::DictionaryStore;

/// Room for one record's worth of packed bytes.
const RECORD_BUFFER: usize = 64;

/// What the encoding pass produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeSummary {
    /// Records encoded.
    pub records: u64,
    /// Compressed bytes written, including the end-of-stream padding.
    pub bytes_out: u64,
}

/*
    Compression is two passes over the same input. The first pass (PatternStats::scan)
    counts patterns so the dictionary can give the busiest ones the shortest codewords.
    The second pass, below, looks up every field of every record and packs the codewords.

    Bytes are written out after every record. Bits that do not fill a byte stay in the
    BitPacker queue and lead off the next record.
*/

/// Encode every record of `input` with `dictionary`, writing the packed bytes to `out`.
pub fn encode<R: BufRead, W: Write>(
    input: R,
    dictionary: &Dictionary,
    out: &mut W,
) -> io::Result<EncodeSummary> {
    let mut bw = BitPacker::new(RECORD_BUFFER);
    let mut deltas = TimeDeltas::new();
    let mut summary = EncodeSummary::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = idx as u64 + 1;
        let tick = Tick::parse(&line, line_no)?;
        let times = deltas.next(&tick, line_no)?;
        let separator = dictionary.codeword(FIELD_SEPARATOR)?;

        // Everything up to the price, each field followed by a separator
        for field in [
            tick.ticker,
            tick.exchange,
            tick.side,
            tick.condition,
            times.send.as_str(),
            times.recv.as_str(),
        ] {
            bw.out_codeword(dictionary.codeword(field)?);
            bw.out_codeword(separator);
        }

        // The price goes out in pieces: whole, then optionally '.' and the fraction
        bw.out_codeword(dictionary.codeword(tick.price.whole)?);
        if let Some(fraction) = tick.price.fraction {
            bw.out_codeword(dictionary.codeword(DECIMAL_POINT)?);
            bw.out_codeword(dictionary.codeword(fraction)?);
        }
        bw.out_codeword(separator);

        // Size closes the record, followed by CR LF
        bw.out_codeword(dictionary.codeword(tick.size)?);
        bw.out_codeword(dictionary.codeword(CR)?);
        bw.out_codeword(dictionary.codeword(LF)?);

        // Write out the whole bytes. The queue carries over to the next record.
        out.write_all(&bw.output)?;
        summary.bytes_out += bw.output.len() as u64;
        bw.output.clear();
        summary.records += 1;
        trace!("Record {} packed, stream at {}", line_no, bw.loc());
    }

    // Pad out the last bits and add the end-of-stream byte
    bw.finish();
    out.write_all(&bw.output)?;
    summary.bytes_out += bw.output.len() as u64;
    Ok(summary)
}

/// Compress an in-memory tick file. Returns the compressed bytes and the dictionary that
/// decodes them.
pub fn compress_bytes(input: &[u8]) -> io::Result<(Vec<u8>, Dictionary)> {
    let stats = PatternStats::scan(input)?;
    let dictionary = Dictionary::assign(&stats)?;
    let mut out = Vec::with_capacity(input.len() / 2);
    encode(input, &dictionary, &mut out)?;
    Ok((out, dictionary))
}

/// Compress the input file defined in opts <CtOpts> and save the dictionary with `store`.
pub fn compress(opts: &CtOpts, store: &impl DictionaryStore) -> io::Result<()> {
    // First pass: statistics and dictionary
    info!("Scanning {} for patterns.", opts.input.display());
    let stats = PatternStats::scan(BufReader::new(File::open(&opts.input)?))?;
    let dictionary = Dictionary::assign(&stats)?;
    info!("Assigned {} codewords.", dictionary.len());

    // Second pass: encode. The file is created (or truncated) here.
    let summary = {
        let fin = BufReader::new(File::open(&opts.input)?);
        let mut f_out = BufWriter::new(File::create(&opts.output)?);
        let summary = encode(fin, &dictionary, &mut f_out)?;
        f_out.flush()?;
        summary
    };

    info!(
        "Wrote {} records as {} bytes to {} ({} input bytes, {:.1}% of original).",
        summary.records,
        summary.bytes_out,
        opts.output.display(),
        stats.input_bytes(),
        ratio(summary.bytes_out, stats.input_bytes()),
    );

    store.save(&dictionary, opts.artifact())
}

fn ratio(compressed: u64, original: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    compressed as f64 * 100.0 / original as f64
}

#[cfg(test)]
mod test {
    use super::{compress_bytes, encode, EncodeSummary};
    use crate::bitstream::bitreader::bits;
    use crate::codewords::dictionary::Dictionary;
    use crate::tools::pattern_stats::PatternStats;

    #[test]
    fn empty_input_test() {
        let (out, dict) = compress_bytes(b"").unwrap();
        assert_eq!(out, vec![0, 0]);
        assert!(dict.is_empty());
    }

    #[test]
    fn single_record_bits_test() {
        let input = "A,B,C,D,5,7,9,1\r\n";
        let stats = PatternStats::scan(input.as_bytes()).unwrap();
        let dict = Dictionary::assign(&stats).unwrap();
        let mut out = vec![];
        let summary = encode(input.as_bytes(), &dict, &mut out).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.bytes_out, out.len() as u64);

        // Rebuild the expected bit string by hand
        let mut expected = String::new();
        for pattern in [
            "A", ",", "B", ",", "C", ",", "D", ",", "5", ",", "7", ",", "9", ",", "1", "\r", "\n",
        ] {
            expected.push_str(&dict.codeword(pattern).unwrap().to_string());
            expected.push_str("00");
        }
        let actual: String = bits(&out)
            .map(|b| if b { '1' } else { '0' })
            .collect();
        assert!(actual.starts_with(&expected));
        // Padding to a whole byte plus one zero byte
        let tail = &actual[expected.len()..];
        assert!(tail.chars().all(|c| c == '0'));
        assert!(tail.len() > 8 && tail.len() <= 16);
    }

    #[test]
    fn summary_counts_test() {
        let input = "AAPL,Q,B,,1000,1050,123.45,100\r\nAAPL,Q,S,,1200,1300,123.50,50\r\n";
        let stats = PatternStats::scan(input.as_bytes()).unwrap();
        let dict = Dictionary::assign(&stats).unwrap();
        let mut out = vec![];
        let summary = encode(input.as_bytes(), &dict, &mut out).unwrap();
        assert_eq!(
            summary,
            EncodeSummary {
                records: 2,
                bytes_out: out.len() as u64
            }
        );
        assert!(out.len() < input.len());
    }

    #[test]
    fn changed_input_test() {
        // The dictionary was built from different data than what is encoded
        let stats = PatternStats::scan("A,B,C,D,5,7,9,1\r\n".as_bytes()).unwrap();
        let dict = Dictionary::assign(&stats).unwrap();
        let mut out = vec![];
        let err = encode("Z,B,C,D,5,7,9,1\r\n".as_bytes(), &dict, &mut out).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
