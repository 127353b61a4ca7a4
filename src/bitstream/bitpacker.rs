use crate::codewords::codeword::{Codeword, TERMINATOR_BITS};

/// Packs codewords and their terminators into bytes.
///
/// Whole bytes collect in `output`. Bits that do not yet fill a byte stay in the queue and
/// are carried into the next record. Take the bytes out of `output` after each record and
/// call finish() once after the last one.
pub struct BitPacker {
    pub output: Vec<u8>,
    queue: u64,
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of the size specified.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Move every whole byte from the queue to the output buffer.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Writes the lowest `depth` bits of `data`, most significant first.
    pub fn out_bits(&mut self, data: u64, depth: u8) {
        // Keep each push small enough that queue never holds more than 39 bits
        if depth > 32 {
            self.out_bits(data >> 32, depth - 32);
            self.out_bits(data & 0xffff_ffff, 32);
            return;
        }
        if depth == 0 {
            return;
        }
        self.queue <<= depth; //shift queue by bit length
        self.queue |= data & (u64::MAX >> (64 - depth)); //add data portion to queue
        self.q_bits += depth; //update depth of queue bits
        self.write_stream();
    }

    /// Writes a codeword followed by its "00" terminator.
    pub fn out_codeword(&mut self, cw: Codeword) {
        self.out_bits(cw.value(), cw.bit_len());
        self.out_bits(0, TERMINATOR_BITS);
    }

    /// Number of bits waiting for a full byte.
    pub fn pending_bits(&self) -> u8 {
        self.q_bits
    }

    /// Ends the stream: pads the leftover bits (even none) with zeros to a whole byte and
    /// appends one more zero byte. The zeros after the last terminator mark the end of the
    /// data for the decoder.
    pub fn finish(&mut self) {
        self.queue <<= 8 - self.q_bits; //pad the queue with zeros
        self.q_bits += 8 - self.q_bits;
        self.write_stream();
        self.output.push(0);
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format! {"[{}.{}]",((self.output.len() * 8) + self.q_bits as usize)/8, ((self.output.len() * 8) + self.q_bits as usize)%8}
    }
}
