//! MSB-first bit cursors over fixed-capacity byte buffers.
//!
//! Neither cursor ever grows its buffer: the writer fails with
//! [`DigestError::CapacityExceeded`] and the reader with
//! [`DigestError::TruncatedInput`] instead.

use crate::error::{DigestError, Result};

/// Append-only bit cursor over a caller-supplied buffer.
pub struct BitWriter<'a> {
    dst: &'a mut [u8],
    bit_pos: usize,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the first bit of `dst`.
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, bit_pos: 0 }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_pos
    }

    fn remaining_bits(&self) -> usize {
        self.dst.len() * 8 - self.bit_pos
    }

    fn overflow(&self) -> DigestError {
        DigestError::CapacityExceeded {
            capacity: self.dst.len(),
        }
    }

    #[inline]
    fn put(&mut self, bit: bool) {
        let mask = 0x80u8 >> (self.bit_pos % 8);
        let byte = &mut self.dst[self.bit_pos / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.bit_pos += 1;
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if self.remaining_bits() == 0 {
            return Err(self.overflow());
        }
        self.put(bit);
        Ok(())
    }

    /// Write `q` one-bits followed by a terminating zero-bit.
    ///
    /// Nothing is written when the run does not fit.
    pub fn write_unary(&mut self, q: u64) -> Result<()> {
        if q >= self.remaining_bits() as u64 {
            return Err(self.overflow());
        }
        for _ in 0..q {
            self.put(true);
        }
        self.put(false);
        Ok(())
    }

    /// Write the low `width` bits of `value`, most significant first.
    ///
    /// Nothing is written when the field does not fit.
    pub fn write_fixed(&mut self, value: u64, width: u32) -> Result<()> {
        debug_assert!(width <= 64);
        if width as usize > self.remaining_bits() {
            return Err(self.overflow());
        }
        for shift in (0..width).rev() {
            self.put((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Close the stream and return the number of bytes used.
    ///
    /// Unused bits of the final byte are set to one, so a reader decoding a
    /// unary quotient runs into the end of the buffer rather than a
    /// spurious terminator.
    pub fn finish(mut self) -> usize {
        while self.bit_pos % 8 != 0 {
            self.put(true);
        }
        self.bit_pos / 8
    }
}

/// Read-only bit cursor over a byte slice.
pub struct BitReader<'a> {
    src: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `src`.
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, bit_pos: 0 }
    }

    /// Bits left before the end of the buffer.
    pub fn remaining_bits(&self) -> usize {
        self.src.len() * 8 - self.bit_pos
    }

    fn truncated(&self) -> DigestError {
        DigestError::TruncatedInput {
            bit_offset: self.bit_pos,
        }
    }

    #[inline]
    fn take(&mut self) -> bool {
        let bit = (self.src[self.bit_pos / 8] >> (7 - self.bit_pos % 8)) & 1 == 1;
        self.bit_pos += 1;
        bit
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.remaining_bits() == 0 {
            return Err(self.truncated());
        }
        Ok(self.take())
    }

    /// Count one-bits up to and including the terminating zero-bit.
    pub fn read_unary(&mut self) -> Result<u64> {
        let mut q = 0u64;
        loop {
            if self.remaining_bits() == 0 {
                return Err(self.truncated());
            }
            if !self.take() {
                return Ok(q);
            }
            q += 1;
        }
    }

    /// Read a `width`-bit big-endian field.
    pub fn read_fixed(&mut self, width: u32) -> Result<u64> {
        debug_assert!(width <= 64);
        if width as usize > self.remaining_bits() {
            // Consume what is left so the offset points at the buffer end.
            self.bit_pos = self.src.len() * 8;
            return Err(self.truncated());
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.take());
        }
        Ok(value)
    }
}
