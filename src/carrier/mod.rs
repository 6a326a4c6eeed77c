//! Per-codec carrier enumeration: which bytes of a decoded image may have
//! their least-significant bit toggled, and in what order.
//!
//! Each codec produces a flat `Vec<u8>` of carrier values read in a
//! canonical raw order, plus a `write_back` step that folds mutated values
//! back into the decoded representation before re-encoding. Keeping the
//! decoded image and the carrier buffer as two plain owned values (instead
//! of an array of pointers into the decoded buffer, as the C original
//! does) avoids any unsafe aliasing between them.

pub mod jpeg;
pub mod png;
pub mod webp;

use crate::cipher::Prng;
use crate::error::StegError;
use crate::types::Codec;

/// A decoded cover image together with its flat carrier byte buffer.
pub trait CarrierCodec {
    /// Raw (unshuffled) carrier values, in canonical enumeration order.
    fn carrier_values(&self) -> &[u8];

    /// Overwrite carrier value `raw_index` (an index into the raw
    /// enumeration, not a permuted slot) with `value`.
    fn set_carrier_value(&mut self, raw_index: usize, value: u8);

    /// Re-encode the image with its mutated carrier values folded back in.
    fn encode(&self) -> Result<Vec<u8>, StegError>;
}

/// The carrier abstraction the embedding engine operates on: a decoded
/// image plus the password-permuted order in which its carrier bytes are
/// visited.
pub struct CarrierImage {
    pub codec: Codec,
    pub inner: Box<dyn CarrierCodec>,
    /// `slots[i]` is the raw carrier index visited at permuted position `i`.
    pub slots: Vec<usize>,
    pub pos: usize,
}

impl CarrierImage {
    pub fn open(bytes: &[u8], prng: &mut Prng) -> Result<Self, StegError> {
        let codec = Codec::sniff(bytes).ok_or(StegError::FileInvalid)?;
        let inner: Box<dyn CarrierCodec> = match codec {
            Codec::Jpeg => Box::new(jpeg::JpegCarrier::decode(bytes)?),
            Codec::Png => Box::new(png::PngCarrier::decode(bytes)?),
            Codec::Webp => Box::new(webp::WebpCarrier::decode(bytes)?),
        };

        let mut slots: Vec<usize> = (0..inner.carrier_values().len()).collect();
        if slots.is_empty() {
            return Err(StegError::NoCapacity);
        }
        prng.shuffle(&mut slots);

        Ok(Self { codec, inner, slots, pos: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bytes still available ahead of `pos`.
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.pos
    }

    /// Write `data`, one bit per carrier byte, starting at the current
    /// `pos`. Advances `pos` by `data.len() * 8`.
    pub fn write_bits(&mut self, data: &[u8]) -> Result<(), StegError> {
        let needed = data.len() * 8;
        if needed > self.remaining() {
            return Err(StegError::FileTooBig);
        }
        let values = self.inner.carrier_values().to_vec();
        for (byte_idx, &byte) in data.iter().enumerate() {
            for bit in 0..8 {
                let raw_index = self.slots[self.pos + byte_idx * 8 + bit];
                let carrier = values[raw_index];
                let wanted_bit = (byte >> bit) & 1;
                let new_value = (carrier & !1) | wanted_bit;
                self.inner.set_carrier_value(raw_index, new_value);
            }
        }
        self.pos += needed;
        Ok(())
    }

    /// Read `len` bytes, one bit per carrier byte, starting at the current
    /// `pos`. Advances `pos` by `len * 8`.
    pub fn read_bits(&mut self, len: usize) -> Result<Vec<u8>, StegError> {
        let needed = len * 8;
        if needed > self.remaining() {
            return Err(StegError::PayloadOob);
        }
        let values = self.inner.carrier_values();
        let mut out = vec![0u8; len];
        for byte_idx in 0..len {
            let mut byte = 0u8;
            for bit in 0..8 {
                let raw_index = self.slots[self.pos + byte_idx * 8 + bit];
                let carrier_bit = values[raw_index] & 1;
                byte |= carrier_bit << bit;
            }
            out[byte_idx] = byte;
        }
        self.pos += needed;
        Ok(out)
    }

    pub fn encode(&self) -> Result<Vec<u8>, StegError> {
        self.inner.encode()
    }
}
