//! WebP carrier: decode to RGBA and apply the same rules as PNG.
//!
//! Animated WebP is rejected outright — the RIFF container is sniffed for
//! an `ANIM` chunk before any decode is attempted, since an animation's
//! later frames would silently desynchronize the pixel-to-carrier mapping
//! from whatever frame got decoded. Output is always re-encoded lossless
//! so unrelated pixels are never perturbed.

use webp::{Decoder, Encoder};

use crate::carrier::CarrierCodec;
use crate::error::StegError;

pub struct WebpCarrier {
    width: u32,
    height: u32,
    has_alpha: bool,
    buffer: Vec<u8>,
    carrier_values: Vec<u8>,
    carrier_offsets: Vec<usize>,
}

fn is_animated(bytes: &[u8]) -> bool {
    bytes.windows(4).any(|w| w == b"ANIM")
}

impl WebpCarrier {
    pub fn decode(bytes: &[u8]) -> Result<Self, StegError> {
        if is_animated(bytes) {
            return Err(StegError::CodecFail("animated WebP is not supported".into()));
        }

        let decoder = Decoder::new(bytes);
        let image = decoder.decode().ok_or_else(|| StegError::CodecFail("WebP decode failed".into()))?;

        let width = image.width();
        let height = image.height();
        let has_alpha = image.is_alpha();
        let buffer = image.to_vec();

        let channels = if has_alpha { 4 } else { 3 };
        let stride = width as usize * channels;

        let mut carrier_values = Vec::new();
        let mut carrier_offsets = Vec::new();

        for row in 0..height as usize {
            let row_start = row * stride;
            for col in 0..width as usize {
                let pixel_start = row_start + col * channels;
                let alpha = if has_alpha { buffer[pixel_start + 3] } else { u8::MAX };
                if alpha == 0 {
                    continue;
                }
                let color_channels = if has_alpha { channels - 1 } else { channels };
                for channel in 0..color_channels {
                    let offset = pixel_start + channel;
                    carrier_offsets.push(offset);
                    carrier_values.push(buffer[offset]);
                }
            }
        }

        if carrier_values.is_empty() {
            return Err(StegError::NoCapacity);
        }

        Ok(Self { width, height, has_alpha, buffer, carrier_values, carrier_offsets })
    }
}

impl CarrierCodec for WebpCarrier {
    fn carrier_values(&self) -> &[u8] {
        &self.carrier_values
    }

    fn set_carrier_value(&mut self, raw_index: usize, value: u8) {
        let offset = self.carrier_offsets[raw_index];
        self.buffer[offset] = value;
        self.carrier_values[raw_index] = value;
    }

    fn encode(&self) -> Result<Vec<u8>, StegError> {
        let encoder = if self.has_alpha {
            Encoder::from_rgba(&self.buffer, self.width, self.height)
        } else {
            Encoder::from_rgb(&self.buffer, self.width, self.height)
        };
        let memory = encoder.encode_lossless();
        Ok(memory.to_vec())
    }
}
