//! PNG carrier: least-significant bit of non-alpha channel bytes.
//!
//! A fully transparent pixel contributes no carrier bytes — its color
//! channels are typically filled with whatever the encoder left behind and
//! are not meaningful, so toggling them is both pointless and occasionally
//! visible after certain editors normalize transparent pixels. For 16-bit
//! samples, only the low byte of each big-endian sample carries a bit;
//! the high byte dominates perceived value and is left untouched.

use std::io::Cursor;

use png::{BitDepth, ColorType, Decoder, Encoder, Info, Transformations};

use crate::carrier::CarrierCodec;
use crate::error::StegError;

pub struct PngCarrier {
    width: u32,
    height: u32,
    bit_depth: BitDepth,
    color_type: ColorType,
    buffer: Vec<u8>,
    info: Info<'static>,
    carrier_values: Vec<u8>,
    carrier_offsets: Vec<usize>,
}

impl PngCarrier {
    pub fn decode(bytes: &[u8]) -> Result<Self, StegError> {
        let mut decoder = Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(Transformations::EXPAND);
        let mut reader =
            decoder.read_info().map_err(|e| StegError::CodecFail(format!("invalid PNG header: {e}")))?;

        let mut buffer = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buffer).map_err(|e| StegError::CodecFail(format!("PNG decode failed: {e}")))?;
        buffer.truncate(frame.buffer_size());

        let bit_depth = frame.bit_depth;
        let color_type = frame.color_type;
        if !matches!(bit_depth, BitDepth::Eight | BitDepth::Sixteen) {
            return Err(StegError::CodecFail("unsupported PNG bit depth after expansion".into()));
        }

        let info = reader.info().clone();
        let width = frame.width;
        let height = frame.height;

        let num_channels = color_type.samples();
        let has_alpha = matches!(color_type, ColorType::GrayscaleAlpha | ColorType::Rgba);
        let bytes_per_sample = if bit_depth == BitDepth::Sixteen { 2 } else { 1 };
        let bytes_per_pixel = num_channels * bytes_per_sample;
        let stride = frame.line_size;

        let mut carrier_values = Vec::new();
        let mut carrier_offsets = Vec::new();

        for row in 0..height as usize {
            let row_start = row * stride;
            for col in 0..width as usize {
                let pixel_start = row_start + col * bytes_per_pixel;
                let alpha = if has_alpha {
                    let alpha_channel = num_channels - 1;
                    read_sample(&buffer, pixel_start, alpha_channel, bytes_per_sample)
                } else {
                    u16::MAX
                };
                if alpha == 0 {
                    continue;
                }
                let color_channels = if has_alpha { num_channels - 1 } else { num_channels };
                for channel in 0..color_channels {
                    let offset = pixel_start + channel * bytes_per_sample + (bytes_per_sample - 1);
                    carrier_offsets.push(offset);
                    carrier_values.push(buffer[offset]);
                }
            }
        }

        if carrier_values.is_empty() {
            return Err(StegError::NoCapacity);
        }

        Ok(Self { width, height, bit_depth, color_type, buffer, info, carrier_values, carrier_offsets })
    }
}

fn read_sample(buffer: &[u8], pixel_start: usize, channel: usize, bytes_per_sample: usize) -> u16 {
    let offset = pixel_start + channel * bytes_per_sample;
    if bytes_per_sample == 2 {
        u16::from_be_bytes([buffer[offset], buffer[offset + 1]])
    } else {
        u16::from(buffer[offset])
    }
}

impl CarrierCodec for PngCarrier {
    fn carrier_values(&self) -> &[u8] {
        &self.carrier_values
    }

    fn set_carrier_value(&mut self, raw_index: usize, value: u8) {
        let offset = self.carrier_offsets[raw_index];
        self.buffer[offset] = value;
        self.carrier_values[raw_index] = value;
    }

    fn encode(&self) -> Result<Vec<u8>, StegError> {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(self.color_type);
            encoder.set_depth(self.bit_depth);

            if let Some(gamma) = self.info.source_gamma {
                encoder.set_source_gamma(gamma);
            }
            if let Some(chroma) = self.info.source_chromaticities {
                encoder.set_source_chromaticities(chroma);
            }
            if let Some(srgb) = self.info.srgb {
                encoder.set_srgb(srgb);
            }
            if let Some(icc) = &self.info.icc_profile {
                encoder.set_icc_profile(icc.clone().into_owned());
            }
            for text in &self.info.uncompressed_latin1_text {
                let _ = encoder.add_text_chunk(text.keyword.clone(), text.text.clone());
            }
            if let Some((x, y)) = self.info.pixel_dims.map(|d| (d.xppu, d.yppu)) {
                let _ = encoder.set_pixel_dims(Some(png::PixelDimensions {
                    xppu: x,
                    yppu: y,
                    unit: png::Unit::Meter,
                }));
            }

            let mut writer =
                encoder.write_header().map_err(|e| StegError::SaveFail(format!("PNG header write failed: {e}")))?;
            writer
                .write_image_data(&self.buffer)
                .map_err(|e| StegError::SaveFail(format!("PNG data write failed: {e}")))?;
        }
        Ok(out)
    }
}
