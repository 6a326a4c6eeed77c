//! JPEG carrier: least-significant bit of AC DCT coefficients.
//!
//! The DC coefficient of each 8x8 block (index 0) carries most of the
//! block's average brightness and is never touched. Among the AC
//! coefficients, values of exactly `0` or `1` are skipped too: JPEG
//! run-length-encodes zero runs, so flipping a coefficient into or out of
//! `{0, 1}` changes the compressed bitstream size and is visually
//! noticeable in flat regions. Coefficient access goes straight through
//! libjpeg-turbo's coefficient API (`jpeg_read_coefficients` /
//! `jpeg_write_coefficients`), the same entry points the reference tool
//! uses — no safe pure-Rust crate exposes coefficients below the decoded
//! pixel level.

use std::os::raw::c_int;
use std::ptr;

use mozjpeg_sys::*;

use crate::carrier::CarrierCodec;
use crate::error::StegError;

const DCTSIZE2: usize = 64;

struct Block {
    /// Which component this block belongs to (index into `components`).
    component: usize,
    /// The 64 raw coefficient values for this block, indices 1..64 are
    /// eligible carriers, index 0 (DC) never is.
    coeffs: [i16; DCTSIZE2],
}

pub struct JpegCarrier {
    blocks: Vec<Block>,
    /// Flat carrier buffer in canonical order: component, block, AC index.
    carrier_values: Vec<u8>,
    /// For each carrier slot, `(block_index, coeff_index)` so a write can
    /// be folded back into `blocks`.
    carrier_locations: Vec<(usize, usize)>,
    original: Vec<u8>,
}

impl JpegCarrier {
    pub fn decode(bytes: &[u8]) -> Result<Self, StegError> {
        unsafe {
            let mut err: jpeg_error_mgr = std::mem::zeroed();
            let mut cinfo: jpeg_decompress_struct = std::mem::zeroed();
            cinfo.common.err = jpeg_std_error(&mut err);
            jpeg_create_decompress(&mut cinfo);

            jpeg_mem_src(&mut cinfo, bytes.as_ptr(), bytes.len() as u64);
            if jpeg_read_header(&mut cinfo, true as boolean) != JPEG_HEADER_OK as c_int {
                jpeg_destroy_decompress(&mut cinfo);
                return Err(StegError::CodecFail("invalid JPEG header".into()));
            }

            let coef_arrays = jpeg_read_coefficients(&mut cinfo);
            if coef_arrays.is_null() {
                jpeg_destroy_decompress(&mut cinfo);
                return Err(StegError::CodecFail("no DCT coefficients".into()));
            }

            let num_components = cinfo.num_components as usize;
            let mut blocks = Vec::new();
            let mut carrier_values = Vec::new();
            let mut carrier_locations = Vec::new();

            for component in 0..num_components {
                let compptr = *cinfo.comp_info.add(component);
                let comp_array = *coef_arrays.add(component);
                let blocks_per_column = compptr.height_in_blocks as usize;
                let blocks_per_row = compptr.width_in_blocks as usize;

                for row in 0..blocks_per_column {
                    let row_ptr =
                        (*(*cinfo.mem).access_virt_barray.unwrap())(&mut cinfo.common, comp_array, row as u32, 1, false as boolean);
                    for col in 0..blocks_per_row {
                        let block_ptr = *row_ptr.add(col);
                        let mut coeffs = [0i16; DCTSIZE2];
                        coeffs.copy_from_slice(std::slice::from_raw_parts(block_ptr, DCTSIZE2));

                        let block_index = blocks.len();
                        for i in 1..DCTSIZE2 {
                            let value = coeffs[i];
                            if value != 0 && value != 1 {
                                carrier_values.push((value & 0xFF) as u8);
                                carrier_locations.push((block_index, i));
                            }
                        }
                        blocks.push(Block { component, coeffs });
                    }
                }
            }

            jpeg_destroy_decompress(&mut cinfo);

            if carrier_values.is_empty() {
                return Err(StegError::NoCapacity);
            }

            Ok(Self { blocks, carrier_values, carrier_locations, original: bytes.to_vec() })
        }
    }
}

impl CarrierCodec for JpegCarrier {
    fn carrier_values(&self) -> &[u8] {
        &self.carrier_values
    }

    fn set_carrier_value(&mut self, raw_index: usize, value: u8) {
        let (block_index, coeff_index) = self.carrier_locations[raw_index];
        let coeff = &mut self.blocks[block_index].coeffs[coeff_index];
        *coeff = (*coeff & !1) | i16::from(value & 1);
        self.carrier_values[raw_index] = value;
    }

    fn encode(&self) -> Result<Vec<u8>, StegError> {
        // Re-decode the original to recover the decompression parameters
        // (quantization tables, sampling factors, marker data) needed to
        // drive a faithful `jpeg_write_coefficients` pass, then splice the
        // mutated coefficient values back in before writing.
        unsafe {
            let mut src_err: jpeg_error_mgr = std::mem::zeroed();
            let mut srcinfo: jpeg_decompress_struct = std::mem::zeroed();
            srcinfo.common.err = jpeg_std_error(&mut src_err);
            jpeg_create_decompress(&mut srcinfo);
            jpeg_mem_src(&mut srcinfo, self.original.as_ptr(), self.original.len() as u64);
            jpeg_save_markers(&mut srcinfo, JPEG_COM as c_int, 0xFFFF);
            for app_marker in 0..=15 {
                jpeg_save_markers(&mut srcinfo, (JPEG_APP0 + app_marker) as c_int, 0xFFFF);
            }
            if jpeg_read_header(&mut srcinfo, true as boolean) != JPEG_HEADER_OK as c_int {
                jpeg_destroy_decompress(&mut srcinfo);
                return Err(StegError::CodecFail("invalid JPEG header on re-encode".into()));
            }
            let coef_arrays = jpeg_read_coefficients(&mut srcinfo);
            if coef_arrays.is_null() {
                jpeg_destroy_decompress(&mut srcinfo);
                return Err(StegError::CodecFail("no DCT coefficients on re-encode".into()));
            }

            let mut block_index = 0usize;
            for component in 0..srcinfo.num_components as usize {
                let compptr = *srcinfo.comp_info.add(component);
                let comp_array = *coef_arrays.add(component);
                let blocks_per_column = compptr.height_in_blocks as usize;
                let blocks_per_row = compptr.width_in_blocks as usize;

                for row in 0..blocks_per_column {
                    let row_ptr = (*(*srcinfo.mem).access_virt_barray.unwrap())(
                        &mut srcinfo.common,
                        comp_array,
                        row as u32,
                        1,
                        true as boolean,
                    );
                    for col in 0..blocks_per_row {
                        let block_ptr = *row_ptr.add(col);
                        let coeffs = &self.blocks[block_index].coeffs;
                        ptr::copy_nonoverlapping(coeffs.as_ptr(), block_ptr, DCTSIZE2);
                        block_index += 1;
                    }
                }
            }

            let mut dst_err: jpeg_error_mgr = std::mem::zeroed();
            let mut dstinfo: jpeg_compress_struct = std::mem::zeroed();
            dstinfo.common.err = jpeg_std_error(&mut dst_err);
            jpeg_create_compress(&mut dstinfo);

            let mut out_buf: *mut u8 = ptr::null_mut();
            let mut out_len: u64 = 0;
            jpeg_mem_dest(&mut dstinfo, &mut out_buf, &mut out_len);

            jpeg_copy_critical_parameters(&srcinfo, &mut dstinfo);
            dstinfo.optimize_coding = true as boolean;
            // jpeg_set_defaults() (called within jpeg_copy_critical_parameters)
            // unconditionally arms a fresh JFIF/Adobe marker; only emit one if
            // the source actually carried it, since the saved marker_list below
            // forwards the original verbatim and would otherwise duplicate it.
            dstinfo.write_JFIF_header = srcinfo.saw_JFIF_marker;
            dstinfo.write_Adobe_marker = srcinfo.saw_Adobe_marker;

            jpeg_write_coefficients(&mut dstinfo, coef_arrays);

            let mut marker = srcinfo.marker_list;
            while !marker.is_null() {
                let m = &*marker;
                jpeg_write_marker(&mut dstinfo, c_int::from(m.marker), m.data, m.data_length);
                marker = m.next;
            }

            jpeg_finish_compress(&mut dstinfo);

            let result = std::slice::from_raw_parts(out_buf, out_len as usize).to_vec();

            jpeg_destroy_compress(&mut dstinfo);
            jpeg_destroy_decompress(&mut srcinfo);
            libc::free(out_buf.cast());

            Ok(result)
        }
    }
}
