//! Drives the end-to-end hide/extract flows over an opened carrier image:
//! advancing `pos` past existing payloads on append, inserting a new one,
//! and sequentially extracting every payload present.

use tracing::{debug, instrument};

use crate::carrier::CarrierImage;
use crate::cipher::cipher::{CipherContext, FRAME_PREFIX_LEN};
use crate::config::NONCE_SIZE;
use crate::error::StegError;
use crate::framer::FileRecord;

/// Re-parse existing frames sequentially (magic + version + length only,
/// never decrypting) to advance `image.pos` past every payload already
/// present, so a subsequent insert appends rather than overwrites. On the
/// first parse failure `pos` is restored to the last good position — a
/// failure here just means "no more frames", not corruption.
#[instrument(skip(image))]
pub fn seek_to_end(image: &mut CarrierImage) -> Result<usize, StegError> {
    let mut count = 0;
    loop {
        let checkpoint = image.pos;
        match peek_frame_len(image) {
            Ok(ciphertext_len) => {
                let total = FRAME_PREFIX_LEN + ciphertext_len;
                if image.read_bits(total).is_err() {
                    image.pos = checkpoint;
                    break;
                }
                count += 1;
                debug!(frame = count, ciphertext_len, "seek_to_end: skipped existing frame");
            }
            Err(err) if err.is_expected_terminator() => {
                image.pos = checkpoint;
                break;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(count)
}

fn peek_frame_len(image: &mut CarrierImage) -> Result<usize, StegError> {
    let checkpoint = image.pos;
    let prefix = image.read_bits(FRAME_PREFIX_LEN)?;
    image.pos = checkpoint;
    Ok(CipherContext::parse_prefix(&prefix)? as usize)
}

/// Seal `record` and write it at the current `pos`.
#[instrument(skip(image, cipher, record))]
pub fn insert(image: &mut CarrierImage, cipher: &CipherContext, record: &FileRecord, uncompressed: bool) -> Result<(), StegError> {
    let plaintext = record.compose(uncompressed)?;
    let frame = cipher.seal(&plaintext)?;
    image.write_bits(&frame)
}

/// Read and decrypt the next payload at the current `pos`, advancing past
/// it. Returns `Err` with an expected terminator when there is nothing
/// left to read.
#[instrument(skip(image, cipher))]
pub fn extract(image: &mut CarrierImage, cipher: &CipherContext) -> Result<FileRecord, StegError> {
    let ciphertext_len = peek_frame_len(image)?;
    let frame = image.read_bits(FRAME_PREFIX_LEN + ciphertext_len)?;
    let body = &frame[FRAME_PREFIX_LEN..];
    if body.len() < NONCE_SIZE {
        return Err(StegError::PayloadOob);
    }
    let plaintext = cipher.open(body)?;
    FileRecord::parse(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::CryptoContext;
    use crate::framer::Timestamp;

    fn record(name: &str, body: &[u8]) -> FileRecord {
        FileRecord {
            access_time: Timestamp { secs: 0, nanos: 0 },
            mod_time: Timestamp { secs: 0, nanos: 0 },
            steg_time: Timestamp { secs: 0, nanos: 0 },
            file_name: name.as_bytes().to_vec(),
            file_bytes: body.to_vec(),
        }
    }

    fn tiny_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for i in 0..pixel_count {
            data.extend_from_slice(&[(i % 251) as u8, (i * 3 % 241) as u8, (i * 7 % 239) as u8, 255]);
        }
        writer.write_image_data(&data).unwrap();
        drop(writer);
        out
    }

    fn open_image(bytes: &[u8], password: &[u8]) -> (CarrierImage, CryptoContext) {
        let mut crypto = CryptoContext::from_password(password).unwrap();
        let image = CarrierImage::open(bytes, &mut crypto.prng).unwrap();
        (image, crypto)
    }

    #[test]
    fn insert_then_extract_roundtrips() {
        let cover = tiny_png_bytes(64, 64);
        let (mut image, crypto) = open_image(&cover, b"hunter2");

        insert(&mut image, &crypto.cipher, &record("a.txt", b"first file"), false).unwrap();
        image.pos = 0;
        let extracted = extract(&mut image, &crypto.cipher).unwrap();
        assert_eq!(extracted.file_name, b"a.txt");
        assert_eq!(extracted.file_bytes, b"first file");
    }

    #[test]
    fn multiple_files_extract_in_insert_order() {
        let cover = tiny_png_bytes(96, 96);
        let (mut image, crypto) = open_image(&cover, b"correct horse");

        insert(&mut image, &crypto.cipher, &record("one.txt", b"one"), false).unwrap();
        insert(&mut image, &crypto.cipher, &record("two.txt", b"two"), false).unwrap();

        image.pos = 0;
        let first = extract(&mut image, &crypto.cipher).unwrap();
        let second = extract(&mut image, &crypto.cipher).unwrap();
        assert_eq!(first.file_name, b"one.txt");
        assert_eq!(second.file_name, b"two.txt");
    }

    #[test]
    fn append_mode_seeks_past_existing_payload() {
        let cover = tiny_png_bytes(96, 96);
        let (mut image, crypto) = open_image(&cover, b"correct horse");

        insert(&mut image, &crypto.cipher, &record("one.txt", b"one"), false).unwrap();
        let pos_after_first = image.pos;

        image.pos = 0;
        let skipped = seek_to_end(&mut image).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(image.pos, pos_after_first);
    }

    #[test]
    fn extract_past_last_payload_is_expected_terminator() {
        let cover = tiny_png_bytes(64, 64);
        let (mut image, crypto) = open_image(&cover, b"hunter2");
        insert(&mut image, &crypto.cipher, &record("a.txt", b"x"), false).unwrap();

        let err = extract(&mut image, &crypto.cipher).unwrap_err();
        assert!(err.is_expected_terminator());
    }

    #[test]
    fn wrong_password_fails_to_decrypt() {
        let cover = tiny_png_bytes(64, 64);
        let (mut image, crypto) = open_image(&cover, b"hunter2");
        insert(&mut image, &crypto.cipher, &record("a.txt", b"x"), false).unwrap();

        let mut other_crypto = CryptoContext::from_password(b"wrong password").unwrap();
        let mut other_image = CarrierImage::open(&cover, &mut other_crypto.prng).unwrap();
        // Different password means a different permutation too, so this is
        // exercising both "wrong key" and "wrong slot order" at once.
        let result = extract(&mut other_image, &other_crypto.cipher);
        assert!(result.is_err());
    }
}
