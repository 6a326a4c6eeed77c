//! Common type definitions shared across the crate.

use std::fmt;

/// Which image codec a cover image was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Jpeg,
    Png,
    Webp,
}

impl Codec {
    pub const ALL: [Codec; 3] = [Codec::Jpeg, Codec::Png, Codec::Webp];

    pub fn label(&self) -> &'static str {
        match self {
            Codec::Jpeg => "JPEG",
            Codec::Png => "PNG",
            Codec::Webp => "WebP",
        }
    }

    /// Detect a codec from the first bytes of a file. Returns `None` when
    /// none of the known magic sequences match.
    pub fn sniff(bytes: &[u8]) -> Option<Codec> {
        if bytes.len() >= 3 && bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF {
            return Some(Codec::Jpeg);
        }
        if bytes.len() >= 8 && bytes[0..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(Codec::Png);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Codec::Webp);
        }
        None
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the engine is being asked to do with a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Hide,
    Extract,
    Check,
}

impl OperationMode {
    pub fn label(&self) -> &'static str {
        match self {
            OperationMode::Hide => "hide",
            OperationMode::Extract => "extract",
            OperationMode::Check => "check",
        }
    }
}

/// Metadata recovered from one extracted (or checked) payload, surfaced to
/// the UI layer without needing to re-derive it from the raw record.
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub access_time: (i64, i64),
    pub mod_time: (i64, i64),
    pub steg_time: (i64, i64),
}
