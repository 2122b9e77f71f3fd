//! RIFF WAVE handling: format descriptor, chunk reader/writer, and the
//! Platinum ADPCM frame decoder.

pub mod adpcm;
pub mod info;
pub mod reader;
pub mod writer;

pub use adpcm::{DecodeStats, Decoder, HistoryMode};
pub use info::{Encoding, FormatError, WaveInfo, WaveResult};
pub use reader::read_header;
pub use writer::write_header;

/// Container magic tag.
pub const RIFF_TAG: [u8; 4] = *b"RIFF";
/// Audio file type tag.
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
/// Format chunk tag.
pub const FMT_TAG: [u8; 4] = *b"fmt ";
/// Data chunk tag.
pub const DATA_TAG: [u8; 4] = *b"data";
/// Padding chunk tag, skipped without complaint.
pub const JUNK_TAG: [u8; 4] = *b"JUNK";
