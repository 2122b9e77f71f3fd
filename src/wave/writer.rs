//! RIFF container writer
//!
//! Emits the fixed 44-byte header for a 16-bit PCM stream; the caller
//! streams the decoded payload straight after it.

use std::io::{self, Write};

use super::info::WaveInfo;
use super::{DATA_TAG, FMT_TAG, RIFF_TAG, WAVE_TAG};

/// Size of the emitted format chunk payload.
const FMT_CHUNK_SIZE: u32 = 16;

/// Writes the RIFF/WAVE header described by `info`.
///
/// `info` must be a PCM descriptor; the data chunk size and byte rate
/// are derived from it.
pub fn write_header<W: Write>(writer: &mut W, info: &WaveInfo) -> io::Result<()> {
    debug_assert_eq!(info.encoding, super::Encoding::Pcm);
    let data_size = info.data_size() as u32;

    writer.write_all(&RIFF_TAG)?;
    writer.write_all(&(4 + (8 + FMT_CHUNK_SIZE) + 8 + data_size).to_le_bytes())?;
    writer.write_all(&WAVE_TAG)?;

    writer.write_all(&FMT_TAG)?;
    writer.write_all(&FMT_CHUNK_SIZE.to_le_bytes())?;
    writer.write_all(&info.encoding.id().to_le_bytes())?;
    writer.write_all(&info.channel_count.to_le_bytes())?;
    writer.write_all(&info.sample_rate.to_le_bytes())?;
    writer.write_all(&info.byte_rate().to_le_bytes())?;
    writer.write_all(&(info.frame_size() as u16).to_le_bytes())?;
    writer.write_all(&info.sample_depth.to_le_bytes())?;

    writer.write_all(&DATA_TAG)?;
    writer.write_all(&data_size.to_le_bytes())?;
    Ok(())
}
