//! RIFF container reader
//!
//! Streams through the chunk sequence of a wave file, builds a
//! [`WaveInfo`] from the format chunk, and stops at the data chunk so
//! the caller can keep reading encoded frames from the same stream.
//!
//! Structural problems are fatal; bookkeeping mismatches (declared
//! sizes that disagree with reality) are warnings, each class emitted
//! at most once per file.

use std::io::{self, Read};

use log::warn;

use super::info::{Encoding, FormatError, WaveInfo, WaveResult};
use super::{DATA_TAG, FMT_TAG, JUNK_TAG, RIFF_TAG, WAVE_TAG};

/// Parses the header chunks of `reader` and returns the finalized
/// descriptor, leaving the stream positioned at the first data byte.
pub fn read_header<R: Read>(reader: &mut R, total_len: u64) -> WaveResult<WaveInfo> {
    HeaderParser::new(reader, total_len).parse()
}

/// Incremental header parser.
///
/// The descriptor is built while the format chunk is read and
/// finalized exactly once a data chunk appears; a data chunk with no
/// format chunk before it is a hard error, not an uninitialized read.
pub struct HeaderParser<R> {
    reader: R,
    total_len: u64,
    /// Bytes consumed by completed chunks (and the 12-byte preamble).
    pos: u64,
    warned: Warned,
}

/// One flag per warning class, so repeats stay quiet.
#[derive(Debug, Default)]
struct Warned {
    total_size: bool,
    data_size: bool,
    partial_frame: bool,
    extension_size: bool,
    unknown_tag: bool,
}

impl<R: Read> HeaderParser<R> {
    pub fn new(reader: R, total_len: u64) -> Self {
        Self {
            reader,
            total_len,
            pos: 0,
            warned: Warned::default(),
        }
    }

    pub fn parse(&mut self) -> WaveResult<WaveInfo> {
        let magic = self.read_tag()?;
        if magic != RIFF_TAG {
            return Err(FormatError::BadMagic(tag_name(&magic)));
        }
        let declared = self.read_u32()?;
        if u64::from(declared) + 8 != self.total_len && !self.warned.total_size {
            self.warned.total_size = true;
            warn!("File size may be incorrect.");
        }
        let kind = self.read_tag()?;
        if kind != WAVE_TAG {
            return Err(FormatError::BadType(tag_name(&kind)));
        }
        self.pos = 12;

        let mut pending: Option<WaveInfo> = None;
        loop {
            let tag = self.read_tag()?;
            let size = self.read_u32()?;
            match tag {
                FMT_TAG => {
                    pending = Some(self.parse_format_chunk(size)?);
                }
                DATA_TAG => {
                    let mut info = pending.take().ok_or(FormatError::MissingFormatChunk)?;
                    if u64::from(size) + 8 != self.total_len.saturating_sub(self.pos)
                        && !self.warned.data_size
                    {
                        self.warned.data_size = true;
                        warn!("Data size may be incorrect.");
                    }
                    if !info.set_data_size(size) && !self.warned.partial_frame {
                        self.warned.partial_frame = true;
                        warn!("Data may be malformed.");
                    }
                    return Ok(info);
                }
                JUNK_TAG => self.skip(u64::from(size))?,
                other => {
                    if !self.warned.unknown_tag {
                        self.warned.unknown_tag = true;
                        warn!("Unrecognized tag: {}", tag_name(&other));
                    }
                    self.skip(u64::from(size))?;
                }
            }
            self.pos += 8 + u64::from(size);
        }
    }

    fn parse_format_chunk(&mut self, size: u32) -> WaveResult<WaveInfo> {
        if size != 16 && size < 18 {
            return Err(FormatError::InvalidHeaderSize(size));
        }

        let encoding_id = self.read_u16()?;
        let encoding = Encoding::try_from(encoding_id)?;
        if encoding != Encoding::PtAdpcm {
            return Err(FormatError::UnsupportedEncoding(encoding_id));
        }
        let channel_count = self.read_u16()?;
        let sample_rate = self.read_u32()?;
        let _byte_rate = self.read_u32()?;
        let block_align = self.read_u16()?;
        let sample_depth = self.read_u16()?;
        if size >= 18 {
            let ext_size = self.read_u16()?;
            if u32::from(ext_size) != size - 18 && !self.warned.extension_size {
                self.warned.extension_size = true;
                warn!("Extended header size may be incorrect.");
            }
            self.skip(u64::from(size) - 18)?;
        }

        // Checked here, before the divisions below can run.
        if channel_count == 0 {
            return Err(FormatError::InvalidChannelCount(0));
        }
        if block_align % channel_count != 0 || block_align / channel_count <= 5 {
            return Err(FormatError::InvalidFrameSize(block_align));
        }
        let frame_sample_count = 2 + (u32::from(block_align / channel_count) - 5) * 2;

        let info = WaveInfo {
            encoding,
            channel_count,
            sample_rate,
            sample_depth,
            frame_sample_count,
            sample_count: 0,
        };
        info.validate()?;
        Ok(info)
    }

    fn read_tag(&mut self) -> WaveResult<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u16(&mut self) -> WaveResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> WaveResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> WaveResult<()> {
        self.reader.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FormatError::TruncatedStream,
            _ => FormatError::Io(e.to_string()),
        })
    }

    fn skip(&mut self, count: u64) -> WaveResult<()> {
        let skipped = io::copy(&mut self.reader.by_ref().take(count), &mut io::sink())
            .map_err(|e| FormatError::Io(e.to_string()))?;
        if skipped != count {
            return Err(FormatError::TruncatedStream);
        }
        Ok(())
    }
}

fn tag_name(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}
