//! Wave format descriptor
//!
//! Holds the parameters pulled out of a RIFF WAVE format chunk and the
//! arithmetic derived from them (frame geometry, data size, byte rate).
//! Derived quantities are always computed, never stored.

use thiserror::Error;

/// RIFF encoding id for linear PCM.
pub const PCM_ID: u16 = 0x0001;
/// RIFF encoding id for Platinum ADPCM.
pub const PTADPCM_ID: u16 = 0x8311;

/// Errors raised while parsing or validating a wave stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unrecognized file header: {0}")]
    BadMagic(String),
    #[error("unrecognized file type: {0}")]
    BadType(String),
    #[error("invalid header size: {0}")]
    InvalidHeaderSize(u32),
    #[error("unsupported encoding: {0:#06x}")]
    UnsupportedEncoding(u16),
    #[error("invalid sample depth: {0}")]
    InvalidDepth(u16),
    #[error("invalid channel count: {0}")]
    InvalidChannelCount(u16),
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("invalid frame size: {0}")]
    InvalidFrameSize(u16),
    #[error("data chunk appears before a valid format chunk")]
    MissingFormatChunk,
    #[error("stream ended before the declared data")]
    TruncatedStream,
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for wave parsing and decoding.
pub type WaveResult<T> = Result<T, FormatError>;

/// Audio encoding carried by a wave stream.
///
/// Closed set: ids outside of it fail the conversion rather than
/// producing an unchecked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Pcm,
    PtAdpcm,
}

impl Encoding {
    /// The RIFF format-chunk id for this encoding.
    pub fn id(self) -> u16 {
        match self {
            Encoding::Pcm => PCM_ID,
            Encoding::PtAdpcm => PTADPCM_ID,
        }
    }
}

impl TryFrom<u16> for Encoding {
    type Error = FormatError;

    fn try_from(id: u16) -> WaveResult<Self> {
        match id {
            PCM_ID => Ok(Encoding::Pcm),
            PTADPCM_ID => Ok(Encoding::PtAdpcm),
            other => Err(FormatError::UnsupportedEncoding(other)),
        }
    }
}

/// Format parameters for one wave stream.
///
/// `sample_count` is per channel; `frame_sample_count` is samples per
/// channel per frame (1 for PCM, where every sample stands alone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveInfo {
    pub encoding: Encoding,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub sample_depth: u16,
    pub frame_sample_count: u32,
    pub sample_count: u32,
}

impl WaveInfo {
    /// Descriptor for a 16-bit PCM stream derived from `src`, keeping
    /// the channel layout, rate, and logical sample count.
    pub fn pcm16_from(src: &WaveInfo) -> Self {
        Self {
            encoding: Encoding::Pcm,
            channel_count: src.channel_count,
            sample_rate: src.sample_rate,
            sample_depth: 16,
            frame_sample_count: 1,
            sample_count: src.sample_count,
        }
    }

    /// Bytes per sample for PCM streams.
    fn sample_size(&self) -> u32 {
        debug_assert_eq!(self.encoding, Encoding::Pcm);
        (u32::from(self.sample_depth) - 1) / 8 + 1
    }

    /// Encoded bytes per frame, across all channels.
    ///
    /// Valid only for a descriptor that passed [`WaveInfo::validate`];
    /// the reader checks the frame geometry before deriving anything
    /// from it.
    pub fn frame_size(&self) -> u32 {
        let channels = u32::from(self.channel_count);
        match self.encoding {
            Encoding::Pcm => channels * self.frame_sample_count * self.sample_size(),
            Encoding::PtAdpcm => channels * (5 + (self.frame_sample_count - 2 + 1) / 2),
        }
    }

    /// Number of frames covering `sample_count` samples.
    pub fn frame_count(&self) -> u32 {
        self.sample_count.div_ceil(self.frame_sample_count)
    }

    /// Byte length of the data chunk payload.
    pub fn data_size(&self) -> u64 {
        match self.encoding {
            Encoding::Pcm => {
                u64::from(self.channel_count)
                    * u64::from(self.sample_count)
                    * u64::from(self.sample_size())
            }
            Encoding::PtAdpcm => u64::from(self.frame_count()) * u64::from(self.frame_size()),
        }
    }

    /// Stream duration in seconds.
    pub fn length(&self) -> f64 {
        f64::from(self.sample_count) / f64::from(self.sample_rate)
    }

    /// Average payload bytes per second, rounded.
    pub fn byte_rate(&self) -> u32 {
        if self.sample_count == 0 {
            return 0;
        }
        (self.data_size() as f64 / self.length()).round() as u32
    }

    /// Checks the invariants the decoder relies on.
    pub fn validate(&self) -> WaveResult<()> {
        if self.channel_count == 0 {
            return Err(FormatError::InvalidChannelCount(0));
        }
        if self.sample_rate == 0 {
            return Err(FormatError::InvalidSampleRate(0));
        }
        match self.encoding {
            Encoding::Pcm => Ok(()),
            Encoding::PtAdpcm => {
                if self.sample_depth != 4 && self.sample_depth != 16 {
                    return Err(FormatError::InvalidDepth(self.sample_depth));
                }
                if self.frame_sample_count <= 2 {
                    return Err(FormatError::InvalidFrameSize(self.frame_sample_count as u16));
                }
                Ok(())
            }
        }
    }

    /// Derives the per-channel sample count from the data chunk size.
    ///
    /// Returns `false` when `size` is not an exact multiple of the
    /// frame size; the caller decides whether that deserves a warning.
    pub fn set_data_size(&mut self, size: u32) -> bool {
        let fs = self.frame_size();
        self.sample_count = (size / fs) * self.frame_sample_count;
        size % fs == 0
    }
}
