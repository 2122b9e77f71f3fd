//! Platinum ADPCM decoder
//!
//! Each frame carries, per channel, two verbatim 16-bit seed samples,
//! one adaptive step index, and packed 4-bit deltas for the remaining
//! samples. A sample is predicted by linear extrapolation from the two
//! previous samples plus a table step selected by the current index;
//! the index walks up or down with the delta magnitude so the step
//! size tracks the signal.
//!
//! Predictor state never crosses a frame or channel boundary: every
//! frame re-seeds it from its own header.

use std::io::{Read, Write};

use log::warn;

use super::info::{FormatError, WaveInfo, WaveResult};

/// Number of valid adaptive step indices.
const STEP_INDEX_COUNT: usize = 12;
const MAX_STEP_INDEX: usize = STEP_INDEX_COUNT - 1;

/// Base step deltas, one per nibble value.
const STEP_DELTAS: [i32; 16] = [
    -28, -20, -14, -10, -7, -5, -3, -1, 1, 3, 5, 7, 10, 14, 20, 28,
];

/// Step-index adjustment, one per nibble value.
const INDEX_DELTAS: [i32; 16] = [2, 2, 1, 1, 0, 0, 0, -1, -1, 0, 0, 0, 1, 1, 2, 2];

/// `STEP_TABLE[idx][nibble] = (STEP_DELTAS[nibble] << idx) / 2`,
/// division truncating toward zero.
const STEP_TABLE: [[i32; 16]; STEP_INDEX_COUNT] = build_step_table();

const fn build_step_table() -> [[i32; 16]; STEP_INDEX_COUNT] {
    let mut table = [[0i32; 16]; STEP_INDEX_COUNT];
    let mut idx = 0;
    while idx < STEP_INDEX_COUNT {
        let mut nibble = 0;
        while nibble < 16 {
            table[idx][nibble] = (STEP_DELTAS[nibble] << idx) / 2;
            nibble += 1;
        }
        idx += 1;
    }
    table
}

/// How decoded samples feed back into the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Keep full-precision history; clamp only on output.
    #[default]
    Full,
    /// Clamp every sample to 16 bits before it becomes history,
    /// matching the legacy reference decoder.
    Clamped,
}

/// Counters from one decode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub frames: u32,
    /// Decoded samples per channel.
    pub samples: u64,
    /// Samples whose predicted level fell outside the 16-bit range.
    pub clipped: u64,
}

/// Streaming Platinum ADPCM decoder.
pub struct Decoder {
    history_mode: HistoryMode,
    clip_warned: bool,
}

impl Decoder {
    pub fn new(history_mode: HistoryMode) -> Self {
        Self {
            history_mode,
            clip_warned: false,
        }
    }

    /// Decodes `info.frame_count()` frames from `input`, writing
    /// interleaved 16-bit little-endian PCM to `output`.
    ///
    /// Sample content never fails the decode; the only error is the
    /// input running dry mid-frame, or plain I/O failure.
    pub fn decode_stream<R: Read, W: Write>(
        &mut self,
        info: &WaveInfo,
        input: &mut R,
        output: &mut W,
    ) -> WaveResult<DecodeStats> {
        let channels = usize::from(info.channel_count);
        let samples_per_frame = info.frame_sample_count as usize;
        debug_assert!(samples_per_frame >= 2, "frame carries two seed samples");
        // Per-channel payload: 2 seed samples + index byte + nibbles.
        let nibble_bytes = (info.frame_size() / u32::from(info.channel_count)) as usize - 5;

        let mut stats = DecodeStats::default();
        let mut history = vec![vec![0i64; samples_per_frame]; channels];
        let mut packed = vec![0u8; nibble_bytes];
        let mut pcm = Vec::with_capacity(samples_per_frame * channels * 2);

        for _ in 0..info.frame_count() {
            for samples in history.iter_mut() {
                samples[0] = i64::from(read_i16_le(input)?);
                samples[1] = i64::from(read_i16_le(input)?);
                let mut idx = usize::from(read_u8(input)?).min(MAX_STEP_INDEX);
                read_exact(input, &mut packed)?;

                for k in 2..samples_per_frame {
                    let nibble = usize::from((packed[(k - 2) / 2] >> (k % 2 * 4)) & 0xF);
                    // Full-precision history is unbounded, so the
                    // arithmetic saturates instead of wrapping.
                    let level = samples[k - 1]
                        .saturating_mul(2)
                        .saturating_sub(samples[k - 2])
                        .saturating_add(i64::from(STEP_TABLE[idx][nibble]));
                    if !(-0x8000..=0x7FFF).contains(&level) {
                        self.note_clip(&mut stats);
                    }
                    samples[k] = match self.history_mode {
                        HistoryMode::Full => level,
                        HistoryMode::Clamped => level.clamp(-0x8000, 0x7FFF),
                    };
                    idx = (idx as i32 + INDEX_DELTAS[nibble]).clamp(0, MAX_STEP_INDEX as i32)
                        as usize;
                }
            }

            pcm.clear();
            for j in 0..samples_per_frame {
                for samples in history.iter() {
                    let sample = samples[j].clamp(-0x8000, 0x7FFF) as i16;
                    pcm.extend_from_slice(&sample.to_le_bytes());
                }
            }
            output
                .write_all(&pcm)
                .map_err(|e| FormatError::Io(e.to_string()))?;

            stats.frames += 1;
            stats.samples += samples_per_frame as u64;
        }

        Ok(stats)
    }

    fn note_clip(&mut self, stats: &mut DecodeStats) {
        stats.clipped += 1;
        if !self.clip_warned {
            self.clip_warned = true;
            warn!("Decoded samples exceed the 16-bit range and will be clipped.");
        }
    }
}

fn read_exact<R: Read>(input: &mut R, buf: &mut [u8]) -> WaveResult<()> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => FormatError::TruncatedStream,
        _ => FormatError::Io(e.to_string()),
    })
}

fn read_u8<R: Read>(input: &mut R) -> WaveResult<u8> {
    let mut buf = [0u8; 1];
    read_exact(input, &mut buf)?;
    Ok(buf[0])
}

fn read_i16_le<R: Read>(input: &mut R) -> WaveResult<i16> {
    let mut buf = [0u8; 2];
    read_exact(input, &mut buf)?;
    Ok(i16::from_le_bytes(buf))
}
