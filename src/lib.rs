//! Platinum ADPCM inflator
//!
//! Recovers playable 16-bit PCM WAV files from game assets encoded
//! with the proprietary Platinum ADPCM scheme. The library exposes the
//! chunk reader, the frame decoder, the header writer, and the
//! file-to-file conversion that ties them together.

pub mod convert;
pub mod logging;
pub mod wave;

pub use convert::{convert, ConvertError, ConvertOptions, Report};
pub use wave::{Encoding, FormatError, HistoryMode, WaveInfo};
