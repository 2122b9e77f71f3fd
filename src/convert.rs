//! Conversion orchestrator
//!
//! Sequences reader, decoder, and writer over real files: parse the
//! input header, lock the output, emit the PCM header, then stream
//! frames through the decoder. The output lock lives inside this call
//! and is released on every exit path when the file handle drops.

use std::fs::{File, TryLockError};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::wave::{self, DecodeStats, Decoder, FormatError, HistoryMode, WaveInfo};

/// Fatal conversion failures, each with its own process exit code.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("writing to source file")]
    SameFile,
    #[error("file does not exist: {0}")]
    InputNotFound(String),
    #[error("cannot open output file: {0}")]
    OutputUnwritable(String),
    #[error("output file is already in use: {0}")]
    AlreadyLocked(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    /// Process exit code for this failure. Distinct per error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Format(FormatError::UnsupportedEncoding(_)) => 1,
            ConvertError::InputNotFound(_) => 2,
            ConvertError::OutputUnwritable(_) => 3,
            ConvertError::AlreadyLocked(_) => 4,
            ConvertError::SameFile => 5,
            ConvertError::Format(FormatError::TruncatedStream) => 65,
            ConvertError::Format(FormatError::Io(_)) | ConvertError::Io(_) => 74,
            ConvertError::Format(_) => 64,
        }
    }
}

/// Tunables threaded through a conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub history_mode: HistoryMode,
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub seconds: f64,
    pub channel_count: u16,
    pub sample_rate: u32,
    /// Output payload bytes per second.
    pub byte_rate: u32,
    pub stats: DecodeStats,
}

impl Report {
    pub fn bit_rate_kbps(&self) -> u32 {
        self.byte_rate * 8 / 1000
    }
}

/// Converts a Platinum ADPCM wave file into 16-bit PCM.
pub fn convert(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Report, ConvertError> {
    // Checked before any output I/O happens.
    if input == output {
        return Err(ConvertError::SameFile);
    }

    let in_file = File::open(input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConvertError::InputNotFound(input.display().to_string()),
        _ => ConvertError::Io(e),
    })?;
    let total_len = in_file.metadata()?.len();
    let mut reader = BufReader::new(in_file);

    info!("Preparing header...");
    let in_info = wave::read_header(&mut reader, total_len)?;

    let out_file = File::create(output).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            ConvertError::OutputUnwritable(output.display().to_string())
        }
        _ => ConvertError::Io(e),
    })?;
    // Advisory whole-file lock, held until the handle drops below.
    out_file.try_lock().map_err(|e| match e {
        TryLockError::WouldBlock => ConvertError::AlreadyLocked(output.display().to_string()),
        TryLockError::Error(e) => ConvertError::Io(e),
    })?;
    let mut writer = BufWriter::new(out_file);

    let out_info = WaveInfo::pcm16_from(&in_info);
    wave::write_header(&mut writer, &out_info)?;

    info!("Decoding data...");
    let mut decoder = Decoder::new(options.history_mode);
    let stats = decoder.decode_stream(&in_info, &mut reader, &mut writer)?;
    writer.flush()?;

    let report = Report {
        seconds: out_info.length(),
        channel_count: out_info.channel_count,
        sample_rate: out_info.sample_rate,
        byte_rate: out_info.byte_rate(),
        stats,
    };
    info!("Inflation complete.");
    info!(
        "Output length: {:.3}s, {}ch, {}Hz, {}kbps",
        report.seconds,
        report.channel_count,
        report.sample_rate,
        report.bit_rate_kbps()
    );
    Ok(report)
}
