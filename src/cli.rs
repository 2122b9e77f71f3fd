use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use log::LevelFilter;

use ptadpcm::wave::HistoryMode;

/// Exit code for a bad command line, kept off the codes the
/// conversion errors use.
const USAGE_EXIT_CODE: i32 = 22;

/// Platinum ADPCM Inflator - decodes Platinum ADPCM game audio to
/// 16-bit PCM WAV
#[derive(Parser, Debug)]
#[command(name = "ptadpcm")]
#[command(version)]
#[command(about = "Decode a Platinum ADPCM WAV file into 16-bit PCM", long_about = None)]
pub struct Cli {
    /// Input file (Platinum ADPCM WAV)
    pub input: PathBuf,

    /// Output file (16-bit PCM WAV)
    pub output: PathBuf,

    /// Feed clamped samples back into the predictor, matching the
    /// legacy decoder
    #[arg(long)]
    pub clamped_history: bool,

    /// Suppress warnings and progress output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses the command line, exiting the process on failure.
    ///
    /// Wrong arguments exit with code 22 so they stay distinct from
    /// every conversion failure; help and version requests exit 0.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => {
                let code = usage_exit_code(&err);
                let _ = err.print();
                process::exit(code);
            }
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn history_mode(&self) -> HistoryMode {
        if self.clamped_history {
            HistoryMode::Clamped
        } else {
            HistoryMode::Full
        }
    }
}

fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => USAGE_EXIT_CODE,
    }
}
