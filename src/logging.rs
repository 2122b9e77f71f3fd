//! Stderr logger behind the `log` facade.
//!
//! Diagnostics never share a stream with the decoded data: everything
//! here goes to stderr, formatted the way the original tool spoke
//! ("Warning: ...", "Error: ...").

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        match record.level() {
            Level::Error => eprintln!("Error: {}", record.args()),
            Level::Warn => eprintln!("Warning: {}", record.args()),
            Level::Info => eprintln!("{}", record.args()),
            level => eprintln!("[{level}] {}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Installs the stderr logger. Safe to call more than once; later
/// calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
