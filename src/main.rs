mod cli;

use std::process;

use log::{error, info};

use ptadpcm::convert::{convert, ConvertOptions};
use ptadpcm::logging;

use cli::Cli;

fn main() {
    let cli = Cli::parse_or_exit();
    logging::init(cli.log_level());
    info!("Platinum ADPCM Inflator");

    let options = ConvertOptions {
        history_mode: cli.history_mode(),
    };
    if let Err(err) = convert(&cli.input, &cli.output, &options) {
        error!("{err}");
        process::exit(err.exit_code());
    }
}
