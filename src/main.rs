use wporg_asset_cdn::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    if let Err(err) = logging::init_logging() {
        eprintln!("wporg-asset-cdn: {err:#}");
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("wporg-asset-cdn error: {:#}", err);
        std::process::exit(1);
    }
}
