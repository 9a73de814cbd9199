mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, menu, scan};
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);
    let cfg = commands.to_config();

    let target: Commands = match commands.command {
        Some(target) => target,
        None => match menu::prompt() {
            Ok(target) => target,
            Err(e) => {
                error!("{e:#}");
                return ExitCode::FAILURE;
            }
        },
    };

    match scan::scan(target, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print::fat_separator();
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
