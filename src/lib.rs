mod commands;
pub mod error;
pub mod i18n;
mod logging;
pub mod models;
pub mod render;
pub mod services;

use clap::Parser;

use commands::Cli;
use error::PortalError;

pub fn run() -> Result<(), PortalError> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli))
}
