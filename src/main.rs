//! layered-config CLI
//!
//! Loads the default and user YAML sources, validates the override against
//! the defaults and prints the resolved configuration.

use anyhow::Result;
use clap::Parser;
use layered_config::cli::get::run_get;
use layered_config::cli::show::run_show;
use layered_config::cli::{Cli, Command};
use layered_config::config::ConfigStore;
use layered_config::format::bold_path;
use layered_config::logging::{self, LogTarget};
use tracing::error;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let store = match ConfigStore::open(cli.sources()) {
        Ok(store) => store,
        Err(err) => {
            // Load failures are a graceful abort: report and exit with status 0
            error!(issues = err.issues().len(), "Configuration could not be loaded");
            eprintln!("{}", err);
            std::process::exit(0);
        }
    };

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            println!(
                "Configuration OK: {} sections from {} and {}",
                store.section_names().len(),
                bold_path(store.default_source()),
                bold_path(store.user_source())
            );
        }
        Command::Show(args) => {
            print!("{}", run_show(&store, &args)?);
        }
        Command::Get(args) => {
            print!("{}", run_get(&store, &args)?);
        }
    }

    Ok(())
}
