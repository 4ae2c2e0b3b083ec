//! CLI command definitions for layered-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod get;
pub mod show;

use crate::config::ConfigSources;
use clap::{Parser, Subcommand};
use get::GetArgs;
use show::ShowArgs;
use std::path::PathBuf;

/// Inspect and validate layered YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Default (schema) source [env: LAYERED_CONFIG_DEFAULT_PATH]
    #[arg(long, global = true, value_name = "FILE")]
    pub default_config: Option<PathBuf>,

    /// User override source [env: LAYERED_CONFIG_USER_PATH]
    #[arg(long, global = true, value_name = "FILE")]
    pub user_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Source paths from flags, falling back to the environment and defaults.
    pub fn sources(&self) -> ConfigSources {
        let discovered = ConfigSources::discover();
        ConfigSources::new(
            self.default_config
                .clone()
                .unwrap_or(discovered.default_source),
            self.user_config.clone().unwrap_or(discovered.user_source),
        )
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate the configuration (default if no subcommand given)
    Check,

    /// Print the merged configuration or one section
    Show(ShowArgs),

    /// Print a single value by dotted key
    Get(GetArgs),
}
