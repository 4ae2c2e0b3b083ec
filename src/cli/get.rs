//! Get subcommand for layered-config CLI
//!
//! Prints one value addressed by a dotted key such as `model.weights_path`.
//! String values are printed bare so the output can be used in scripts.

use crate::config::ConfigStore;
use crate::format::{OutputFormat, render_tree};
use crate::tree::ConfigTree;
use clap::Args;

/// Arguments for the get subcommand
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Dotted key, starting with the section name
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Output format for non-string values: yaml (default) or json
    #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// Render the value at `args.key`.
pub fn run_get(store: &ConfigStore, args: &GetArgs) -> anyhow::Result<String> {
    match store.get_path(&args.key)? {
        ConfigTree::String(s) => Ok(format!("{}\n", s)),
        other => render_tree(&other, args.format),
    }
}
