//! Show subcommand for layered-config CLI
//!
//! Prints the whole merged configuration, one section, or one section with
//! the `general` keys laid over it.

use crate::config::ConfigStore;
use crate::format::{OutputFormat, render_tree};
use clap::Args;

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Section to print (default: everything)
    #[arg(value_name = "SECTION")]
    pub section: Option<String>,

    /// Overlay the `general` section onto SECTION
    #[arg(long, requires = "section")]
    pub merged: bool,

    /// Output format: yaml (default) or json
    #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// Render the requested part of the configuration.
pub fn run_show(store: &ConfigStore, args: &ShowArgs) -> anyhow::Result<String> {
    let tree = match (&args.section, args.merged) {
        (Some(name), true) => store.get_merged_section(name)?,
        (Some(name), false) => store.get(name)?,
        (None, _) => store.snapshot().to_tree(),
    };
    render_tree(&tree, args.format)
}
