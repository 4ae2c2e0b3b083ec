//! Output formatting for issue reports and tree dumps.

use crate::error::ConfigIssue;
use crate::tree::ConfigTree;
use std::path::Path;

/// Separator between segments of an issue location.
pub const DELIMITER: &str = "->";

const BOLD: &str = "\u{1b}[1m";
const END_BOLD: &str = "\u{1b}[0m";

/// Wrap `s` in ANSI bold escapes.
pub fn bold(s: &str) -> String {
    format!("{}{}{}", BOLD, s, END_BOLD)
}

/// Bold rendering of a file path.
pub fn bold_path(path: &Path) -> String {
    bold(&path.display().to_string())
}

/// Extend an issue location with one more key.
pub fn join_label(label: &str, key: &str) -> String {
    format!("{} {} {}", label, DELIMITER, key)
}

/// Build the consolidated report shown when validation fails.
pub fn format_issue_report(
    default_source: &Path,
    user_source: &Path,
    issues: &[ConfigIssue],
) -> String {
    let mut report = String::from("Problem(s) with configs:\n");
    for issue in issues {
        report.push_str(&issue.to_string());
        report.push('\n');
    }
    report.push_str(&format!(
        "\nCheck and correct your {} and {}!",
        bold_path(default_source),
        bold_path(user_source)
    ));
    report
}

/// Output format for tree dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: yaml, json",
                s
            )),
        }
    }
}

/// Render a tree in the requested format.
pub fn render_tree(tree: &ConfigTree, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(tree)?,
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(tree)?;
            out.push('\n');
            out
        }
    })
}
