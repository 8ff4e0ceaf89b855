use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use snapdiff_diff::{DiffOptions, PathFilter};

use crate::cli::DiffFlags;

/// Settings loaded from `--config`, before command-line overrides.
///
/// ```toml
/// color = false
///
/// [diff]
/// context_lines = 5
/// max_lines = 50000
/// time_budget_ms = 2000
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub diff: DiffOptions,
    /// Colour text output.
    pub color: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            diff: DiffOptions::default(),
            color: true,
        }
    }
}

impl CliConfig {
    /// Load from `path`, or return the defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Diff options with `flags` applied on top of the file settings.
    pub fn diff_options(&self, flags: &DiffFlags) -> DiffOptions {
        let mut options = self.diff.clone();
        if let Some(context) = flags.context {
            options = options.with_context_lines(context);
        }
        if flags.no_binary_detect {
            options = options.without_binary_detection();
        }
        if !flags.paths.is_empty() {
            options = options.with_path_filter(PathFilter::prefixes(flags.paths.iter().cloned()));
        }
        options
    }

    pub fn use_color(&self, flags: &DiffFlags) -> bool {
        self.color && !flags.no_color
    }
}
