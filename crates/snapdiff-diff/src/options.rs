use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of bytes inspected when sniffing for binary content.
pub const DEFAULT_SNIFF_LEN: usize = 8000;

/// Unchanged lines kept around each change.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Per-path line budget (old and new lines combined).
pub const DEFAULT_MAX_LINES: usize = 200_000;

/// Configuration for a single diff call.
///
/// Everything that could otherwise be a process-wide default (context size,
/// sniff window, budgets) is carried here explicitly.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Flag entries containing NUL or invalid UTF-8 in the sniff window as
    /// binary and skip line diffing for them.
    pub detect_binary: bool,
    /// Size of the sniff window in bytes.
    pub binary_sniff_len: usize,
    /// Unchanged lines of context on each side of a change.
    pub context_lines: usize,
    /// Per-path line budget; `None` disables it.
    pub max_lines: Option<usize>,
    /// Per-path wall-clock budget for line diffing, in milliseconds.
    pub time_budget_ms: Option<u64>,
    /// Restricts the diff to matching paths.
    #[serde(skip)]
    pub path_filter: Option<PathFilter>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            detect_binary: true,
            binary_sniff_len: DEFAULT_SNIFF_LEN,
            context_lines: DEFAULT_CONTEXT_LINES,
            max_lines: Some(DEFAULT_MAX_LINES),
            time_budget_ms: None,
            path_filter: None,
        }
    }
}

impl DiffOptions {
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn without_binary_detection(mut self) -> Self {
        self.detect_binary = false;
        self
    }

    pub fn with_max_lines(mut self, max: Option<usize>) -> Self {
        self.max_lines = max;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(u64::try_from(budget.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_path_filter(mut self, filter: PathFilter) -> Self {
        self.path_filter = Some(filter);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Returns `true` if `path` passes the filter (or there is none).
    pub fn includes(&self, path: &str) -> bool {
        self.path_filter.as_ref().map_or(true, |f| f.matches(path))
    }
}

impl fmt::Debug for DiffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("detect_binary", &self.detect_binary)
            .field("binary_sniff_len", &self.binary_sniff_len)
            .field("context_lines", &self.context_lines)
            .field("max_lines", &self.max_lines)
            .field("time_budget_ms", &self.time_budget_ms)
            .field("path_filter", &self.path_filter.is_some())
            .finish()
    }
}

/// A predicate over snapshot paths.
#[derive(Clone)]
pub struct PathFilter(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl PathFilter {
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Match paths equal to, or nested under, any of `prefixes`.
    ///
    /// `src` matches `src` and `src/lib.rs` but not `src2/lib.rs`.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.into().trim_end_matches('/').to_string())
            .collect();
        Self::new(move |path| {
            prefixes.iter().any(|prefix| {
                prefix.is_empty()
                    || path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        (self.0)(path)
    }
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathFilter(..)")
    }
}
