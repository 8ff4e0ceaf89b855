use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use snapdiff_diff::{
    diff_snapshots, diff_snapshots_concurrent, render_stat, render_unified, DiffEntry, DiffOptions, DiffStats,
    Snapshot, SnapshotDiff,
};
use snapdiff_snapshot::{scan_workdir, ScanOptions, SnapshotBuilder};
use snapdiff_store::InMemoryBlobStore;
use tracing::info;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let config = CliConfig::load(config.as_deref())?;
    match command {
        Command::Demo(args) => cmd_demo(args, &config, format).await,
        Command::Dirs(args) => cmd_dirs(args, &config, format).await,
    }
}

async fn cmd_demo(args: DemoArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let dir = tempfile::Builder::new()
        .prefix("snapdiff-demo-")
        .tempdir()
        .context("creating scratch directory")?;
    let (committed, working) = demo_snapshots(dir.path())?;

    let diff = run_diff(&committed, &working, &args.diff, config).await?;
    print_report(&diff, &args.diff, config, format)?;

    if args.keep {
        let kept = dir.keep();
        eprintln!("{} kept {}", "✓".green(), kept.display().to_string().bold());
    }
    Ok(())
}

/// Build the demo repository under `root` and return the committed tree and
/// the edited working tree.
fn demo_snapshots(root: &Path) -> anyhow::Result<(Snapshot, Snapshot)> {
    info!(root = %root.display(), "creating demo repository");
    fs::write(root.join("file1.txt"), "Original content\nfor file1\n")?;
    fs::write(root.join("file2.txt"), "Original content\nfor file2\n")?;

    let scanned = scan_workdir(root, &ScanOptions::default())?;
    let store = Arc::new(InMemoryBlobStore::new());
    let committed = SnapshotBuilder::from_snapshot(store, &scanned)?.build()?;
    info!(entries = committed.len(), "committed");

    fs::write(root.join("file1.txt"), "Modified content\nfor file1\nwith new line\n")?;
    fs::write(root.join("file3.txt"), "New file content\n")?;
    fs::remove_file(root.join("file2.txt"))?;

    let working = scan_workdir(root, &ScanOptions::default())?;
    Ok((committed, working))
}

async fn cmd_dirs(args: DirsArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    for dir in [&args.old, &args.new] {
        anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
    }
    let old = scan_workdir(&args.old, &ScanOptions::default())
        .with_context(|| format!("scanning {}", args.old.display()))?;
    let new = scan_workdir(&args.new, &ScanOptions::default())
        .with_context(|| format!("scanning {}", args.new.display()))?;

    let diff = run_diff(&old, &new, &args.diff, config).await?;
    print_report(&diff, &args.diff, config, format)
}

async fn run_diff(
    old: &Snapshot,
    new: &Snapshot,
    flags: &DiffFlags,
    config: &CliConfig,
) -> anyhow::Result<SnapshotDiff> {
    let options: DiffOptions = config.diff_options(flags);
    let diff = match flags.jobs {
        Some(jobs) if jobs > 1 => diff_snapshots_concurrent(old, new, &options, jobs).await?,
        _ => diff_snapshots(old, new, &options)?,
    };
    Ok(diff)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    stats: DiffStats,
    entries: &'a [DiffEntry],
}

fn print_report(diff: &SnapshotDiff, flags: &DiffFlags, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                stats: diff.stats(),
                entries: &diff.entries,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if !config.use_color(flags) {
                colored::control::set_override(false);
            }
            if diff.is_empty() {
                println!("No changes.");
            } else if flags.stat {
                print!("{}", render_stat(diff));
            } else {
                let mut in_header = false;
                for line in render_unified(diff).lines() {
                    let style = classify_line(line, &mut in_header);
                    println!("{}", paint(line, style));
                }
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineStyle {
    FileHeader,
    HunkHeader,
    Insert,
    Delete,
    Issue,
    Plain,
}

/// Pick a style for one rendered line. File header lines run from
/// `diff --git` to the first hunk header.
fn classify_line(line: &str, in_header: &mut bool) -> LineStyle {
    if line.starts_with("diff --git ") {
        *in_header = true;
        return LineStyle::FileHeader;
    }
    if line.starts_with("@@ ") {
        *in_header = false;
        return LineStyle::HunkHeader;
    }
    if *in_header {
        return if line.starts_with("# ") {
            LineStyle::Issue
        } else {
            LineStyle::FileHeader
        };
    }
    match line.as_bytes().first() {
        Some(b'+') => LineStyle::Insert,
        Some(b'-') => LineStyle::Delete,
        _ => LineStyle::Plain,
    }
}

fn paint(line: &str, style: LineStyle) -> ColoredString {
    match style {
        LineStyle::FileHeader => line.bold(),
        LineStyle::HunkHeader => line.cyan(),
        LineStyle::Insert => line.green(),
        LineStyle::Delete => line.red(),
        LineStyle::Issue => line.yellow(),
        LineStyle::Plain => line.normal(),
    }
}

#[cfg(test)]
mod tests {
    use snapdiff_diff::ChangeKind;

    use super::*;

    #[test]
    fn demo_reports_edit_add_delete() {
        let dir = tempfile::tempdir().unwrap();
        let (committed, working) = demo_snapshots(dir.path()).unwrap();
        let diff = diff_snapshots(&committed, &working, &DiffOptions::default()).unwrap();

        let kinds: Vec<_> = diff.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("file1.txt", ChangeKind::Modified),
                ("file2.txt", ChangeKind::Deleted),
                ("file3.txt", ChangeKind::Added),
            ]
        );
        assert!(diff.degraded().next().is_none());
    }

    #[tokio::test]
    async fn jobs_flag_uses_same_report() {
        let dir = tempfile::tempdir().unwrap();
        let (committed, working) = demo_snapshots(dir.path()).unwrap();
        let config = CliConfig::default();

        let sequential = run_diff(&committed, &working, &DiffFlags::default(), &config).await.unwrap();
        let flags = DiffFlags {
            jobs: Some(3),
            ..DiffFlags::default()
        };
        let concurrent = run_diff(&committed, &working, &flags, &config).await.unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[test]
    fn classify_tracks_file_headers() {
        let mut in_header = false;
        let lines = [
            ("diff --git a/f b/f", LineStyle::FileHeader),
            ("index 0000000..1234567", LineStyle::FileHeader),
            ("# content unavailable (new side): gone", LineStyle::Issue),
            ("--- /dev/null", LineStyle::FileHeader),
            ("+++ b/f", LineStyle::FileHeader),
            ("@@ -0,0 +1,2 @@", LineStyle::HunkHeader),
            ("+++ added line starting with pluses", LineStyle::Insert),
            ("--- removed line starting with dashes", LineStyle::Delete),
            (" context", LineStyle::Plain),
            ("\\ No newline at end of file", LineStyle::Plain),
        ];
        for (line, expected) in lines {
            assert_eq!(classify_line(line, &mut in_header), expected, "{line}");
        }
    }
}
