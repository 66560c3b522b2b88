use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Output layout
// ---------------------------------------------------------------------------

pub const BANNER: &str = "Bidhan Software's: A step towards modern age";

pub const OUTPUT_DIR_NAME: &str = "Data_Analysis_Results";
pub const SUMMARY_FILE: &str = "summary_statistics.csv";
pub const MISSING_FILE: &str = "missing_data_report.csv";
pub const CORRELATION_FILE: &str = "correlation_matrix.csv";
pub const HEATMAP_FILE: &str = "correlation_heatmap.png";
pub const LOG_FILE: &str = "eda_log.txt";

pub const HISTOGRAM_PREFIX: &str = "hist_";
pub const BOXPLOT_PREFIX: &str = "box_";

/// `<input parent>/Data_Analysis_Results`.
pub fn output_dir_for(input: &Path) -> PathBuf {
    let parent = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    parent.join(OUTPUT_DIR_NAME)
}

/// `<prefix><stem>.png`
pub fn plot_file_name(prefix: &str, stem: &str) -> String {
    format!("{prefix}{stem}.png")
}

// ---------------------------------------------------------------------------
// File stems derived from column names
// ---------------------------------------------------------------------------

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned
    }
}

/// One file stem per name, in order. Names that sanitise to the same stem get
/// `_2`, `_3`, ... so no two columns share an artifact file.
pub fn artifact_stems<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    names
        .iter()
        .map(|name| {
            let base = sanitize(name.as_ref());
            let mut stem = base.clone();
            let mut k = 2;
            while !taken.insert(stem.to_ascii_lowercase()) {
                stem = format!("{base}_{k}");
                k += 1;
            }
            stem
        })
        .collect()
}

/// Delete `hist_*.png` / `box_*.png` left over from an earlier run.
///
/// Returns how many files were removed. Files that cannot be removed are
/// logged and skipped; they will be overwritten if still produced.
pub fn remove_stale_plots(out_dir: &Path) -> Result<usize> {
    let entries = fs::read_dir(out_dir)
        .with_context(|| format!("listing {}", out_dir.display()))?;
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_plot = (name.starts_with(HISTOGRAM_PREFIX) || name.starts_with(BOXPLOT_PREFIX))
            && name.ends_with(".png");
        if !is_plot || !entry.path().is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                log::debug!("Removed stale plot {name}");
                removed += 1;
            }
            Err(e) => log::warn!("Could not remove stale plot {name}: {e}"),
        }
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// Write `eda_log.txt`: banner, completion time, input and output paths.
pub fn write_log(out_dir: &Path, input: &Path) -> Result<PathBuf> {
    let path = out_dir.join(LOG_FILE);
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
    let contents = format!(
        "{BANNER}\nData Analysis completed on {timestamp}\nInput file: {}\nOutput directory: {}\n",
        input.display(),
        out_dir.display()
    );
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
