//! Display recent log entries from the application.

use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{get_log_dir, LOG_FILE_NAME};

pub const DEFAULT_LINES: usize = 50;

/// Shows the last `lines` entries of the most recent log file.
///
/// If no log file exists yet, shows an informative message.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs(lines: usize) -> Result<(), anyhow::Error> {
    let log_dir = get_log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'solatran serve' or other commands to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let all_lines: Vec<&str> = content.lines().collect();
    let tail = tail(&all_lines, lines);

    if tail.len() < all_lines.len() {
        println!("Showing last {} of {} lines:", tail.len(), all_lines.len());
    } else {
        println!("Showing all {} lines:", all_lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in tail {
        println!("{line}");
    }

    Ok(())
}

fn tail<'a, 'b>(lines: &'b [&'a str], count: usize) -> &'b [&'a str] {
    &lines[lines.len().saturating_sub(count)..]
}

/// Finds the most recently modified log file in the directory.
fn find_latest_log(log_dir: &Path) -> Result<Option<PathBuf>, anyhow::Error> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let mut latest_file: Option<(PathBuf, std::time::SystemTime)> = None;

    for entry in entries {
        let entry = entry.map_err(|e| anyhow!("Failed to read directory entry: {e}"))?;
        let path = entry.path();

        if !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_NAME))
        {
            continue;
        }

        let Ok(modified) = fs::metadata(&path).and_then(|metadata| metadata.modified()) else {
            continue;
        };
        if latest_file
            .as_ref()
            .map_or(true, |(_, latest)| modified > *latest)
        {
            latest_file = Some((path, modified));
        }
    }

    Ok(latest_file.map(|(path, _)| path))
}
