use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{OfficeError, Result};

/// Number of rotated `session-*.log` files kept next to `latest.log`.
pub const MAX_SESSIONS: usize = 10;

/// Installs the global subscriber: stderr always, plus `<logs_dir>/latest.log`
/// when a directory is given. `RUST_LOG` overrides the default `info` filter.
///
/// The previous `latest.log` is rotated to `session-{timestamp}.log` first.
/// Returns the path of the session log, if one was opened.
pub fn init_logging(logs_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let latest = match logs_dir {
        Some(dir) => Some(open_session_log(dir)?),
        None => None,
    };
    let file_layer = match &latest {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| OfficeError::Custom(format!("Logging already initialized: {e}")))?;

    if let Some(path) = &latest {
        tracing::info!(path = %path.display(), "session log opened");
    }
    Ok(latest)
}

/// Prepares `dir` for a new session and returns the `latest.log` path.
fn open_session_log(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    rotate_latest(dir, unix_timestamp())?;
    cleanup_old_sessions(dir, MAX_SESSIONS);
    Ok(dir.join("latest.log"))
}

/// Renames `latest.log` to `session-{ts}.log`, if present.
fn rotate_latest(dir: &Path, ts: u64) -> Result<()> {
    let latest = dir.join("latest.log");
    if latest.exists() {
        std::fs::rename(&latest, dir.join(format!("session-{ts}.log")))?;
    }
    Ok(())
}

/// Keep only the `keep` most recent `session-*.log` files.
fn cleanup_old_sessions(dir: &Path, keep: usize) {
    let mut sessions: Vec<(u64, PathBuf)> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let ts = name
                .strip_prefix("session-")?
                .strip_suffix(".log")?
                .parse::<u64>()
                .ok()?;
            Some((ts, entry.path()))
        })
        .collect();

    // Oldest first; numeric so that 999 sorts before 1000.
    sessions.sort();

    let excess = sessions.len().saturating_sub(keep);
    for (_, path) in sessions.into_iter().take(excess) {
        let _ = std::fs::remove_file(path);
    }
}

fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_rotate_latest() {
        let dir = tempfile::tempdir().unwrap();
        rotate_latest(dir.path(), 100).unwrap();
        assert!(names(dir.path()).is_empty());

        std::fs::write(dir.path().join("latest.log"), "previous run").unwrap();
        rotate_latest(dir.path(), 100).unwrap();
        assert_eq!(names(dir.path()), ["session-100.log"]);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for ts in [5, 999, 1000, 1001, 42] {
            std::fs::write(dir.path().join(format!("session-{ts}.log")), "").unwrap();
        }
        std::fs::write(dir.path().join("latest.log"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        cleanup_old_sessions(dir.path(), 2);
        assert_eq!(
            names(dir.path()),
            ["latest.log", "notes.txt", "session-1000.log", "session-1001.log"]
        );
    }

    #[test]
    fn test_open_session_log_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let latest = open_session_log(&logs).unwrap();
        assert_eq!(latest, logs.join("latest.log"));
        assert!(logs.is_dir());
    }
}
