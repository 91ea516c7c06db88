//! Tracing setup.
//!
//! The interactive player owns the terminal, so its logs go to a file. The
//! `print` command logs to stderr. The filter is read from `SAKURA_LOG`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    Stderr,
    File,
}

pub fn init(target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env("SAKURA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::File => {
            let path = log_path();
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
    }
    Ok(())
}

fn log_path() -> PathBuf {
    let mut path = match std::env::var("XDG_STATE_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let mut p = PathBuf::from(home);
            p.push(".local");
            p.push("state");
            p
        }
    };
    path.push("sakura-letter");
    path.push("sakura-letter.log");
    path
}
