// src/utils.rs
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Build `<dir>/<stem>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn timestamped_file_path<Tz>(dir: &Path, stem: &str, ext: &str, at: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dir.join(format!("{}_{}.{}", stem, at.format("%Y%m%d_%H%M%S"), ext))
}

/// Resolve a relative path against the current working directory
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write file content with proper error context
pub async fn write_file_content(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent).await?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
