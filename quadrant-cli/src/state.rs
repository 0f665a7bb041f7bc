use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn quadrant_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".quadrant"))
}

pub fn ensure_quadrant_home() -> Result<PathBuf> {
    let dir = quadrant_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
