use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$TAREFAS_HOME`, or `~/.tarefas`.
pub fn tarefas_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TAREFAS_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tarefas"))
}

pub fn ensure_tarefas_home() -> Result<PathBuf> {
    let dir = tarefas_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn session_path() -> Result<PathBuf> {
    Ok(ensure_tarefas_home()?.join("session.json"))
}
