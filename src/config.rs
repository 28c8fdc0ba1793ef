use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// Default catalog database location under the user data dir,
/// e.g. `~/.local/share/pakka/catalog.db`. Creates the directory if needed.
pub fn db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("could not determine user data directory")?;
    let dir = data_dir.join("pakka");
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    Ok(dir.join("catalog.db"))
}
