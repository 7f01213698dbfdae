//! JSON artifact dumps of constructed noiser maps.

use crate::error::{NoiseError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `value` as pretty JSON to `dir/name`, creating `dir` if needed.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| NoiseError::artifact_write(dir, e))?;

    let path = dir.join(name);
    let file = File::create(&path).map_err(|e| NoiseError::artifact_write(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| NoiseError::artifact_write(&path, e))?;
    writer
        .flush()
        .map_err(|e| NoiseError::artifact_write(&path, e))?;

    info!(path = %path.display(), "wrote artifact");
    Ok(path)
}
