use crate::error::{CoreError, Result};
use crate::model::Snapshot;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const DEFAULT_OUTPUT_FILE: &str = "privacy_tools_data.json";

/// Mode of the written snapshot on Unix.
pub const OUTPUT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub categories: usize,
    pub tools: usize,
}

/// Serialize the snapshot as pretty JSON, replacing `path` in one rename so
/// a reader never sees a half-written file.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<WriteSummary> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(|e| CoreError::io(dir, e))?;
    let mut writer = BufWriter::new(tmp);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush().map_err(|e| CoreError::io(path, e))?;

    let tmp = writer
        .into_inner()
        .map_err(|e| CoreError::io(path, e.into_error()))?;
    set_output_permissions(tmp.as_file()).map_err(|e| CoreError::io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| CoreError::io(path, e.error))?;

    let summary = WriteSummary {
        path: path.to_path_buf(),
        categories: snapshot.category_count(),
        tools: snapshot.tool_count(),
    };
    debug!(
        "Saved {} categories and {} tools to {}",
        summary.categories,
        summary.tools,
        path.display()
    );
    Ok(summary)
}

// NamedTempFile creates files 0600.
#[cfg(unix)]
fn set_output_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(OUTPUT_FILE_MODE))
}

#[cfg(not(unix))]
fn set_output_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(snapshot)
}
