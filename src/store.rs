use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{IngestError, Result};
use crate::model::NewsDocument;

/// Write `value` as pretty JSON. The file is written to a temp file in the
/// target directory and renamed into place, so readers never see a partial
/// document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let write_err = |source: std::io::Error| IngestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.write_all(b"\n").map_err(write_err)?;
        writer.flush().map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Load an existing news document; `None` when the file does not exist.
pub fn load_news(path: &Path) -> Result<Option<NewsDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let doc = serde_json::from_str(&raw).map_err(IngestError::MalformedInput)?;
    Ok(Some(doc))
}
