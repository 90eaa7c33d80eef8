//! Writing rendered invitations to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{InviteError, InviteResult};
use crate::event::EventRecord;

/// Render `event` and write it to `path`, replacing any existing file.
///
/// The data goes to a temporary file next to `path` which is then renamed
/// into place, so `path` holds either the old contents or the new ones.
/// Rendering errors are returned before anything touches the disk.
pub fn save(event: &EventRecord, path: impl AsRef<Path>) -> InviteResult<()> {
    let path = path.as_ref();
    let data = event.get_data()?;

    write_atomic(path, data.as_bytes()).map_err(|source| {
        tracing::debug!(path = %path.display(), error = %source, "failed to save invitation");
        InviteError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(uid = event.uid(), path = %path.display(), "saved invitation");
    Ok(())
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(path);
    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
