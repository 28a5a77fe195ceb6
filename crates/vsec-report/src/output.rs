//! Writing finished documents to disk.

use std::io::Write;
use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Write `bytes` to `path` atomically.
///
/// The document is written to a hidden temporary file in the destination
/// directory and renamed over `path` once fully flushed, so a failed render
/// never leaves a truncated report behind. Missing parent directories are
/// created.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> RenderResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::output(path, e))?;
    }

    let mut tmp = tempfile::Builder::new()
        .prefix(".vsec-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|e| RenderError::output(path, e))?;

    tmp.write_all(bytes).map_err(|e| RenderError::output(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RenderError::output(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| RenderError::output(path, e))?;
    }

    tmp.persist(path).map_err(|e| {
        tracing::error!(
            "Failed to move finished report into place: {}: {}",
            path.display(),
            e.error
        );
        RenderError::output(path, e.error)
    })?;

    Ok(())
}
