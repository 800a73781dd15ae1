//! Atomic JSON file helpers
//!
//! Token records and the campaign cache are small JSON documents rewritten
//! whole on every change. Writes land in a temp file in the target's
//! directory and are renamed over it, so a crash mid-write cannot leave a
//! torn file behind. Files are created 0600 on unix since they may hold
//! tokens.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// Read and deserialize a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Serialize a value and write it to `path` atomically.
///
/// Missing parent directories are created first. The temp file carries the
/// process id so concurrent processes cannot clobber each other's staging
/// file.
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("file"));
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes()).await?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms).await?;
    }

    tokio::fs::rename(&tmp_path, path).await?;

    debug!(path = %path.display(), "persisted");
    Ok(())
}
