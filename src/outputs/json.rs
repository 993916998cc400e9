//! JSON output, to stdout or to a file.

use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Serialize `value` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = to_json(value)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(path = %path.display(), "Wrote JSON output");
    Ok(())
}
