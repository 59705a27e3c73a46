use std::path::PathBuf;

use log::{debug, warn};
use tokio::fs;

use crate::error::{DashqError, Result};
use crate::upstream::Dashboard;

/// Per-dashboard JSON artifacts in a destination directory.
///
/// The presence of `{id}.json` marks a dashboard as done, which is what lets
/// an interrupted run pick up where it stopped. Artifacts are written to a
/// temporary sibling and renamed into place so a partial write is never
/// mistaken for a finished one.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dest_dir: PathBuf,
    pretty: bool,
}

impl ArtifactStore {
    pub fn new(dest_dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            pretty,
        }
    }

    /// Create the destination directory and any missing parents.
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dest_dir).await?;
        Ok(())
    }

    /// Reject ids that would not name a plain file inside `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DashqError::InvalidId`] for an empty id, `.`/`..`, or an id
    /// containing a path separator or a NUL byte.
    pub fn check_id(id: &str) -> Result<()> {
        let unusable = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0']);
        if unusable {
            return Err(DashqError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    pub fn artifact_path(&self, id: &str) -> PathBuf {
        self.dest_dir.join(format!("{id}.json"))
    }

    fn temp_path(&self, id: &str) -> PathBuf {
        self.dest_dir.join(format!("{id}.json.tmp"))
    }

    /// Whether a completed artifact already exists for the dashboard.
    ///
    /// An id that fails [`Self::check_id`] never has an artifact. A failed
    /// existence check is logged and treated as missing, so the dashboard is
    /// fetched and the write reports the underlying problem.
    pub async fn exists(&self, id: &str) -> bool {
        if Self::check_id(id).is_err() {
            return false;
        }

        let path = self.artifact_path(id);
        match fs::try_exists(&path).await {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    "Could not check {}: {e}; treating as missing",
                    path.display()
                );
                false
            }
        }
    }

    /// Serialize the dashboard and move it into place as `{id}.json`.
    ///
    /// # Errors
    ///
    /// Returns [`DashqError::InvalidId`] if the id is not a usable file name,
    /// or an error if serialization, the temporary write or the rename fails.
    /// The temporary file is removed on a failed rename.
    pub async fn write(&self, dashboard: &Dashboard) -> Result<PathBuf> {
        Self::check_id(&dashboard.id)?;

        let mut contents = if self.pretty {
            serde_json::to_vec_pretty(dashboard)?
        } else {
            serde_json::to_vec(dashboard)?
        };
        contents.push(b'\n');

        let temp = self.temp_path(&dashboard.id);
        let path = self.artifact_path(&dashboard.id);

        fs::write(&temp, &contents).await?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!("Wrote {} ({} bytes)", path.display(), contents.len());

        Ok(path)
    }
}
