//! Per-job scratch directory.
//!
//! The directory is removed when the [`JobWorkspace`] is dropped, so every
//! exit path of a job (success, error, panic unwinding) cleans up.

use std::path::{Path, PathBuf};

use eduvid_models::JobId;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::WorkerResult;

#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Create `video_{job_id}_*` under `root`, creating `root` if needed.
    pub async fn create(root: &Path, job_id: &JobId) -> WorkerResult<Self> {
        tokio::fs::create_dir_all(root).await?;
        let prefix = format!("video_{}_", job_id);
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || tempfile::Builder::new().prefix(&prefix).tempdir_in(&root))
            .await
            .map_err(|e| std::io::Error::other(format!("workspace task failed: {e}")))??;
        debug!(path = %dir.path().display(), "Job workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory now on a blocking thread, logging instead of
    /// failing.
    pub async fn close(self) {
        let path = self.dir.path().to_path_buf();
        let dir = self.dir;
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => debug!(path = %path.display(), "Job workspace removed"),
            Ok(Err(e)) => warn!(path = %path.display(), error = %e, "Failed to remove job workspace"),
            Err(e) => warn!(path = %path.display(), error = %e, "Workspace removal task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let job_id = JobId::from_string("job-1");
        let path = {
            let ws = JobWorkspace::create(root.path(), &job_id).await.unwrap();
            std::fs::write(ws.file("frame_000.png"), b"x").unwrap();
            assert!(ws.path().file_name().unwrap().to_string_lossy().starts_with("video_job-1_"));
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_close_removes() {
        let root = TempDir::new().unwrap();
        let ws = JobWorkspace::create(&root.path().join("nested"), &JobId::new()).await.unwrap();
        let path = ws.path().to_path_buf();
        std::fs::create_dir(ws.file("clips")).unwrap();
        std::fs::write(ws.path().join("clips").join("clip_000.mp4"), b"x").unwrap();
        ws.close().await;
        assert!(!path.exists());
        assert!(root.path().join("nested").exists());
    }
}
