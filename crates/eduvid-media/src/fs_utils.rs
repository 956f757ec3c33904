//! Filesystem helpers shared by the assembly stages and the publisher.
//!
//! The job temp directory and the output directory may live on different
//! filesystems, so moves fall back to copy+delete on EXDEV.

use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// EXDEV on Linux and macOS.
const CROSS_DEVICE_ERRNO: i32 = 18;

/// Whether `path` is a regular file holding at least `min_bytes` bytes.
pub async fn file_larger_than(path: impl AsRef<Path>, min_bytes: u64) -> bool {
    match fs::metadata(path.as_ref()).await {
        Ok(meta) => meta.is_file() && meta.len() > min_bytes,
        Err(_) => false,
    }
}

/// Whether `path` exists and is non-empty.
pub async fn is_non_empty_file(path: impl AsRef<Path>) -> bool {
    file_larger_than(path, 0).await
}

/// Move `src` to `dst`, creating the destination directory when missing.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERRNO) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device move, copying instead"
            );
            copy_across_devices(src, dst).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Copy into a sibling `.partial` file, rename it into place, then drop the source.
async fn copy_across_devices(src: &Path, dst: &Path) -> MediaResult<()> {
    let staging = dst.with_extension("partial");

    fs::copy(src, &staging).await?;
    if let Err(e) = fs::rename(&staging, dst).await {
        let _ = fs::remove_file(&staging).await;
        return Err(e.into());
    }

    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), error = %e, "Could not remove source after copy");
    }
    Ok(())
}

/// Remove a file, ignoring a missing one.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<()> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("captioned.mp4");
        let dst = dir.path().join("published").join("eduvid_job_1.mp4");
        fs::write(&src, b"video bytes").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"video bytes");
    }

    #[tokio::test]
    async fn test_move_file_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("b.mp4");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        move_file(&src, &dst).await.unwrap();
        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_move_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = move_file(dir.path().join("nope.mp4"), dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_size_checks() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.mp3");
        let small = dir.path().join("small.mp3");
        fs::write(&empty, b"").await.unwrap();
        fs::write(&small, vec![0u8; 1500]).await.unwrap();

        assert!(!is_non_empty_file(&empty).await);
        assert!(is_non_empty_file(&small).await);
        assert!(file_larger_than(&small, 1000).await);
        assert!(!file_larger_than(&small, 2000).await);
        assert!(!is_non_empty_file(dir.path()).await);
        assert!(!is_non_empty_file(dir.path().join("missing")).await);
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.mp4");
        fs::write(&path, b"x").await.unwrap();
        remove_if_exists(&path).await.unwrap();
        remove_if_exists(&path).await.unwrap();
        assert!(!path.exists());
    }
}
