use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UPLOAD: AtomicU64 = AtomicU64::new(1);

/// An uploaded audio file on disk. The file is removed when the guard drops,
/// whichever way the request finishes.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write `bytes` to a fresh file under `dir`.
    pub async fn write(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let n = NEXT_UPLOAD.fetch_add(1, Ordering::Relaxed);
        let upload = Self {
            path: dir.join(format!("audio-{}-{}", std::process::id(), n)),
        };
        // Guard exists before the write so a partial file is still cleaned up.
        tokio::fs::write(&upload.path, bytes).await?;
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed upload"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(path = %self.path.display(), %err, "failed to remove upload"),
        }
    }
}
