use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Private per-render working directory, removed on drop.
///
/// The directory name carries the render id plus a random suffix, so concurrent renders under
/// the same root never share frame files.
#[derive(Debug)]
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    pub fn create(root: &Path, render_id: Uuid) -> ClipforgeResult<Self> {
        std::fs::create_dir_all(root).map_err(|e| {
            ClipforgeError::io(format!("create scratch root '{}': {e}", root.display()))
        })?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("clipforge-{}-", render_id.simple()))
            .tempdir_in(root)
            .map_err(|e| {
                ClipforgeError::io(format!("create scratch dir in '{}': {e}", root.display()))
            })?;
        tracing::debug!(path = %dir.path().display(), "created scratch dir");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the compositor writes `frame_NNNNNN.png` files.
    pub fn frames_dir(&self) -> PathBuf {
        self.dir.path().join("frames")
    }

    /// Remove the directory now, logging instead of failing.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), "failed to remove scratch dir: {e}");
        }
    }
}
