use std::fs;
use std::path::PathBuf;

/// Paths of temporary files owned by a run.
///
/// Every path still present on disk is removed when the guard is dropped, whether the run
/// succeeded or failed. Removal errors are ignored one by one.
#[derive(Debug, Default)]
pub(crate) struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub(crate) fn new() -> TempFiles {
        TempFiles {
            paths: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub(crate) fn paths(&self) -> &Vec<PathBuf> {
        &self.paths
    }

    pub(crate) fn len(&self) -> usize {
        self.paths.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Give up ownership of the files without removing them.
    pub(crate) fn into_paths(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }

    pub(crate) fn remove_existing(&mut self) {
        for path in self.paths.drain(..) {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    log::debug!("Failed to remove temporary file {}: {}", path.display(), e);
                }
            }
        }
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        self.remove_existing();
    }
}
