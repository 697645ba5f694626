//! Build-then-swap commit of an index directory

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::IndexPaths;
use crate::error::{Error, Result};

/// Scratch directory that replaces the live index directory on commit
///
/// Dropping an uncommitted staging area deletes it and leaves the live index
/// untouched.
pub struct StagingArea {
    dir: TempDir,
    target: PathBuf,
}

impl StagingArea {
    /// Create a staging directory next to `target`
    pub fn new(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&parent)?;

        let dir = tempfile::Builder::new()
            .prefix(".ingest-")
            .tempdir_in(&parent)?;
        tracing::debug!("Staging index in {}", dir.path().display());

        Ok(Self { dir, target })
    }

    /// Artifact paths inside the staging directory
    pub fn paths(&self) -> IndexPaths {
        IndexPaths::new(self.dir.path())
    }

    /// Swap the staged directory into place
    pub fn commit(self) -> Result<IndexPaths> {
        let staged = self.dir.keep();
        let retired = if self.target.exists() {
            let retired = staged.with_file_name(format!(
                ".retired-{}",
                staged
                    .file_name()
                    .map(|n| n.to_string_lossy().trim_start_matches('.').to_string())
                    .unwrap_or_default()
            ));
            std::fs::rename(&self.target, &retired)?;
            Some(retired)
        } else {
            None
        };

        if let Err(e) = std::fs::rename(&staged, &self.target) {
            if let Some(retired) = &retired {
                let _ = std::fs::rename(retired, &self.target);
            }
            let _ = std::fs::remove_dir_all(&staged);
            return Err(Error::internal(format!(
                "Failed to move staged index into {}: {}",
                self.target.display(),
                e
            )));
        }

        if let Some(retired) = retired {
            if let Err(e) = std::fs::remove_dir_all(&retired) {
                tracing::warn!("Could not remove previous index {}: {}", retired.display(), e);
            }
        }

        tracing::info!("Index committed to {}", self.target.display());
        Ok(IndexPaths::new(&self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_replaces_target() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("index");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("stale.txt"), "old").unwrap();

        let staging = StagingArea::new(&target).unwrap();
        std::fs::write(staging.paths().manifest, "{}").unwrap();
        let paths = staging.commit().unwrap();

        assert!(paths.manifest.is_file());
        assert!(!target.join("stale.txt").exists());
        let leftovers = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_drop_without_commit_keeps_target() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("index");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("live.txt"), "live").unwrap();

        {
            let staging = StagingArea::new(&target).unwrap();
            std::fs::write(staging.paths().manifest, "{}").unwrap();
        }

        assert!(target.join("live.txt").is_file());
        let entries = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
