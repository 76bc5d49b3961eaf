//! Local progress file handling shared by the subcommands.
//!
//! The file holds one persisted payload, possibly in a historical shape;
//! every load runs it through reconciliation, so a stale or hand-edited
//! file heals into the canonical form on the next write.

use anyhow::Context;
use std::path::{Path, PathBuf};
use stride_core::curriculum::Catalog;
use stride_core::progress::ProgressTracker;
use stride_core::types::Track;
use stride_core::{io, reconcile};

pub struct Store {
    file: PathBuf,
    track: Track,
    catalog_overlay: Option<PathBuf>,
}

impl Store {
    pub fn new(file: PathBuf, track: Track, catalog_overlay: Option<&Path>) -> Self {
        Self {
            file,
            track,
            catalog_overlay: catalog_overlay.map(Path::to_path_buf),
        }
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog_overlay {
            Some(path) => Catalog::from_yaml_file(path)
                .with_context(|| format!("failed to load catalog overlay {}", path.display())),
            None => Ok(Catalog::default()),
        }
    }

    /// Load the progress file, normalizing whatever shape it holds. An
    /// absent file yields a fresh tracker.
    pub fn load(&self, catalog: &Catalog) -> anyhow::Result<ProgressTracker> {
        let payload = io::read_json::<serde_json::Value>(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        Ok(match payload {
            Some(value) => {
                let state = reconcile::normalize(self.track, catalog, value);
                ProgressTracker::initialize(self.track, state)
            }
            None => ProgressTracker::new(self.track, catalog),
        })
    }

    pub fn save(&self, tracker: &ProgressTracker) -> anyhow::Result<()> {
        io::write_json(&self.file, tracker.state())
            .with_context(|| format!("failed to write {}", self.file.display()))
    }
}
