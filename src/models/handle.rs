//! Lazily initialised, shared handle to the model artifact

use crate::error::LoadError;
use crate::models::inference::ModelArtifact;
use crate::models::loader::ModelLoader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::error;

/// Loads the artifact on first use and hands out the same immutable copy
/// afterwards. A failed load is not cached, so the next caller tries again.
pub struct ModelHandle {
    path: PathBuf,
    loader: ModelLoader,
    artifact: OnceCell<Arc<ModelArtifact>>,
}

impl ModelHandle {
    pub fn new(path: impl Into<PathBuf>, loader: ModelLoader) -> Self {
        Self {
            path: path.into(),
            loader,
            artifact: OnceCell::new(),
        }
    }

    /// Handle around an artifact that is already in memory.
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            path: PathBuf::new(),
            loader: ModelLoader::default(),
            artifact: OnceCell::new_with(Some(Arc::new(artifact))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.initialized()
    }

    /// Get the artifact, loading it off the async runtime if needed.
    pub async fn get(&self) -> Result<Arc<ModelArtifact>, LoadError> {
        self.artifact
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let loader = self.loader.clone();

                let artifact = tokio::task::spawn_blocking(move || loader.load_artifact(&path))
                    .await
                    .map_err(|e| LoadError::Task(e.to_string()))?
                    .map_err(|e| {
                        error!(path = %self.path.display(), error = %e, "Failed to load model");
                        e
                    })?;

                Ok(Arc::new(artifact))
            })
            .await
            .cloned()
    }
}
