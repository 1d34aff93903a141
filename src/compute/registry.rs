// Model Store: loading and hot-swapping the served classifier

use super::model::{LoadedModel, ModelArtifact};
use crate::error::{CkdError, Result};
use crate::observability;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Holds the model currently being served.
///
/// Readers take a cheap `Arc` snapshot and never hold the lock during
/// inference. A reload builds the replacement completely before swapping it
/// in, so a request sees either the old model or the new one.
pub struct ModelStore {
    /// Artifact location
    path: PathBuf,
    /// Current model
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelStore {
    /// Creates an empty store for the artifact at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Creates a store that already serves `model`
    pub fn with_model(path: impl Into<PathBuf>, model: LoadedModel) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    /// Artifact path this store loads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the artifact, for user-facing messages
    pub fn artifact_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Snapshot of the served model
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Snapshot of the served model, or `ModelUnavailable`
    pub fn require(&self) -> Result<Arc<LoadedModel>> {
        self.current().ok_or_else(|| CkdError::ModelUnavailable {
            artifact: self.artifact_name(),
            path: self
                .path
                .parent()
                .map(|dir| dir.display().to_string())
                .filter(|dir| !dir.is_empty())
                .unwrap_or_else(|| ".".to_string()),
        })
    }

    /// Read, validate and swap in the artifact.
    ///
    /// On failure the previously served model, if any, stays in place.
    pub fn try_load(&self) -> Result<Arc<LoadedModel>> {
        if !self.path.exists() {
            return Err(CkdError::ModelNotFound(self.path.display().to_string()));
        }

        let model = Arc::new(ModelArtifact::from_file(&self.path)?.into_model(&self.path)?);
        *self.current.write() = Some(model.clone());
        Ok(model)
    }

    /// Attempt a load, logging the outcome instead of returning it.
    ///
    /// Returns `true` when a new model is now being served.
    pub fn load(&self) -> bool {
        info!(path = %self.path.display(), "Attempting to load model");

        match self.try_load() {
            Ok(model) => {
                observability::record_model_load("success", true);
                info!(
                    model_type = model.model_type(),
                    version = %model.version,
                    probabilistic = model.capability.is_probabilistic(),
                    "Model loaded successfully"
                );
                true
            }
            Err(CkdError::ModelNotFound(path)) => {
                observability::record_model_load("missing", self.is_loaded());
                warn!(path = %path, "Model file not found");
                false
            }
            Err(e) => {
                observability::record_model_load("error", self.is_loaded());
                error!(path = %self.path.display(), "Error loading model: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
