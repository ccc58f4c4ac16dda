//! Model candidate discovery below a model base directory.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::error::{ParseError, Result};

/// Extension of model files unless configured otherwise.
pub const DEFAULT_MODEL_EXTENSION: &str = "xml";

/// Sub-directories (relative to the base directory) that may contain models.
pub fn default_model_directories() -> Vec<String> {
    [
        "models/domain",
        "models/domain/types",
        "models/domain/external",
        "models/domain/joined",
        "models/domain/constant-types",
        "models/processes",
        "models/subprocesses",
    ]
    .iter()
    .map(|dir| dir.to_string())
    .collect()
}

/// Describes where and how model candidates are searched.
#[derive(Debug, Clone)]
pub struct ModelFileSet {
    pub base_directory: PathBuf,
    /// Path fragments a candidate must contain; empty accepts everything.
    pub includes: Vec<String>,
    /// Path fragments a candidate must not contain.
    pub excludes: Vec<String>,
    /// Whitelisted model sub-directories.
    pub model_directories: Vec<String>,
}

impl ModelFileSet {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            model_directories: default_model_directories(),
        }
    }

    fn accepts(&self, location: &Path, extension: &str) -> bool {
        let normalized = normalize(location);

        let included =
            self.includes.is_empty() || path_matches_any(&normalized, &self.includes);
        let excluded =
            !self.excludes.is_empty() && path_matches_any(&normalized, &self.excludes);

        included
            && !excluded
            && path_matches_any(&normalized, &self.model_directories)
            && location.extension().and_then(|ext| ext.to_str()) == Some(extension)
    }
}

/// Find all model candidates described by the file set.
///
/// A missing base directory yields no candidates. The result is sorted by path.
pub fn find_candidates(file_set: &ModelFileSet, extension: &str) -> Result<Vec<PathBuf>> {
    let base = std::path::absolute(&file_set.base_directory).map_err(|source| ParseError::Io {
        path: file_set.base_directory.clone(),
        source,
    })?;

    info!(base = %base.display(), "searching model candidates");
    if !file_set.includes.is_empty() || !file_set.excludes.is_empty() {
        info!(includes = ?file_set.includes, excludes = ?file_set.excludes, "extension filters active");
    }

    if !base.exists() {
        info!(base = %base.display(), "model base directory does not exist");
        return Ok(Vec::new());
    }

    let walker = WalkBuilder::new(&base).standard_filters(false).build();
    let mut candidates = Vec::new();

    for entry in walker {
        let entry = entry.map_err(|err| ParseError::Discovery(err.to_string()))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if file_set.accepts(path, extension) {
            debug!(path = %path.display(), "model candidate accepted");
            candidates.push(path.to_path_buf());
        }
    }

    candidates.sort();
    Ok(candidates)
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn path_matches_any(normalized: &str, fragments: &[String]) -> bool {
    fragments
        .iter()
        .any(|fragment| normalized.contains(&fragment.replace('\\', "/")))
}
