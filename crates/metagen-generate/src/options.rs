use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use metagen_parse::{
    DEFAULT_MODEL_EXTENSION, ModelFileSet, ParserSettings, RegistryOptions,
    default_model_directories,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PACKAGE_NAME: &str = "org.opensaga.runtime.model.domain.meta";
pub const DEFAULT_DOMAIN_PREFIX: &str = "Project";
pub const DEFAULT_WORKERS: usize = 4;

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Directory searched for model files.
    pub base_directory: PathBuf,
    /// Path fragments a model file must contain (empty accepts all).
    pub includes: Vec<String>,
    /// Path fragments that exclude a model file.
    pub excludes: Vec<String>,
    /// Whitelisted model sub-directories.
    pub model_directories: Vec<String>,
    pub model_extension: String,
    /// Model ids dropped right after parsing.
    pub excluded_models: Vec<String>,
    /// Parser configuration keyed by parser id.
    pub parser_settings: BTreeMap<String, ParserSettings>,
    /// Java package of the generated sources.
    pub package_name: String,
    /// Prefix of the aggregate domain classes.
    pub domain_prefix: String,
    /// Main source tree.
    pub target_directory: PathBuf,
    /// Integration-test source tree.
    pub test_target_directory: PathBuf,
    /// Enables test domain, process and view generation.
    pub integration_test_support: bool,
    /// Maximum number of concurrent parse and generation jobs.
    pub workers: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            includes: Vec::new(),
            excludes: Vec::new(),
            model_directories: default_model_directories(),
            model_extension: DEFAULT_MODEL_EXTENSION.to_string(),
            excluded_models: Vec::new(),
            parser_settings: BTreeMap::new(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            domain_prefix: DEFAULT_DOMAIN_PREFIX.to_string(),
            target_directory: PathBuf::from("target/generated-sources/metagen"),
            test_target_directory: PathBuf::from("target/generated-test-sources/metagen"),
            integration_test_support: false,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl GeneratorOptions {
    pub fn file_set(&self) -> ModelFileSet {
        ModelFileSet {
            base_directory: self.base_directory.clone(),
            includes: self.includes.clone(),
            excludes: self.excludes.clone(),
            model_directories: self.model_directories.clone(),
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            excluded_models: self.excluded_models.clone(),
            parser_settings: self.parser_settings.clone(),
            integration_test_support: self.integration_test_support,
        }
    }
}

/// Report of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Stale generated files removed before the run.
    pub cleaned: usize,
    pub candidates: usize,
    /// Models left after merging.
    pub models: usize,
    pub merged: usize,
    pub resolved_references: usize,
    /// Artifacts written by model handlers.
    pub generated: usize,
    /// Artifacts written by post-processors.
    pub post_processed: usize,
    pub total: usize,
}
