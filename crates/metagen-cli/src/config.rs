use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use metagen_generate::GeneratorOptions;
use metagen_parse::ParserSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "metagen.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `metagen.toml`. Every key is optional; absent keys keep the
/// generator defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetagenConfig {
    pub base_directory: Option<PathBuf>,
    pub includes: Option<Vec<String>>,
    pub excludes: Option<Vec<String>>,
    pub model_directories: Option<Vec<String>>,
    pub model_extension: Option<String>,
    pub excluded_models: Option<Vec<String>>,
    pub package_name: Option<String>,
    pub domain_prefix: Option<String>,
    pub target_directory: Option<PathBuf>,
    pub test_target_directory: Option<PathBuf>,
    pub integration_test_support: Option<bool>,
    pub workers: Option<usize>,
    /// Parser settings keyed by parser id, e.g.
    /// `[parsers."opensaga.VIEW_MODEL_HANDLER"]`.
    pub parsers: BTreeMap<String, ParserSettings>,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_directory: Option<PathBuf>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub excluded_models: Vec<String>,
    pub package_name: Option<String>,
    pub domain_prefix: Option<String>,
    pub target_directory: Option<PathBuf>,
    pub test_target_directory: Option<PathBuf>,
    pub integration_test_support: bool,
    pub workers: Option<usize>,
}

/// Load the config file at `path`.
///
/// A missing file yields the defaults unless it was requested explicitly.
pub fn load_config(path: &Path, explicit: bool) -> Result<MetagenConfig, ConfigError> {
    if !path.exists() && !explicit {
        return Ok(MetagenConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

impl MetagenConfig {
    pub fn into_options(self, overrides: Overrides) -> Result<GeneratorOptions, ConfigError> {
        let mut options = GeneratorOptions::default();

        if let Some(value) = self.base_directory {
            options.base_directory = value;
        }
        if let Some(value) = self.includes {
            options.includes = value;
        }
        if let Some(value) = self.excludes {
            options.excludes = value;
        }
        if let Some(value) = self.model_directories {
            options.model_directories = value;
        }
        if let Some(value) = self.model_extension {
            options.model_extension = value;
        }
        if let Some(value) = self.excluded_models {
            options.excluded_models = value;
        }
        if let Some(value) = self.package_name {
            options.package_name = value;
        }
        if let Some(value) = self.domain_prefix {
            options.domain_prefix = value;
        }
        if let Some(value) = self.target_directory {
            options.target_directory = value;
        }
        if let Some(value) = self.test_target_directory {
            options.test_target_directory = value;
        }
        if let Some(value) = self.integration_test_support {
            options.integration_test_support = value;
        }
        if let Some(value) = self.workers {
            options.workers = value;
        }
        options.parser_settings = self.parsers;

        if let Some(value) = overrides.base_directory {
            options.base_directory = value;
        }
        if !overrides.includes.is_empty() {
            options.includes = overrides.includes;
        }
        if !overrides.excludes.is_empty() {
            options.excludes = overrides.excludes;
        }
        // excluded ids accumulate: config and flags both apply
        options.excluded_models.extend(overrides.excluded_models);
        if let Some(value) = overrides.package_name {
            options.package_name = value;
        }
        if let Some(value) = overrides.domain_prefix {
            options.domain_prefix = value;
        }
        if let Some(value) = overrides.target_directory {
            options.target_directory = value;
        }
        if let Some(value) = overrides.test_target_directory {
            options.test_target_directory = value;
        }
        if overrides.integration_test_support {
            options.integration_test_support = true;
        }
        if let Some(value) = overrides.workers {
            options.workers = value;
        }

        validate(&options)?;
        Ok(options)
    }
}

fn validate(options: &GeneratorOptions) -> Result<(), ConfigError> {
    if options.workers == 0 {
        return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
    }
    if options.package_name.trim().is_empty()
        || options.package_name.split('.').any(|segment| segment.is_empty())
    {
        return Err(ConfigError::Invalid(format!(
            "invalid package name '{}'",
            options.package_name
        )));
    }
    if options.model_extension.trim().is_empty() {
        return Err(ConfigError::Invalid("model extension is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
base_directory = "app"
package_name = "org.acme.meta"
domain_prefix = "crm"
integration_test_support = true
workers = 8
excluded_models = ["Legacy"]

[parsers."opensaga.VIEW_MODEL_HANDLER"]
EXTENDS_CLASS = "PortalView"
"#;

    #[test]
    fn config_values_replace_defaults() {
        let config: MetagenConfig = toml::from_str(SAMPLE).expect("parse config");
        let options = config.into_options(Overrides::default()).expect("options");

        assert_eq!(options.base_directory, PathBuf::from("app"));
        assert_eq!(options.package_name, "org.acme.meta");
        assert_eq!(options.domain_prefix, "crm");
        assert!(options.integration_test_support);
        assert_eq!(options.workers, 8);
        assert_eq!(
            options.parser_settings["opensaga.VIEW_MODEL_HANDLER"]["EXTENDS_CLASS"],
            "PortalView"
        );
        assert_eq!(
            options.model_directories,
            GeneratorOptions::default().model_directories
        );
    }

    #[test]
    fn flags_win_over_config() {
        let config: MetagenConfig = toml::from_str(SAMPLE).expect("parse config");
        let overrides = Overrides {
            package_name: Some("org.other".to_string()),
            workers: Some(2),
            excluded_models: vec!["Draft".to_string()],
            ..Overrides::default()
        };

        let options = config.into_options(overrides).expect("options");

        assert_eq!(options.package_name, "org.other");
        assert_eq!(options.workers, 2);
        assert_eq!(options.domain_prefix, "crm");
        assert_eq!(options.excluded_models, vec!["Legacy", "Draft"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<MetagenConfig, _> = toml::from_str("package = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let overrides = Overrides {
            workers: Some(0),
            ..Overrides::default()
        };
        let result = MetagenConfig::default().into_options(overrides);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        assert_eq!(load_config(&path, false).expect("load"), MetagenConfig::default());
        assert!(matches!(
            load_config(&path, true),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn broken_file_reports_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metagen.toml");
        std::fs::write(&path, "workers = \"many\"").expect("write");

        match load_config(&path, true) {
            Err(ConfigError::Toml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected toml error, got {other:?}"),
        }
    }
}
