//! Removal of previously generated sources.

use std::path::Path;

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::source::package_directory;

const GENERATED_SUFFIXES: &[&str] = &["Domain.java", "MetaModel.java"];

/// Delete generated `*Domain.java` and `*MetaModel.java` files below the
/// package directory of `target_directory`. Returns the number of deleted
/// files; a missing directory deletes nothing.
pub fn clean_target(target_directory: &Path, package_name: &str) -> Result<usize, PipelineError> {
    let directory = package_directory(target_directory, package_name);
    if !directory.is_dir() {
        debug!(directory = %directory.display(), "nothing to clean");
        return Ok(0);
    }

    let mut deleted = 0;
    for entry in WalkBuilder::new(&directory).standard_filters(false).build() {
        let entry = entry.map_err(|err| PipelineError::Io {
            path: directory.clone(),
            source: std::io::Error::other(err.to_string()),
        })?;
        let path = entry.path();
        if !path.is_file() || !is_generated(path) {
            continue;
        }

        std::fs::remove_file(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        deleted += 1;
    }

    info!(directory = %directory.display(), deleted, "generated sources cleaned");
    Ok(deleted)
}

fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletes_only_generated_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = dir.path().join("org/acme/meta");
        std::fs::create_dir_all(package.join("domain")).expect("create dirs");
        std::fs::write(package.join("CrmDomain.java"), "").expect("write");
        std::fs::write(package.join("domain/CustomerMetaModel.java"), "").expect("write");
        std::fs::write(package.join("domain/Handwritten.java"), "").expect("write");
        std::fs::write(dir.path().join("OtherMetaModel.java"), "").expect("write");

        let deleted = clean_target(dir.path(), "org.acme.meta").expect("clean");

        assert_eq!(deleted, 2);
        assert!(package.join("domain/Handwritten.java").exists());
        assert!(dir.path().join("OtherMetaModel.java").exists());
        assert!(!package.join("CrmDomain.java").exists());
    }

    #[test]
    fn missing_directory_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(clean_target(&dir.path().join("absent"), "org.acme").expect("clean"), 0);
    }
}
