//! Writes rendered Java sources into a target tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metagen_core::{HandlerType, Model};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::errors::GenerationError;
use crate::template::TemplateRenderer;

pub const JAVA_FILE_EXTENSION: &str = ".java";
const GENERATED_COMMENT: &str = "This class is generated by metagen.";

/// Renders templates into `<target>/<package>/<sub-package>/<file>`.
#[derive(Clone)]
pub struct SourceGenerator {
    target_directory: PathBuf,
    package_name: String,
    handler_type: HandlerType,
    renderer: Arc<dyn TemplateRenderer>,
}

impl SourceGenerator {
    pub fn new(
        target_directory: impl Into<PathBuf>,
        package_name: impl Into<String>,
        handler_type: HandlerType,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            target_directory: target_directory.into(),
            package_name: package_name.into(),
            handler_type,
            renderer,
        }
    }

    pub fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Directory of generated sources for the base package.
    pub fn package_directory(&self) -> PathBuf {
        package_directory(&self.target_directory, &self.package_name)
    }

    /// Render `template_id` and write it as `file_name` into the sub-package.
    ///
    /// The handler-specific context is merged over the default context, so a
    /// handler may override default keys.
    pub fn generate(
        &self,
        template_id: &str,
        file_name: &str,
        sub_package: &str,
        specific_context: Map<String, Value>,
        models: &[&Model],
    ) -> Result<PathBuf, GenerationError> {
        let mut directory = self.package_directory();
        if !sub_package.is_empty() {
            directory = directory.join(sub_package.replace('.', "/"));
        }
        std::fs::create_dir_all(&directory).map_err(|source| GenerationError::Io {
            path: directory.clone(),
            source,
        })?;

        let mut context = self.default_context(sub_package, models)?;
        context.extend(specific_context);

        let rendered = self.renderer.render(template_id, &Value::Object(context))?;
        let path = directory.join(file_name);
        if path.exists() {
            debug!(path = %path.display(), "existing source overwritten");
        }
        std::fs::write(&path, rendered).map_err(|source| GenerationError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), template = template_id, "source written");
        Ok(path)
    }

    fn default_context(
        &self,
        sub_package: &str,
        models: &[&Model],
    ) -> Result<Map<String, Value>, GenerationError> {
        let package_name = if sub_package.is_empty() {
            self.package_name.clone()
        } else {
            format!("{}.{}", self.package_name, sub_package)
        };

        let mut context = Map::new();
        context.insert("comment".to_string(), json!(GENERATED_COMMENT));
        context.insert("packageName".to_string(), json!(package_name));
        context.insert("basePackageName".to_string(), json!(self.package_name));
        context.insert("model".to_string(), serde_json::to_value(models)?);
        Ok(context)
    }
}

pub fn package_directory(target_directory: &Path, package_name: &str) -> PathBuf {
    target_directory.join(package_name.replace('.', "/"))
}
