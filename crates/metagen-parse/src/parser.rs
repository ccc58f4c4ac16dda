//! Model parser capability trait.

use std::collections::BTreeMap;
use std::path::Path;

use metagen_core::Model;
use tracing::{debug, info};

use crate::error::Result;

/// External configuration handed to a parser, keyed by setting name.
pub type ParserSettings = BTreeMap<String, String>;

/// Turns model files with a supported root element into [`Model`]s.
///
/// Implement this trait for every model file format. A parser is shared by
/// all parse jobs and must not mutate itself once registered; configuration
/// happens through [`ModelParser::configure`] before registration.
pub trait ModelParser: Send + Sync {
    /// Stable parser id, also the configuration key for this parser.
    fn id(&self) -> &'static str;

    /// Root element names this parser handles.
    fn supported_root_tags(&self) -> &[&'static str];

    /// Check if this parser handles the given root element name.
    fn supports(&self, root_tag: &str) -> bool {
        self.supported_root_tags().contains(&root_tag)
    }

    /// Apply external configuration. Called once, before registration.
    fn configure(&mut self, _settings: &ParserSettings) {}

    /// Look up a configuration value accepted by [`ModelParser::configure`].
    fn setting(&self, _key: &str) -> Option<&str> {
        None
    }

    /// Model ids that are dropped right after parsing.
    fn excluded_models(&self) -> &[String];

    /// Parse a model file at the XML level.
    fn parse_file(&self, path: &Path) -> Result<Vec<Model>>;

    /// Fold `other` into `primary`. Both share the same id.
    fn merge(&self, primary: &mut Model, other: &Model) -> Result<()>;
}

/// Parse a file, drop excluded models and stamp the parser id.
pub fn parse_model(parser: &dyn ModelParser, path: &Path) -> Result<Vec<Model>> {
    let parsed = parser.parse_file(path)?;
    let excluded = parser.excluded_models();

    let mut models = Vec::with_capacity(parsed.len());
    for mut model in parsed {
        if excluded.iter().any(|id| id == model.id()) {
            info!(
                model_id = %model.id(),
                location = %model.location(),
                "model excluded from generation"
            );
            continue;
        }

        model.header_mut().parser_id = parser.id().to_string();
        models.push(model);
    }

    debug!(
        parser = parser.id(),
        path = %path.display(),
        models = models.len(),
        "model file parsed"
    );

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagen_core::{ModelHeader, RelationModel};

    struct FixedParser {
        excluded: Vec<String>,
    }

    impl ModelParser for FixedParser {
        fn id(&self) -> &'static str {
            "fixed"
        }

        fn supported_root_tags(&self) -> &[&'static str] {
            &["fixed"]
        }

        fn excluded_models(&self) -> &[String] {
            &self.excluded
        }

        fn parse_file(&self, path: &Path) -> Result<Vec<Model>> {
            let location = path.display().to_string();
            Ok(["X", "Y"]
                .iter()
                .map(|id| {
                    Model::Relation(RelationModel {
                        header: ModelHeader::new(*id, None, location.clone()),
                    })
                })
                .collect())
        }

        fn merge(&self, _primary: &mut Model, _other: &Model) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn excluded_models_are_dropped_and_survivors_stamped() {
        let parser = FixedParser {
            excluded: vec!["Y".to_string()],
        };

        let models = parse_model(&parser, Path::new("/models/domain/r.xml")).expect("parse");

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id(), "X");
        assert_eq!(models[0].parser_id(), "fixed");
    }

    #[test]
    fn supports_matches_exact_root_tag() {
        let parser = FixedParser { excluded: Vec::new() };
        assert!(parser.supports("fixed"));
        assert!(!parser.supports("fixed-set"));
    }
}
