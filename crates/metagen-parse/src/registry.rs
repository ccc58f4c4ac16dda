//! Registry of model parsers and candidate matching.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::parser::{ModelParser, ParserSettings};
use crate::parsers::{DomainTypeParser, ProcessParser, RelationParser, ViewParser};
use crate::sniff::resolve_root_element_name;

/// Options used to build the standard registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Model ids every parser drops after parsing.
    pub excluded_models: Vec<String>,
    /// Parser configuration keyed by parser id.
    pub parser_settings: BTreeMap<String, ParserSettings>,
    /// Registers the test-tree, process and view parsers.
    pub integration_test_support: bool,
}

/// A model file matched to one parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub path: PathBuf,
    pub root_tag: String,
    /// Position of the parser in the registry.
    pub parser_index: usize,
    pub parser_id: &'static str,
}

/// Ordered set of parsers. Registration order is the lookup order used
/// during reference resolution.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn ModelParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in parsers, configured from `options`.
    pub fn standard(options: &RegistryOptions) -> Self {
        let excluded = &options.excluded_models;
        let mut registry = Self::new();

        registry.register_configured(RelationParser::new(excluded.clone()), options);
        registry.register_configured(DomainTypeParser::source(excluded.clone()), options);
        registry.register_configured(DomainTypeParser::external(excluded.clone()), options);

        if options.integration_test_support {
            registry.register_configured(DomainTypeParser::test(excluded.clone()), options);
            registry
                .register_configured(DomainTypeParser::test_external(excluded.clone()), options);
            registry.register_configured(ProcessParser::new(excluded.clone()), options);
            registry.register_configured(ViewParser::new(excluded.clone()), options);
        }

        info!(
            parsers = registry.len(),
            integration_test_support = options.integration_test_support,
            "parser registry initialized"
        );
        registry
    }

    fn register_configured<P>(&mut self, mut parser: P, options: &RegistryOptions)
    where
        P: ModelParser + 'static,
    {
        if let Some(settings) = options.parser_settings.get(parser.id()) {
            debug!(parser = parser.id(), keys = settings.len(), "parser configured");
            parser.configure(settings);
        }
        self.register(Arc::new(parser));
    }

    /// Register an already configured parser.
    pub fn register(&mut self, parser: Arc<dyn ModelParser>) {
        self.parsers.push(parser);
    }

    pub fn parsers(&self) -> &[Arc<dyn ModelParser>] {
        &self.parsers
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn ModelParser>> {
        self.parsers.get(index)
    }

    pub fn find(&self, parser_id: &str) -> Option<&Arc<dyn ModelParser>> {
        self.parsers.iter().find(|parser| parser.id() == parser_id)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Sniff every file and pair it with each parser supporting its root tag.
    ///
    /// A file may match several parsers. Files without a root element fail
    /// the whole match.
    pub fn match_candidates(&self, files: &[PathBuf]) -> Result<Vec<ModelCandidate>> {
        let mut candidates = Vec::new();

        for path in files {
            let root_tag = resolve_root_element_name(path)?;
            let before = candidates.len();

            for (parser_index, parser) in self.parsers.iter().enumerate() {
                if parser.supports(&root_tag) {
                    candidates.push(ModelCandidate {
                        path: path.clone(),
                        root_tag: root_tag.clone(),
                        parser_index,
                        parser_id: parser.id(),
                    });
                }
            }

            if candidates.len() == before {
                debug!(path = %path.display(), root_tag = %root_tag, "no parser supports model file");
            }
        }

        info!(
            files = files.len(),
            candidates = candidates.len(),
            "model candidates matched"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use metagen_core::parser_ids;

    fn ids(registry: &ParserRegistry) -> Vec<&'static str> {
        registry.parsers().iter().map(|parser| parser.id()).collect()
    }

    #[test]
    fn standard_registry_without_test_support() {
        let registry = ParserRegistry::standard(&RegistryOptions::default());
        assert_eq!(
            ids(&registry),
            vec![
                parser_ids::RELATION,
                parser_ids::DOMAIN_TYPE,
                parser_ids::EXTERNAL_DOMAIN_TYPE
            ]
        );
    }

    #[test]
    fn test_support_adds_test_and_ui_parsers() {
        let options = RegistryOptions {
            integration_test_support: true,
            ..RegistryOptions::default()
        };
        let registry = ParserRegistry::standard(&options);

        assert_eq!(registry.len(), 7);
        assert!(registry.find(parser_ids::PROCESS).is_some());
        assert!(registry.find(parser_ids::VIEW).is_some());
        assert!(registry.find(parser_ids::TEST_EXTERNAL_DOMAIN_TYPE).is_some());
    }

    #[test]
    fn settings_reach_the_parser() {
        let mut settings = ParserSettings::new();
        settings.insert(
            parser_ids::CONFIG_KEY_EXTENDS_CLASS.to_string(),
            "PortalView".to_string(),
        );
        let mut options = RegistryOptions {
            integration_test_support: true,
            ..RegistryOptions::default()
        };
        options
            .parser_settings
            .insert(parser_ids::VIEW.to_string(), settings);

        let registry = ParserRegistry::standard(&options);
        let view = registry.find(parser_ids::VIEW).expect("view parser");

        assert_eq!(
            view.setting(parser_ids::CONFIG_KEY_EXTENDS_CLASS),
            Some("PortalView")
        );
    }

    #[test]
    fn domain_file_matches_source_and_test_parsers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.xml");
        std::fs::write(&path, "<domain-type id=\"A\"/>").expect("write");

        let options = RegistryOptions {
            integration_test_support: true,
            ..RegistryOptions::default()
        };
        let registry = ParserRegistry::standard(&options);
        let candidates = registry.match_candidates(&[path]).expect("match");

        let matched: Vec<&str> = candidates.iter().map(|c| c.parser_id).collect();
        assert_eq!(
            matched,
            vec![parser_ids::DOMAIN_TYPE, parser_ids::TEST_DOMAIN_TYPE]
        );
        assert_eq!(candidates[0].root_tag, "domain-type");
    }

    #[test]
    fn unreadable_root_fails_matching() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.xml");
        std::fs::write(&path, "").expect("write");

        let registry = ParserRegistry::standard(&RegistryOptions::default());
        assert!(matches!(
            registry.match_candidates(&[path]),
            Err(ParseError::RootNameNotFound { .. })
        ));
    }
}
