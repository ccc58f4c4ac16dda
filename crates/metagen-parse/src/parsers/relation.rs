use std::path::Path;

use metagen_core::{Model, ModelHeader, RelationModel, parser_ids};
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::parser::ModelParser;
use crate::xml::read_document;

/// Parses `relation-set` files into one model per `relation` element.
#[derive(Debug, Clone, Default)]
pub struct RelationParser {
    excluded: Vec<String>,
}

impl RelationParser {
    pub fn new(excluded: Vec<String>) -> Self {
        Self { excluded }
    }
}

impl ModelParser for RelationParser {
    fn id(&self) -> &'static str {
        parser_ids::RELATION
    }

    fn supported_root_tags(&self) -> &[&'static str] {
        &["relation-set"]
    }

    fn excluded_models(&self) -> &[String] {
        &self.excluded
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Model>> {
        let root = read_document(path)?;
        let location = path.display().to_string();
        let mut models = Vec::new();

        for element in root.descendants() {
            if element.local_name() != "relation" {
                continue;
            }
            let Some(id) = element.attr("id") else {
                warn!(location = %location, "relation without id skipped");
                continue;
            };

            models.push(Model::Relation(RelationModel {
                header: ModelHeader::new(
                    id,
                    element.attr("name").map(str::to_string),
                    location.clone(),
                ),
            }));
        }

        Ok(models)
    }

    fn merge(&self, primary: &mut Model, _other: &Model) -> Result<()> {
        Err(ParseError::MergeNotSupported {
            parser: self.id().to_string(),
            id: primary.id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_model_per_relation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("relations.xml");
        std::fs::write(
            &path,
            r#"<relation-set>
                 <relation id="owns" name="ownsOrder"/>
                 <group><relation id="bills"/></group>
                 <relation name="anonymous"/>
               </relation-set>"#,
        )
        .expect("write");

        let models = RelationParser::default().parse_file(&path).expect("parse");
        let ids: Vec<&str> = models.iter().map(Model::id).collect();

        assert_eq!(ids, vec!["owns", "bills"]);
        assert_eq!(models[0].name(), "ownsOrder");
    }

    #[test]
    fn merge_is_not_supported() {
        let parser = RelationParser::default();
        let mut primary = Model::Relation(RelationModel {
            header: ModelHeader::new("owns", None, "/a.xml"),
        });
        let other = primary.clone();

        assert!(matches!(
            parser.merge(&mut primary, &other),
            Err(ParseError::MergeNotSupported { .. })
        ));
    }
}
