use std::path::Path;

use metagen_core::{
    DomainTypeModel, Error as CoreError, Model, ModelHeader, PropertyModel, map_model_type,
    parser_ids,
};
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::parser::ModelParser;
use crate::xml::{XmlElement, read_document};

const DOMAIN_TAGS: &[&str] = &["relational-domain-type", "domain-type"];
const EXTERNAL_TAGS: &[&str] = &["external-relational-domain-type", "external-domain-type"];

/// Parses domain type and external domain type definitions.
///
/// The same XML is parsed for the main and the test tree; only the parser id
/// differs so that the models end up in separate groups.
#[derive(Debug, Clone)]
pub struct DomainTypeParser {
    id: &'static str,
    root_tags: &'static [&'static str],
    external: bool,
    excluded: Vec<String>,
}

impl DomainTypeParser {
    pub fn source(excluded: Vec<String>) -> Self {
        Self::with(parser_ids::DOMAIN_TYPE, DOMAIN_TAGS, false, excluded)
    }

    pub fn external(excluded: Vec<String>) -> Self {
        Self::with(parser_ids::EXTERNAL_DOMAIN_TYPE, EXTERNAL_TAGS, true, excluded)
    }

    pub fn test(excluded: Vec<String>) -> Self {
        Self::with(parser_ids::TEST_DOMAIN_TYPE, DOMAIN_TAGS, false, excluded)
    }

    pub fn test_external(excluded: Vec<String>) -> Self {
        Self::with(
            parser_ids::TEST_EXTERNAL_DOMAIN_TYPE,
            EXTERNAL_TAGS,
            true,
            excluded,
        )
    }

    fn with(
        id: &'static str,
        root_tags: &'static [&'static str],
        external: bool,
        excluded: Vec<String>,
    ) -> Self {
        Self {
            id,
            root_tags,
            external,
            excluded,
        }
    }

    fn parse_root(&self, root: &XmlElement, location: &str) -> Result<DomainTypeModel> {
        let Some(type_id) = root.first_attr(&["id", "name"]) else {
            return Err(ParseError::MalformedModel {
                path: location.into(),
                reason: format!("<{}> without id", root.name),
            });
        };

        let header = ModelHeader::new(type_id, root.attr("name").map(str::to_string), location);
        let mut model = DomainTypeModel::new(header, self.external);

        for element in root.descendants() {
            if element.local_name() != "property" {
                continue;
            }
            if let Some(property) = parse_property(element, type_id, location) {
                model.add_property(property);
            }
        }

        Ok(model)
    }
}

fn parse_property(element: &XmlElement, type_id: &str, location: &str) -> Option<PropertyModel> {
    let Some(raw_id) = element.first_attr(&["id", "name"]) else {
        warn!(domain_type = type_id, location, "property without id or name skipped");
        return None;
    };

    let id = if raw_id.contains('.') {
        raw_id.to_string()
    } else {
        format!("{type_id}.{raw_id}")
    };
    let name = element.attr("name").unwrap_or(raw_id).to_string();

    let property_type = element.attr("type").and_then(|type_name| {
        let mapped = map_model_type(type_name);
        if mapped.is_none() {
            warn!(property = %id, type_name, "unknown model type, property left untyped");
        }
        mapped
    });
    let property_ref = element
        .first_attr(&["ref", "property-ref"])
        .map(str::to_string);

    Some(PropertyModel {
        id,
        name,
        property_type,
        property_ref,
    })
}

impl ModelParser for DomainTypeParser {
    fn id(&self) -> &'static str {
        self.id
    }

    fn supported_root_tags(&self) -> &[&'static str] {
        self.root_tags
    }

    fn excluded_models(&self) -> &[String] {
        &self.excluded
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Model>> {
        let root = read_document(path)?;
        let location = path.display().to_string();
        let model = self.parse_root(&root, &location)?;
        Ok(vec![Model::DomainType(model)])
    }

    fn merge(&self, primary: &mut Model, other: &Model) -> Result<()> {
        let kind = primary.kind();
        match (primary.as_domain_type_mut(), other.as_domain_type()) {
            (Some(primary), Some(other)) => {
                primary.absorb(other);
                Ok(())
            }
            _ => Err(CoreError::KindMismatch {
                id: other.id().to_string(),
                primary: kind.as_str(),
                other: other.kind().as_str(),
            }
            .into()),
        }
    }
}
