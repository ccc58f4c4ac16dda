use std::path::Path;

use metagen_core::{
    Error as CoreError, Model, ModelHeader, ViewComponentModel, ViewModel, parser_ids,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ParseError, Result};
use crate::parser::{ModelParser, ParserSettings};
use crate::xml::read_document;

/// Attribute that identifies a component inside its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentIdentifier {
    Id,
    Name,
}

impl ComponentIdentifier {
    fn attribute(&self) -> &'static str {
        match self {
            ComponentIdentifier::Id => "id",
            ComponentIdentifier::Name => "name",
        }
    }
}

/// Helper methods generated for a component variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvenienceMethod {
    Getter,
    Clickable,
    Visible,
}

/// How a UI component of a view is located by generated test code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentQuery {
    pub tag: &'static str,
    pub identified_by: ComponentIdentifier,
    pub query: &'static str,
    pub methods: &'static [ConvenienceMethod],
}

use ConvenienceMethod::{Clickable, Getter, Visible};

const COMPONENT_QUERIES: &[ComponentQuery] = &[
    query("link", ComponentIdentifier::Name, "LINK_BY_LABEL", &[Getter, Clickable]),
    query("checkbox", ComponentIdentifier::Id, "CHECK_BOX_BY_ID", &[Getter, Clickable]),
    query("datagrid", ComponentIdentifier::Name, "DATAGRID_BY_HEADING", &[Getter]),
    query("error-message-list", ComponentIdentifier::Name, "ERROR_LIST", &[Getter]),
    query(
        "export-button",
        ComponentIdentifier::Id,
        "BUTTON_BY_ID",
        &[Getter, Clickable, Visible],
    ),
    query("help-button", ComponentIdentifier::Id, "HELP_BUTTON_BY_ID", &[Getter]),
    query("list-iterator", ComponentIdentifier::Id, "LIST_ITERATOR", &[Getter]),
    query("multi-connect", ComponentIdentifier::Id, "MULTI_CONNECT_BY_ID", &[Getter]),
    query("plain-text-property", ComponentIdentifier::Id, "ELEMENT_BY_ID", &[Getter]),
    query("tab-set", ComponentIdentifier::Id, "TABSET_BY_ID", &[Getter]),
    query("textarea", ComponentIdentifier::Id, "TEXT_AREA_BY_ID", &[Getter]),
    query("text-field", ComponentIdentifier::Id, "TEXT_FIELD_BY_ID", &[Getter, Visible]),
];

const fn query(
    tag: &'static str,
    identified_by: ComponentIdentifier,
    query: &'static str,
    methods: &'static [ConvenienceMethod],
) -> ComponentQuery {
    ComponentQuery {
        tag,
        identified_by,
        query,
        methods,
    }
}

/// Look up the query for a component tag.
pub fn component_query(tag: &str) -> Option<&'static ComponentQuery> {
    COMPONENT_QUERIES.iter().find(|entry| entry.tag == tag)
}

/// Parses view definitions and collects their known components.
#[derive(Debug, Clone, Default)]
pub struct ViewParser {
    excluded: Vec<String>,
    settings: ParserSettings,
}

impl ViewParser {
    pub fn new(excluded: Vec<String>) -> Self {
        Self {
            excluded,
            settings: ParserSettings::new(),
        }
    }
}

impl ModelParser for ViewParser {
    fn id(&self) -> &'static str {
        parser_ids::VIEW
    }

    fn supported_root_tags(&self) -> &[&'static str] {
        &["view"]
    }

    fn configure(&mut self, settings: &ParserSettings) {
        self.settings = settings.clone();
    }

    fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    fn excluded_models(&self) -> &[String] {
        &self.excluded
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Model>> {
        let root = read_document(path)?;
        let location = path.display().to_string();

        let Some(id) = root.attr("id") else {
            return Err(ParseError::MalformedModel {
                path: path.to_path_buf(),
                reason: "<view> without id".to_string(),
            });
        };
        let mut view = ViewModel::new(ModelHeader::new(
            id,
            root.attr("name").map(str::to_string),
            location.as_str(),
        ));

        for element in root.descendants() {
            let tag = element.local_name();
            let Some(query) = component_query(tag) else {
                continue;
            };
            let Some(identifier) = element.attr(query.identified_by.attribute()) else {
                warn!(view = id, tag, "component without identifier skipped");
                continue;
            };

            view.components.push(ViewComponentModel {
                tag_name: tag.to_string(),
                identifier: identifier.to_string(),
                label: element.attr("label").map(str::to_string),
            });
        }

        debug!(view = id, components = view.components.len(), "view components collected");
        Ok(vec![Model::View(view)])
    }

    fn merge(&self, primary: &mut Model, other: &Model) -> Result<()> {
        let kind = primary.kind();
        match (primary, other) {
            (Model::View(primary), Model::View(other)) => {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_known_components() {
        let text_field = component_query("text-field").expect("text-field");
        assert_eq!(text_field.query, "TEXT_FIELD_BY_ID");
        assert_eq!(text_field.identified_by, ComponentIdentifier::Id);
        assert_eq!(text_field.methods, &[Getter, Visible]);

        let link = component_query("link").expect("link");
        assert_eq!(link.identified_by, ComponentIdentifier::Name);
        assert!(component_query("marquee").is_none());
    }

    #[test]
    fn collects_components_by_identifier_attribute() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("edit.xml");
        std::fs::write(
            &path,
            r#"<view id="p_order.v_edit">
                 <panel>
                   <text-field id="p_order.v_edit.customerName" label="Customer"/>
                   <link name="save"/>
                   <link id="ignored-without-name"/>
                   <marquee id="m"/>
                 </panel>
               </view>"#,
        )
        .expect("write");

        let models = ViewParser::default().parse_file(&path).expect("parse");
        let view = models[0].as_view().expect("view");

        assert_eq!(view.components.len(), 2);
        assert_eq!(view.components[0].label.as_deref(), Some("Customer"));
        assert_eq!(view.components[1].tag_name, "link");
        assert_eq!(view.components[1].identifier, "save");
    }

    #[test]
    fn configuration_is_exposed_as_settings() {
        let mut parser = ViewParser::default();
        let mut settings = ParserSettings::new();
        settings.insert(
            parser_ids::CONFIG_KEY_EXTENDS_CLASS.to_string(),
            "CustomView".to_string(),
        );

        parser.configure(&settings);

        assert_eq!(parser.setting(parser_ids::CONFIG_KEY_EXTENDS_CLASS), Some("CustomView"));
    }
}
