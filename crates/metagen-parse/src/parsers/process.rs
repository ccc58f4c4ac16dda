use std::path::Path;

use metagen_core::{
    Error as CoreError, Model, ModelHeader, ProcessModel, StartStateModel, ViewStateModel,
    parser_ids,
};
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::parser::ModelParser;
use crate::xml::{XmlElement, read_document};

/// Parses process definitions with their start and view states.
#[derive(Debug, Clone, Default)]
pub struct ProcessParser {
    excluded: Vec<String>,
}

impl ProcessParser {
    pub fn new(excluded: Vec<String>) -> Self {
        Self { excluded }
    }
}

fn state_header(element: &XmlElement, location: &str) -> Option<ModelHeader> {
    let Some(id) = element.attr("id") else {
        warn!(location, state = %element.name, "state without id skipped");
        return None;
    };
    Some(ModelHeader::new(
        id,
        element.attr("name").map(str::to_string),
        location,
    ))
}

impl ModelParser for ProcessParser {
    fn id(&self) -> &'static str {
        parser_ids::PROCESS
    }

    fn supported_root_tags(&self) -> &[&'static str] {
        &["process"]
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
                reason: "<process> without id".to_string(),
            });
        };
        let mut process = ProcessModel::new(ModelHeader::new(
            id,
            root.attr("name").map(str::to_string),
            location.as_str(),
        ));

        for element in root.descendants() {
            match element.local_name() {
                "start-state" => {
                    if let Some(header) = state_header(element, &location) {
                        process.start_states.push(StartStateModel { header });
                    }
                }
                "view-state" => {
                    if let Some(header) = state_header(element, &location) {
                        process.view_states.push(ViewStateModel {
                            header,
                            view_reference: element
                                .first_attr(&["view", "view-ref"])
                                .map(str::to_string),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(vec![Model::Process(process)])
    }

    fn merge(&self, primary: &mut Model, other: &Model) -> Result<()> {
        let kind = primary.kind();
        match (primary, other) {
            (Model::Process(primary), Model::Process(other)) => {
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
