use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::property::PropertyModel;

/// Fields shared by every parsed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHeader {
    /// Unique within the owning parser's namespace.
    pub id: String,
    /// Explicit display name; absent when the XML omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absolute path of the source file.
    pub location: String,
    /// Id of the parser that produced the model; empty until stamped.
    #[serde(default)]
    pub parser_id: String,
}

impl ModelHeader {
    /// Create a header; blank names are treated as absent.
    pub fn new(id: impl Into<String>, name: Option<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.filter(|value| !value.trim().is_empty()),
            location: location.into(),
            parser_id: String::new(),
        }
    }

    /// The explicit name, or the id when no name was given.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Discriminant of [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    DomainType,
    Relation,
    Process,
    View,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::DomainType => "domain type",
            ModelKind::Relation => "relation",
            ModelKind::Process => "process",
            ModelKind::View => "view",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed declarative model definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    DomainType(DomainTypeModel),
    Relation(RelationModel),
    Process(ProcessModel),
    View(ViewModel),
}

impl Model {
    pub fn header(&self) -> &ModelHeader {
        match self {
            Model::DomainType(model) => &model.header,
            Model::Relation(model) => &model.header,
            Model::Process(model) => &model.header,
            Model::View(model) => &model.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ModelHeader {
        match self {
            Model::DomainType(model) => &mut model.header,
            Model::Relation(model) => &mut model.header,
            Model::Process(model) => &mut model.header,
            Model::View(model) => &mut model.header,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }

    pub fn name(&self) -> &str {
        self.header().display_name()
    }

    pub fn location(&self) -> &str {
        &self.header().location
    }

    pub fn parser_id(&self) -> &str {
        &self.header().parser_id
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::DomainType(_) => ModelKind::DomainType,
            Model::Relation(_) => ModelKind::Relation,
            Model::Process(_) => ModelKind::Process,
            Model::View(_) => ModelKind::View,
        }
    }

    pub fn as_domain_type(&self) -> Option<&DomainTypeModel> {
        match self {
            Model::DomainType(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_domain_type_mut(&mut self) -> Option<&mut DomainTypeModel> {
        match self {
            Model::DomainType(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationModel> {
        match self {
            Model::Relation(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_process(&self) -> Option<&ProcessModel> {
        match self {
            Model::Process(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&ViewModel> {
        match self {
            Model::View(model) => Some(model),
            _ => None,
        }
    }
}

/// Domain type (or external domain type) with its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTypeModel {
    #[serde(flatten)]
    pub header: ModelHeader,
    #[serde(default)]
    pub external: bool,
    /// Properties keyed by qualified property id.
    pub properties: BTreeMap<String, PropertyModel>,
}

impl DomainTypeModel {
    pub fn new(header: ModelHeader, external: bool) -> Self {
        Self {
            header,
            external,
            properties: BTreeMap::new(),
        }
    }

    pub fn add_property(&mut self, property: PropertyModel) {
        self.properties.insert(property.id.clone(), property);
    }

    pub fn find_property(&self, id: &str) -> Option<&PropertyModel> {
        self.properties.get(id)
    }

    /// Fold the properties of `other` into this model.
    ///
    /// Existing properties win, unless they carry neither a type nor a
    /// reference and the incoming definition does.
    pub fn absorb(&mut self, other: &DomainTypeModel) {
        for (id, property) in &other.properties {
            match self.properties.get_mut(id) {
                Some(existing) if existing.is_untyped() && !property.is_untyped() => {
                    *existing = property.clone();
                }
                Some(_) => {}
                None => {
                    self.properties.insert(id.clone(), property.clone());
                }
            }
        }
    }
}

/// Relation between domain types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationModel {
    #[serde(flatten)]
    pub header: ModelHeader,
}

/// Entry state of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStateModel {
    #[serde(flatten)]
    pub header: ModelHeader,
}

/// Process state rendering a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStateModel {
    #[serde(flatten)]
    pub header: ModelHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_reference: Option<String>,
}

/// Process with its start and view states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModel {
    #[serde(flatten)]
    pub header: ModelHeader,
    pub start_states: Vec<StartStateModel>,
    pub view_states: Vec<ViewStateModel>,
}

impl ProcessModel {
    pub fn new(header: ModelHeader) -> Self {
        Self {
            header,
            start_states: Vec::new(),
            view_states: Vec::new(),
        }
    }

    /// True if one of the view states renders `view_id`.
    pub fn references_view(&self, view_id: &str) -> bool {
        self.view_states
            .iter()
            .any(|state| state.view_reference.as_deref() == Some(view_id))
    }

    /// Union the states of `other` into this process, keyed by state id.
    pub fn absorb(&mut self, other: &ProcessModel) {
        for state in &other.start_states {
            if !self
                .start_states
                .iter()
                .any(|existing| existing.header.id == state.header.id)
            {
                self.start_states.push(state.clone());
            }
        }
        for state in &other.view_states {
            if !self
                .view_states
                .iter()
                .any(|existing| existing.header.id == state.header.id)
            {
                self.view_states.push(state.clone());
            }
        }
    }
}

/// A UI component found in a view definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewComponentModel {
    pub tag_name: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// View definition with its recognised components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    #[serde(flatten)]
    pub header: ModelHeader,
    pub components: Vec<ViewComponentModel>,
}

impl ViewModel {
    pub fn new(header: ModelHeader) -> Self {
        Self {
            header,
            components: Vec::new(),
        }
    }

    /// Union the components of `other`, keyed by tag and identifier.
    pub fn absorb(&mut self, other: &ViewModel) {
        for component in &other.components {
            let known = self.components.iter().any(|existing| {
                existing.tag_name == component.tag_name
                    && existing.identifier == component.identifier
            });
            if !known {
                self.components.push(component.clone());
            }
        }
    }
}
