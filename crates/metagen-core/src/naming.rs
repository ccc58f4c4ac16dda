//! Java naming rules for generated meta-model sources.

use heck::{ToShoutySnakeCase, ToUpperCamelCase};

use crate::handler::HandlerType;
use crate::model::{
    DomainTypeModel, ModelHeader, ProcessModel, StartStateModel, ViewComponentModel, ViewModel,
    ViewStateModel,
};
use crate::property::PropertyModel;

const CLASS_NAME_BASE: &str = "MetaModel";
const PROCESS_PREFIX: &str = "p_";
const START_STATE_PREFIX: &str = "ss_";
const VIEW_STATE_PREFIX: &str = "vs_";
const VIEW_PREFIX: &str = "v_";

/// Derives class, constant and variable names for one handler type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingStrategy {
    handler_type: HandlerType,
}

impl NamingStrategy {
    pub fn new(handler_type: HandlerType) -> Self {
        Self { handler_type }
    }

    pub fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    /// Constant name for an arbitrary model name (e.g. a relation).
    pub fn constant_name_for_model(&self, header: &ModelHeader) -> String {
        let name = replace_special_characters(header.display_name());

        if name.chars().count() == 2 {
            return name.to_uppercase();
        }
        if name.to_uppercase() == name {
            return name;
        }

        constant_case(&name)
    }

    pub fn class_name_for_domain_type(&self, model: &DomainTypeModel) -> String {
        format!(
            "{}{}{}",
            java_class_name(model.header.display_name()),
            self.handler_type.infix(),
            CLASS_NAME_BASE
        )
    }

    pub fn constant_name_for_domain_type(&self, model: &DomainTypeModel) -> String {
        java_constant(model.header.display_name())
    }

    pub fn constant_name_for_property(&self, property: &PropertyModel) -> String {
        java_constant(&property.name)
    }

    pub fn class_name_for_process(&self, model: &ProcessModel) -> String {
        format!(
            "{}ProcessMetaModel",
            class_name_with_prefix(&model.header, PROCESS_PREFIX, None)
        )
    }

    pub fn constant_name_for_process(&self, model: &ProcessModel) -> String {
        constant_name_with_prefix(&model.header, PROCESS_PREFIX)
    }

    pub fn constant_name_for_start_state(&self, model: &StartStateModel) -> String {
        constant_name_with_prefix(&model.header, START_STATE_PREFIX)
    }

    pub fn constant_name_for_view_state(&self, model: &ViewStateModel) -> String {
        constant_name_with_prefix(&model.header, VIEW_STATE_PREFIX)
    }

    /// Class name of the view rendered by a view state.
    pub fn class_name_for_view_state(&self, model: &ViewStateModel) -> Option<String> {
        let reference = model.view_reference.as_deref()?;
        let header = ModelHeader::new(reference, None, model.header.location.clone());
        Some(format!(
            "{}View",
            class_name_with_prefix(&header, PROCESS_PREFIX, Some(VIEW_PREFIX))
        ))
    }

    pub fn class_name_for_view(&self, model: &ViewModel) -> String {
        format!(
            "{}View",
            class_name_with_prefix(&model.header, PROCESS_PREFIX, Some(VIEW_PREFIX))
        )
    }

    /// View class name qualified by the process that renders it.
    pub fn class_name_for_view_with_process(
        &self,
        view: &ViewModel,
        process: &ProcessModel,
    ) -> String {
        format!(
            "{}{}",
            class_name_with_prefix(&process.header, PROCESS_PREFIX, None),
            self.class_name_for_view(view)
        )
    }

    pub fn variable_name_for_component(&self, component: &ViewComponentModel) -> String {
        let mut identifier = component.identifier.as_str();

        if let Some(view_start) = identifier.find(VIEW_PREFIX) {
            if let Some(offset) = identifier[view_start..].find('.') {
                identifier = &identifier[view_start + offset..];
            }
        }

        format!(
            "{}{}",
            lower_first(&java_class_name(&component.tag_name)),
            java_class_name(identifier)
        )
    }
}

fn constant_name_with_prefix(header: &ModelHeader, prefix: &str) -> String {
    if let Some(name) = header.name.as_deref() {
        return java_constant(name);
    }

    java_constant(strip_through_prefix(&header.id, prefix))
}

fn class_name_with_prefix(header: &ModelHeader, prefix: &str, remove: Option<&str>) -> String {
    if let Some(name) = header.name.as_deref() {
        let name = match remove {
            Some(part) => name.replacen(part, "", 1),
            None => name.to_string(),
        };
        return java_class_name(&name);
    }

    let mut id = header.id.clone();
    if id.contains(prefix) {
        if let Some(part) = remove {
            id = id.replacen(part, "", 1);
        }
        id = strip_through_prefix(&id, prefix).to_string();
    }

    java_class_name(&id)
}

fn strip_through_prefix<'a>(value: &'a str, prefix: &str) -> &'a str {
    match value.find(prefix) {
        Some(index) => &value[index + prefix.len()..],
        None => value,
    }
}

/// Convert a model name into an UpperCamel Java class name.
pub fn java_class_name(value: &str) -> String {
    let value = replace_special_characters(value);

    if value.contains('_') {
        value.to_upper_camel_case()
    } else {
        upper_first(&value)
    }
}

/// Convert a model name into an UPPER_SNAKE Java constant name.
pub fn java_constant(value: &str) -> String {
    constant_case(&replace_special_characters(value))
}

fn constant_case(value: &str) -> String {
    if value.contains('_') {
        value.to_uppercase()
    } else {
        value.to_shouty_snake_case()
    }
}

fn replace_special_characters(value: &str) -> String {
    let replaced: String = value
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| match c {
            '.' | '-' | '/' | '(' | ')' => '_',
            other => other,
        })
        .collect();

    match replaced.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("A{replaced}"),
        _ => replaced,
    }
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
