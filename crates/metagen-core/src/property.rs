use serde::{Deserialize, Serialize};
use tracing::warn;

/// Type class assigned when a property reference cannot be found.
pub const DEFAULT_PROPERTY_TYPE: &str = "String";

/// Concrete Java type class of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyType {
    pub type_class: String,
}

impl PropertyType {
    pub fn new(type_class: impl Into<String>) -> Self {
        Self {
            type_class: type_class.into(),
        }
    }

    /// The fallback type used for dangling property references.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_PROPERTY_TYPE)
    }
}

/// A property of a domain type.
///
/// A property is typed either directly (`property_type`) or indirectly through
/// `property_ref`, the qualified id of another property whose type it shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyModel {
    /// Qualified id, `<domain-type-id>.<property-id>`.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_ref: Option<String>,
}

impl PropertyModel {
    pub fn typed(id: impl Into<String>, name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            property_type: Some(property_type),
            property_ref: None,
        }
    }

    pub fn referencing(
        id: impl Into<String>,
        name: impl Into<String>,
        property_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            property_type: None,
            property_ref: Some(property_ref.into()),
        }
    }

    /// True when the type still has to be looked up through the reference.
    pub fn needs_resolution(&self) -> bool {
        self.property_type.is_none() && self.property_ref.is_some()
    }

    /// True when neither a type nor a reference is present.
    pub fn is_untyped(&self) -> bool {
        self.property_type.is_none() && self.property_ref.is_none()
    }
}

/// Map a model type name to its Java type class.
///
/// GIS types are not supported and map to `Object`. Unknown names yield `None`.
pub fn map_model_type(type_name: &str) -> Option<PropertyType> {
    let type_class = match type_name {
        "Point" | "Polygon" => {
            warn!(type_name, "GIS domain types are not supported, using Object");
            "Object"
        }
        "Attachment" => "AttachmentInfo",
        "Binary" => "Byte",
        "Boolean" => "Boolean",
        "Currency" | "Number" => "BigDecimal",
        "Date" | "DateTime" | "Time" | "TimeZone" => "Date",
        "Double" => "Double",
        "Float" => "Float",
        "Integer" => "Integer",
        "Locale" => "Locale",
        "Long" => "Long",
        "Email" | "LargePlainText" | "LargeRichText" | "LargeWikiText" | "PlainText"
        | "RichText" | "Url" | "WikiText" => "String",
        _ => return None,
    };

    Some(PropertyType::new(type_class))
}
