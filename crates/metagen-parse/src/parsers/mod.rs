//! Built-in XML model parsers.

mod domain;
mod process;
mod relation;
mod view;

pub use domain::DomainTypeParser;
pub use process::ProcessParser;
pub use relation::RelationParser;
pub use view::{ComponentIdentifier, ComponentQuery, ConvenienceMethod, ViewParser, component_query};
