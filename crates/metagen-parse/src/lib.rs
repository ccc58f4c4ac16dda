//! Model discovery and XML parsing for metagen.
//!
//! Candidate files are found below a model base directory, their root
//! element is sniffed, and every registered [`ModelParser`] that supports the
//! root element turns the file into models.

pub mod candidates;
pub mod error;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod sniff;
mod xml;

pub use candidates::{DEFAULT_MODEL_EXTENSION, ModelFileSet, default_model_directories, find_candidates};
pub use error::{ParseError, Result};
pub use parser::{ModelParser, ParserSettings, parse_model};
pub use parsers::{
    ComponentIdentifier, ComponentQuery, ConvenienceMethod, DomainTypeParser, ProcessParser,
    RelationParser, ViewParser, component_query,
};
pub use registry::{ModelCandidate, ParserRegistry, RegistryOptions};
pub use sniff::{resolve_root_element, resolve_root_element_name};
