//! Core contracts for metagen.
//!
//! This crate defines the parsed model types, property typing, the naming
//! strategy used for generated Java sources, and the identifiers shared by
//! parsers, handlers and the CLI.

pub mod error;
pub mod handler;
pub mod model;
pub mod naming;
pub mod property;

pub use error::{Error, Result};
pub use handler::{HandlerType, parser_ids};
pub use model::{
    DomainTypeModel, Model, ModelHeader, ModelKind, ProcessModel, RelationModel, StartStateModel,
    ViewComponentModel, ViewModel, ViewStateModel,
};
pub use naming::NamingStrategy;
pub use property::{DEFAULT_PROPERTY_TYPE, PropertyModel, PropertyType, map_model_type};
