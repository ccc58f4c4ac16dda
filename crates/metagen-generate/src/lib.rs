//! Java meta-model generation for metagen.
//!
//! The [`Pipeline`] discovers model files, parses them concurrently, merges
//! duplicate definitions, resolves property references, orders the models
//! and renders one Java source per model plus the aggregate domain classes.

pub mod cleanup;
pub mod context;
pub mod errors;
pub mod executor;
pub mod handlers;
pub mod options;
pub mod pipeline;
pub mod postprocess;
pub mod source;
pub mod stages;
pub mod template;

pub use cleanup::clean_target;
pub use context::HandlerContext;
pub use errors::{GenerationError, PipelineError};
pub use executor::BatchExecutor;
pub use handlers::{DomainTypeHandler, ModelHandler, ProcessHandler, ViewHandler, handler_for};
pub use options::{GenerationSummary, GeneratorOptions};
pub use pipeline::Pipeline;
pub use postprocess::{PostProcessor, standard_post_processors};
pub use source::SourceGenerator;
pub use template::{HandlebarsRenderer, TemplateRenderer};
