use std::path::PathBuf;

use metagen_parse::ParseError;
use thiserror::Error;

/// Errors emitted while rendering and writing a single artifact.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("failed to render template '{template}': {reason}")]
    Render { template: String, reason: String },
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("handler '{handler}' cannot generate {kind} model '{id}'")]
    UnsupportedModel {
        handler: &'static str,
        kind: &'static str,
        id: String,
    },
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("property '{dependent}' references '{target}' which has no type information")]
    UnresolvableReference { dependent: String, target: String },
    #[error("cyclic property reference: {chain}")]
    CyclicReference { chain: String },
    #[error("worker failed: {0}")]
    Worker(String),
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
