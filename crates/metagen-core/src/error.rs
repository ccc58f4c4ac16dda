use thiserror::Error;

/// Core error type shared across metagen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Two models of different kinds were asked to merge.
    #[error("cannot merge {other} model '{id}' into {primary} model")]
    KindMismatch {
        id: String,
        primary: &'static str,
        other: &'static str,
    },
}

/// Convenience alias for results returned by metagen crates.
pub type Result<T> = std::result::Result<T, Error>;
