//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema resolution or validation error.
    #[error("schema error: {0}")]
    Schema(#[from] sobind_schema::SchemaError),

    /// A shortened Fortran name collided with another operation's name.
    #[error("cannot shorten '{name}' to a unique Fortran identifier")]
    UnmanglableName {
        /// The offending operation name.
        name: String,
    },

    /// IO error while writing or cleaning the output tree.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
