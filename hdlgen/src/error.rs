//! Errors that abort a generation run.

use crate::hdl::Dialect;

use thiserror::Error;

use std::io;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// A fatal condition. Any of these aborts the run for the dialect being generated; a run for
/// another dialect is unaffected.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No binding can emit this component/attribute combination in the requested dialect.
    #[error("Component \"{component}\" ({attributes}) cannot be generated in {dialect}.")]
    UnsupportedComponent {
        component: String,
        attributes: String,
        dialect: Dialect,
    },

    /// Two connected endpoints declare different bit widths.
    #[error("Width mismatch in circuit \"{circuit}\": {what} ({expected} bit(s) vs {found} bit(s)).")]
    WidthMismatch {
        circuit: String,
        what: String,
        expected: u32,
        found: u32,
    },

    /// Two distinct objects in one scope ended up with the same identifier.
    #[error("Identifier \"{identifier}\" is used by both {first} and {second} in \"{scope}\".")]
    IdentifierCollision {
        identifier: String,
        scope: String,
        first: String,
        second: String,
    },

    /// A circuit instantiates itself, directly or through other circuits.
    #[error("Circuit \"{circuit}\" has a recursive definition formed by an instance of itself via {path}.")]
    RecursiveCircuit { circuit: String, path: String },

    /// A generator invariant was violated. Always a defect in the generator itself.
    #[error("INTERNAL ERROR: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl GenerationError {
    pub(crate) fn internal(message: impl Into<String>) -> GenerationError {
        GenerationError::Internal(message.into())
    }
}
