//! Error types for the binding layer.
//!
//! Native failures never escape as raw status codes: every non-zero
//! return is resolved against a per-operation code table and surfaced
//! as a typed [`Error`].

use std::os::raw::c_int;

use thiserror::Error;

/// Errors surfaced by the binding layer.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Unrecognized calling-convention selector.
    #[error("Unsupported calling convention: {0:?}")]
    UnsupportedConvention(String),

    /// The native module could not be loaded, or lacks a required export.
    #[error("Failed to load library {path:?}: {reason}")]
    LoadFailure { path: String, reason: String },

    /// The invoked operation is not present in the prototype registry.
    /// Programmer error; never produced by the native side.
    #[error("Unknown method/function: {0:?}")]
    UnknownMethod(String),

    /// A native call returned a non-zero status code.
    #[error("{message} (metodo {method:?} retornou {code})")]
    NativeCallFailure {
        method: String,
        code: i32,
        message: String,
    },

    /// A local precondition was violated before any native call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The native module reported success but its response failed to
    /// parse. Always fatal to the call that produced it.
    #[error("Resposta mal formada; {0}")]
    MalformedResponse(String),
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Resolve a non-zero status against a per-operation code table,
    /// falling back to a generic message naming the raw code.
    pub(crate) fn native(method: &str, code: c_int, table: &[(c_int, &str)]) -> Self {
        let message = table
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, message)| (*message).to_string())
            .unwrap_or_else(|| format!("Codigo de retorno inesperado: {}", code));
        Error::NativeCallFailure {
            method: method.to_string(),
            code,
            message,
        }
    }
}
