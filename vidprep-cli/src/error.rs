// ============================================================================
// vidprep-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reports vidprep-core errors directly. This module adds the result
// alias and a small extension trait for prefixing an error with what the CLI
// was doing when it happened.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: context prefixes for fallible calls

// ---- Internal crate imports ----
use vidprep_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Prefixes the error message with `context`.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let error: CoreError = e.into();
            CoreError::PathError(format!("{context}: {error}"))
        })
    }
}
