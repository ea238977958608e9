//! Error types shared by the token source, the renderer and the binary.
//!
//! The library reports typed errors so callers can match on the failure. The
//! binary composes them with `anyhow` and maps the root cause to a process
//! exit code with [`exit_code`].

use thiserror::Error;

use crate::cli::ArgumentError;

/// Exit code for a bad invocation with the wrong number of arguments.
pub const EXIT_USAGE: u8 = 1;
/// Exit code for a missing or unreadable input file.
pub const EXIT_IO: u8 = 2;
/// Exit code for input the token source rejects.
pub const EXIT_DECODE: u8 = 3;
/// Exit code for an element-nesting violation.
pub const EXIT_NESTING: u8 = 4;

/// Failure reported by the token source.
#[derive(Debug, Error)]
pub enum TokenSourceError {
    #[error("input is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// Markup the XML reader rejected.
    #[error("malformed XML at line {line}, column {column}")]
    Xml {
        line: usize,
        column: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// Well-formed markup placed where the document structure forbids it.
    #[error("{reason} at line {line}, column {column}")]
    NotWellFormed {
        reason: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unexpected end of input {context} at line {line}, column {column}")]
    UnexpectedEof {
        context: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unexpected end element </{name}> at line {line}, column {column}")]
    UnexpectedEndTag {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("unsupported document encoding {encoding:?}")]
    UnsupportedEncoding { encoding: String },
}

/// Failure of a rendering pass.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An end token did not close the innermost open element.
    #[error("{found} was not at the top of the stack (expected {expected})")]
    StackMismatch { expected: String, found: String },

    /// An end token arrived while no element was open.
    #[error("{found} was closed but no element is open")]
    StackUnderflow { found: String },

    /// The token stream ended while elements were still open.
    #[error("input ended with unclosed elements: {}", .open.join(", "))]
    UnclosedElements { open: Vec<String> },

    #[error("malformed document")]
    TokenSource(#[from] TokenSourceError),

    #[error("failed to write output")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Whether the failure is a nesting violation detected by the renderer.
    pub fn is_nesting_violation(&self) -> bool {
        matches!(
            self,
            RenderError::StackMismatch { .. }
                | RenderError::StackUnderflow { .. }
                | RenderError::UnclosedElements { .. }
        )
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            RenderError::StackMismatch { .. }
            | RenderError::StackUnderflow { .. }
            | RenderError::UnclosedElements { .. } => EXIT_NESTING,
            RenderError::TokenSource(_) => EXIT_DECODE,
            RenderError::Io(_) => EXIT_IO,
        }
    }
}

/// Map the root cause of a failed run to the process exit code.
///
/// Errors wrapped with `anyhow::Context` still downcast to their underlying
/// type, so context added by the binary does not change the mapping.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(arg_err) = err.downcast_ref::<ArgumentError>() {
        return arg_err.exit_code();
    }
    if let Some(render_err) = err.downcast_ref::<RenderError>() {
        return render_err.exit_code();
    }
    if err.downcast_ref::<TokenSourceError>().is_some() {
        return EXIT_DECODE;
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return EXIT_IO;
    }
    EXIT_USAGE
}
