//! # xmlview
//!
//! Displays a well-formed XML document as colored, indented text. A
//! [`Tokenizer`](parser::Tokenizer) turns the document into a token stream and
//! the [`IndentedRenderer`](renderer::IndentedRenderer) lays the tokens out,
//! checking element nesting with an explicit stack as it goes.

pub mod cli;
pub mod error;
pub mod parser;
pub mod renderer;


pub use error::{RenderError, TokenSourceError};
pub use parser::{decode_document, Attribute, Token, Tokenizer};
pub use renderer::{render, render_document, IndentedRenderer, OutputSink, RenderOptions, Style, StyleTable, StyledWriter};
