use std::io::Write;

use tracing::{debug, trace};

use crate::error::{RenderError, TokenSourceError};
use crate::parser::tokenizer::Tokenizer;
use crate::parser::types::{local_name, Attribute, Token};
use crate::renderer::components::{StyleTable, StyledWriter};
use crate::renderer::traits::*;

/// Leading whitespace emitted for one level of nesting.
pub const INDENT_UNIT: &str = "   ";

/// Mutable state of one rendering pass: the open-element stack and the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    stack: Vec<String>,
    last_write_depth: usize,
    at_line_start: bool,
}

impl RenderState {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            last_write_depth: 0,
            at_line_start: true,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Currently open elements, outermost first.
    pub fn open_elements(&self) -> &[String] {
        &self.stack
    }

    /// Depth of the most recently rendered start tag.
    pub fn last_write_depth(&self) -> usize {
        self.last_write_depth
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Push an element; returns the depth it was opened at.
    fn push(&mut self, name: &str) -> usize {
        let depth = self.stack.len();
        self.stack.push(name.to_string());
        depth
    }

    /// Pop the innermost element, which must be `name`; returns the depth after the pop.
    fn pop(&mut self, name: &str) -> Result<usize, RenderError> {
        match self.stack.last() {
            Some(top) if top == name => {
                self.stack.pop();
                Ok(self.stack.len())
            }
            Some(top) => Err(RenderError::StackMismatch {
                expected: top.clone(),
                found: name.to_string(),
            }),
            None => Err(RenderError::StackUnderflow {
                found: name.to_string(),
            }),
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a token stream as indented, styled output.
///
/// Start tags open a new line indented by their nesting depth. Text,
/// comments and end tags continue the current line, except that an end tag
/// closing an element shallower than the last start tag begins its own
/// indented line.
pub struct IndentedRenderer<S> {
    sink: S,
    options: RenderOptions,
    state: RenderState,
}

impl<S: OutputSink> IndentedRenderer<S> {
    pub fn new(sink: S, options: RenderOptions) -> Self {
        Self {
            sink,
            options,
            state: RenderState::new(),
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Render a single token.
    ///
    /// On a nesting violation nothing is written for the offending token and
    /// the state is left as it was before the call.
    pub fn process(&mut self, token: &Token) -> Result<(), RenderError> {
        trace!(kind = token.kind(), depth = self.state.depth(), "render token");
        match token {
            Token::ElementStart { name, attributes } => self.start_element(name, attributes),
            Token::ElementEnd { name } => self.end_element(name),
            Token::Text(content) => self.text(content),
            Token::Comment(content) => self.comment(content),
            Token::Directive(content) => self.directive(content),
            Token::ProcessingInstruction { target, .. } => {
                trace!(pi_target = %target, "processing instruction not rendered");
                Ok(())
            }
        }
    }

    /// Write the closing reset and hand the sink back.
    ///
    /// Fails with [`RenderError::UnclosedElements`] if elements are still
    /// open; the reset has been written by then.
    pub fn finish(mut self) -> Result<S, RenderError> {
        self.write(Style::Reset, "")?;
        self.line_break()?;

        if !self.state.stack.is_empty() {
            let open = std::mem::take(&mut self.state.stack);
            return Err(RenderError::UnclosedElements { open });
        }
        Ok(self.sink)
    }

    fn write(&mut self, style: Style, text: &str) -> Result<(), RenderError> {
        self.sink.write_styled(style, text)?;
        if !text.is_empty() {
            self.state.at_line_start = false;
        }
        Ok(())
    }

    fn line_break(&mut self) -> Result<(), RenderError> {
        self.sink.line_break()?;
        self.state.at_line_start = true;
        Ok(())
    }

    fn indent(&mut self, depth: usize) -> Result<(), RenderError> {
        for _ in 0..depth {
            self.write(Style::Indentation, INDENT_UNIT)?;
        }
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), RenderError> {
        let depth = self.state.push(name);
        self.line_break()?;
        self.indent(depth)?;
        self.write(Style::Name, &format!("{} ", local_name(name)))?;
        for attribute in attributes {
            let pair = format!("({} = {}) ", local_name(&attribute.name), attribute.value);
            self.write(Style::Attribute, &pair)?;
        }
        self.state.last_write_depth = depth;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), RenderError> {
        let depth = self.state.pop(name)?;
        if depth < self.state.last_write_depth {
            // The previous end tag usually left the cursor on a fresh line already.
            if !self.state.at_line_start {
                self.line_break()?;
            }
            self.indent(depth)?;
        }
        self.write(Style::EndName, &format!("/{}", local_name(name)))?;
        self.line_break()
    }

    fn text(&mut self, content: &str) -> Result<(), RenderError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.write(Style::Data, &format!("{} ", trimmed))
    }

    fn comment(&mut self, content: &str) -> Result<(), RenderError> {
        if !self.options.show_comments {
            return Ok(());
        }
        // Comments leave the line cursor untouched: output with and without
        // them differs only in the comment text.
        self.sink.write_styled(Style::Comment, content)?;
        Ok(())
    }

    fn directive(&mut self, content: &str) -> Result<(), RenderError> {
        self.write(Style::Directive, content)?;
        self.line_break()
    }
}

/// Render a whole token stream into `sink`.
///
/// Stops at the first token-source error or nesting violation; whatever was
/// written before that point stays in the sink.
pub fn render<I, S>(tokens: I, sink: &mut S, options: RenderOptions) -> Result<(), RenderError>
where
    I: IntoIterator<Item = Result<Token, TokenSourceError>>,
    S: OutputSink + ?Sized,
{
    let mut renderer = IndentedRenderer::new(sink, options);
    let mut count = 0usize;
    for token in tokens {
        renderer.process(&token?)?;
        count += 1;
    }
    renderer.finish()?;
    debug!(tokens = count, show_comments = options.show_comments, "rendered document");
    Ok(())
}

/// Tokenize `document` and render it to `out`, then flush.
///
/// After a failed render the normal style is restored before flushing, so a
/// terminal is not left colored. The render error is the one reported; a
/// failing flush only surfaces when rendering itself succeeded.
pub fn render_document<W: Write>(
    document: &str,
    out: W,
    styles: StyleTable,
    options: RenderOptions,
) -> Result<W, RenderError> {
    let mut sink = StyledWriter::new(out, styles);
    let result = render(Tokenizer::new(document), &mut sink, options);
    if result.is_err() {
        if let Err(err) = sink.reset() {
            debug!(error = %err, "could not restore normal style");
        }
    }
    let flushed = sink.flush();

    result?;
    flushed?;
    Ok(sink.into_inner())
}
