use std::io;

/// Presentation class of a piece of rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Name,
    EndName,
    Attribute,
    Data,
    Comment,
    Directive,
    Indentation,
    /// Restores the sink's normal presentation; carries no text.
    Reset,
}

/// Destination for rendered output.
///
/// Implementations must preserve the order of calls exactly; how a style is
/// realized (color codes, nothing at all) is up to the sink.
pub trait OutputSink {
    fn write_styled(&mut self, style: Style, text: &str) -> io::Result<()>;
    fn line_break(&mut self) -> io::Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_styled(&mut self, style: Style, text: &str) -> io::Result<()> {
        (**self).write_styled(style, text)
    }

    fn line_break(&mut self) -> io::Result<()> {
        (**self).line_break()
    }
}

/// Configuration for a rendering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_comments: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self { show_comments: true }
    }

    pub fn with_comments(self, show_comments: bool) -> Self {
        Self { show_comments }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}
