use std::io::{self, Write};

use crate::renderer::traits::*;

/// Presentation codes for each [`Style`].
///
/// Every styled piece is written as `code(style)`, the text, then `normal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
    pub name: &'static str,
    pub end_name: &'static str,
    pub attribute: &'static str,
    pub data: &'static str,
    pub comment: &'static str,
    pub directive: &'static str,
    pub indentation: &'static str,
    pub normal: &'static str,
}

impl StyleTable {
    /// Bold colors on a black background.
    pub fn ansi() -> Self {
        Self {
            name: "\x1b[1;31;40m",
            end_name: "\x1b[1;31;40m",
            attribute: "\x1b[1;34;40m",
            data: "\x1b[1;32;40m",
            comment: "\x1b[1;33;40m",
            directive: "\x1b[1;36;40m",
            // black on black, so indentation never shows as visible characters
            indentation: "\x1b[0;30;40m",
            normal: "\x1b[0;37;40m",
        }
    }

    /// No escape codes at all.
    pub fn plain() -> Self {
        Self {
            name: "",
            end_name: "",
            attribute: "",
            data: "",
            comment: "",
            directive: "",
            indentation: "",
            normal: "",
        }
    }

    pub fn code(&self, style: Style) -> &'static str {
        match style {
            Style::Name => self.name,
            Style::EndName => self.end_name,
            Style::Attribute => self.attribute,
            Style::Data => self.data,
            Style::Comment => self.comment,
            Style::Directive => self.directive,
            Style::Indentation => self.indentation,
            Style::Reset => self.normal,
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::ansi()
    }
}

/// [`OutputSink`] that realizes styles through a [`StyleTable`] on any writer.
pub struct StyledWriter<W: Write> {
    out: W,
    styles: StyleTable,
}

impl<W: Write> StyledWriter<W> {
    pub fn new(out: W, styles: StyleTable) -> Self {
        Self { out, styles }
    }

    /// Restore normal presentation, e.g. after a run was aborted mid-line.
    pub fn reset(&mut self) -> io::Result<()> {
        self.out.write_all(self.styles.normal.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for StyledWriter<W> {
    fn write_styled(&mut self, style: Style, text: &str) -> io::Result<()> {
        if style == Style::Reset {
            return self.reset();
        }
        write!(self.out, "{}{}{}", self.styles.code(style), text, self.styles.normal)
    }

    fn line_break(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }
}
