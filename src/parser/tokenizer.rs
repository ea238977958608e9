use std::iter::FusedIterator;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::TokenSourceError;
use crate::parser::types::{Attribute, Token};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Turn raw document bytes into text, dropping a leading byte-order mark.
pub fn decode_document(mut bytes: Vec<u8>) -> Result<String, TokenSourceError> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).map_err(|e| TokenSourceError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Lazy, forward-only token source over a decoded XML document.
///
/// Markup is read by `quick-xml`. On top of it the tokenizer checks the
/// document-level rules the reader leaves alone: a single root element, no
/// character data outside it, the XML declaration only at the very start and
/// no premature end of input. End-tag names are not compared here; that is
/// the renderer's stack check. After the first error the iterator is
/// exhausted.
pub struct Tokenizer<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    depth: usize,
    seen_root: bool,
    pending_end: Option<String>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.check_comments = true;
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        Self {
            input,
            reader,
            depth: 0,
            seen_root: false,
            pending_end: None,
            done: false,
        }
    }

    /// Number of elements opened and not yet closed.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenSourceError> {
        if let Some(name) = self.pending_end.take() {
            self.depth -= 1;
            return Ok(Some(Token::ElementEnd { name }));
        }

        let start = self.reader.buffer_position() as usize;
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(source) => {
                let offset = self.reader.error_position() as usize;
                return Err(self.xml_error(offset, source));
            }
        };

        let token = match event {
            Event::Start(tag) => self.start_element(start, &tag)?,
            Event::Empty(tag) => {
                let token = self.start_element(start, &tag)?;
                self.pending_end = Some(utf8(tag.name().as_ref()));
                token
            }
            Event::End(tag) => {
                let name = utf8(tag.name().as_ref());
                if self.depth == 0 {
                    let (line, column) = self.location(start);
                    return Err(TokenSourceError::UnexpectedEndTag { name, line, column });
                }
                self.depth -= 1;
                Token::ElementEnd { name }
            }
            Event::Text(text) => {
                if text.windows(3).any(|w| w == b"]]>") {
                    return Err(self.not_well_formed(start, "\"]]>\" in character data"));
                }
                if self.depth == 0 {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(self.not_well_formed(start, "character data outside the root element"));
                    }
                    Token::Text(utf8(&text))
                } else {
                    let content = text.unescape().map_err(|e| self.xml_error(start, e))?;
                    Token::Text(normalize_line_endings(&content))
                }
            }
            Event::CData(cdata) => {
                if self.depth == 0 {
                    return Err(self.not_well_formed(start, "CDATA section outside the root element"));
                }
                Token::Text(normalize_line_endings(&utf8(&cdata)))
            }
            Event::Comment(comment) => Token::Comment(utf8(&comment)),
            Event::DocType(doctype) => {
                if self.seen_root {
                    return Err(self.not_well_formed(start, "document type declaration after the root element"));
                }
                Token::Directive(format!("DOCTYPE {}", utf8(&doctype).trim()))
            }
            Event::Decl(decl) => {
                if start != 0 {
                    return Err(self.not_well_formed(start, "XML declaration not at the start of the document"));
                }
                if let Some(Ok(encoding)) = decl.encoding() {
                    let encoding = utf8(&encoding);
                    if !is_supported_encoding(&encoding) {
                        return Err(TokenSourceError::UnsupportedEncoding { encoding });
                    }
                }
                let content = utf8(&decl);
                Token::ProcessingInstruction {
                    target: "xml".to_string(),
                    content: content.strip_prefix("xml").unwrap_or(&content).trim().to_string(),
                }
            }
            Event::PI(pi) => {
                let target = utf8(pi.target());
                if target.eq_ignore_ascii_case("xml") {
                    return Err(self.not_well_formed(start, "XML declaration not at the start of the document"));
                }
                Token::ProcessingInstruction {
                    target,
                    content: utf8(pi.content()).trim().to_string(),
                }
            }
            Event::Eof => {
                if self.depth > 0 {
                    let (line, column) = self.location(self.input.len());
                    return Err(TokenSourceError::UnexpectedEof {
                        context: "with elements still open",
                        line,
                        column,
                    });
                }
                return Ok(None);
            }
        };
        Ok(Some(token))
    }

    fn start_element(&mut self, start: usize, tag: &BytesStart<'_>) -> Result<Token, TokenSourceError> {
        if self.depth == 0 && self.seen_root {
            return Err(self.not_well_formed(start, "more than one root element"));
        }

        let mut attributes = Vec::new();
        for attribute in tag.attributes() {
            let attribute = attribute.map_err(|e| self.xml_error(start, e))?;
            let value = attribute.unescape_value().map_err(|e| self.xml_error(start, e))?;
            attributes.push(Attribute::new(
                utf8(attribute.key.as_ref()),
                normalize_attribute_value(&value),
            ));
        }

        self.seen_root = true;
        self.depth += 1;
        Ok(Token::ElementStart {
            name: utf8(tag.name().as_ref()),
            attributes,
        })
    }

    /// 1-based line and column (in characters) of a byte offset.
    fn location(&self, offset: usize) -> (usize, usize) {
        let before = self.input.get(..offset).unwrap_or(self.input);
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |current| current.chars().count())
            + 1;
        (line, column)
    }

    fn xml_error(&self, offset: usize, source: impl Into<quick_xml::Error>) -> TokenSourceError {
        let (line, column) = self.location(offset);
        TokenSourceError::Xml {
            line,
            column,
            source: source.into(),
        }
    }

    fn not_well_formed(&self, offset: usize, reason: &'static str) -> TokenSourceError {
        let (line, column) = self.location(offset);
        TokenSourceError::NotWellFormed { reason, line, column }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, TokenSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => {
                trace!(kind = token.kind(), depth = self.depth, "token");
                Some(Ok(token))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Slices of a `&str` input split on markup delimiters, so always UTF-8.
fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_supported_encoding(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("us-ascii")
}

fn normalize_line_endings(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

/// Attribute-value normalization: every line break or tab becomes one space.
fn normalize_attribute_value(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}
