/// One `name="value"` pair from a start tag, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Structural unit decoded from an XML document.
///
/// Names are kept qualified (`prefix:local`); use [`local_name`] for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    ElementStart {
        name: String,
        attributes: Vec<Attribute>,
    },
    ElementEnd {
        name: String,
    },
    Text(String),
    Comment(String),
    /// Body of a `<!...>` declaration such as `DOCTYPE html`.
    Directive(String),
    /// `<?target content?>`, including the XML declaration.
    ProcessingInstruction {
        target: String,
        content: String,
    },
}

impl Token {
    pub fn start(name: impl Into<String>) -> Self {
        Token::ElementStart {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn start_with(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Token::ElementStart {
            name: name.into(),
            attributes,
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Token::ElementEnd { name: name.into() }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Token::Text(content.into())
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Token::Comment(content.into())
    }

    pub fn directive(content: impl Into<String>) -> Self {
        Token::Directive(content.into())
    }

    /// Short label used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::ElementStart { .. } => "element-start",
            Token::ElementEnd { .. } => "element-end",
            Token::Text(_) => "text",
            Token::Comment(_) => "comment",
            Token::Directive(_) => "directive",
            Token::ProcessingInstruction { .. } => "processing-instruction",
        }
    }
}

/// The part of a qualified name after the namespace prefix.
pub fn local_name(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) if !local.is_empty() => local,
        _ => name,
    }
}
