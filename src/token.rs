/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Line comment (`# ...`), leading `#` stripped.
    Comment,
    /// C-style block comment (`/* ... */`), delimiters included,
    /// arbitrary nesting.
    CComment,
    /// Opening tag `<Name args>`.
    OpenTag,
    /// Closing tag `</Name>`.
    CloseTag,
    /// Self-closing tag `<Name args/>`.
    OpenCloseTag,
    /// Option name with its value; the value is the token text.
    OptionAndValue { name: String },
}

/// A single token with its kind, text payload, and source location.
///
/// For `OptionAndValue` the text is the parsed value and the option
/// name rides in the kind; for every other kind the text is the full
/// payload described by that kind. Bare newlines and horizontal
/// whitespace are consumed by the lexer and never appear as tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}
