use std::fmt;

use crate::token::{Span, Token, TokenKind};
use crate::value::{is_separator, split_option_value};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Byte that cannot start any token in the default state.
    IllegalCharacter(char),
    /// End of input inside a `/* ... */` comment (nesting never
    /// returned to zero).
    UnterminatedBlockComment,
    /// End of input inside a here-document (anchor line never found).
    UnterminatedHeredoc { anchor: String },
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalCharacter(ch) => {
                write!(f, "illegal character '{ch}'")
            }
            Self::UnterminatedBlockComment => {
                write!(f, "unterminated block comment")
            }
            Self::UnterminatedHeredoc { anchor } => {
                write!(
                    f,
                    "unterminated here-document, \
                     expected closing anchor: {anchor}"
                )
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize an Apache-style configuration source string into an
/// ordered sequence of tokens.
///
/// # Errors
///
/// Returns `LexError` on unterminated block comments, unterminated
/// here-documents, or characters no rule accepts.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            input: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            if let Some(token) = self.next_token()? {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }

    /// Match one rule at the cursor in the default state.
    ///
    /// Rules are tried in a fixed precedence order -- comment, block
    /// comment opener, close tag, open-close tag, open tag,
    /// option/value, whitespace, newline -- and the first that
    /// matches wins. Each rule is greedy within itself. The order
    /// matters: several patterns are prefixes of each other
    /// (`<foo/>` would otherwise lex as an open tag named `foo/`).
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let src = self.src;
        let start = self.pos;
        let span = self.span();

        if let Some(len) = self.match_comment() {
            let text = src[start + 1..start + len].to_string();
            self.consume(len);
            return Ok(Some(Token {
                kind: TokenKind::Comment,
                text,
                span,
            }));
        }

        if self.input[start..].starts_with(b"/*") {
            return self.read_block_comment().map(Some);
        }

        if let Some(len) = self.match_close_tag() {
            let text = src[start + 2..start + len - 1].to_string();
            self.consume(len);
            return Ok(Some(Token {
                kind: TokenKind::CloseTag,
                text,
                span,
            }));
        }

        if let Some(len) = self.match_open_close_tag() {
            let text = src[start + 1..start + len - 2].to_string();
            self.consume(len);
            return Ok(Some(Token {
                kind: TokenKind::OpenCloseTag,
                text,
                span,
            }));
        }

        if let Some(len) = self.match_open_tag() {
            let text = src[start + 1..start + len - 1].to_string();
            self.consume(len);
            return Ok(Some(Token {
                kind: TokenKind::OpenTag,
                text,
                span,
            }));
        }

        if let Some(len) = self.match_option_value() {
            return self.read_option_value(len, span);
        }

        match self.input[start] {
            b' ' | b'\t' => {
                let mut end = start + 1;
                while end < self.input.len() && matches!(self.input[end], b' ' | b'\t') {
                    end += 1;
                }
                self.consume(end - start);
                Ok(None)
            }
            b'\r' | b'\n' => {
                self.consume_terminator();
                Ok(None)
            }
            _ => {
                let ch = src[start..].chars().next().unwrap_or('\u{FFFD}');
                Err(LexError {
                    kind: LexErrorKind::IllegalCharacter(ch),
                    span,
                })
            }
        }
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    /// Byte offset of the next line terminator at or after `from`.
    fn line_end(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.input.len() && !matches!(self.input[i], b'\r' | b'\n') {
            i += 1;
        }
        i
    }

    /// Advance `n` bytes, counting line terminators (`\r\n` is one).
    fn consume(&mut self, n: usize) {
        let end = self.pos + n;
        while self.pos < end {
            match self.input[self.pos] {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.col = 1;
                }
                b'\r' => {
                    self.pos += 1;
                    if self.pos < end && self.input[self.pos] == b'\n' {
                        self.pos += 1;
                    }
                    self.line += 1;
                    self.col = 1;
                }
                _ => {
                    self.pos += 1;
                    self.col += 1;
                }
            }
        }
    }

    /// Consume one full line terminator sequence at the cursor.
    fn consume_terminator(&mut self) {
        if self.input[self.pos] == b'\r' && self.input.get(self.pos + 1) == Some(&b'\n') {
            self.consume(2);
        } else {
            self.consume(1);
        }
    }

    /// Comment rule: `#` (not preceded by a backslash) to end of line.
    fn match_comment(&self) -> Option<usize> {
        if self.input[self.pos] != b'#' {
            return None;
        }
        if self.pos > 0 && self.input[self.pos - 1] == b'\\' {
            return None;
        }
        Some(self.line_end(self.pos) - self.pos)
    }

    /// Close tag rule: `</` then at least one character (no newline
    /// or tab) up to the last `>` on the line.
    fn match_close_tag(&self) -> Option<usize> {
        if !self.input[self.pos..].starts_with(b"</") {
            return None;
        }
        let mut i = self.pos + 2;
        let mut last_gt = None;
        while i < self.input.len() && !matches!(self.input[i], b'\n' | b'\r' | b'\t') {
            if self.input[i] == b'>' {
                last_gt = Some(i);
            }
            i += 1;
        }
        let gt = last_gt?;
        (gt > self.pos + 2).then(|| gt + 1 - self.pos)
    }

    /// Open-close tag rule: `<` then a run (no newline, tab, or `/`)
    /// followed immediately by `/>`.
    fn match_open_close_tag(&self) -> Option<usize> {
        if self.input[self.pos] != b'<' {
            return None;
        }
        let mut i = self.pos + 1;
        while i < self.input.len() && !matches!(self.input[i], b'\n' | b'\r' | b'\t' | b'/') {
            i += 1;
        }
        if i == self.pos + 1 {
            return None;
        }
        self.input[i..]
            .starts_with(b"/>")
            .then(|| i + 2 - self.pos)
    }

    /// Open tag rule: `<` then at least one character (no newline or
    /// tab) up to the last `>` on the line.
    fn match_open_tag(&self) -> Option<usize> {
        if self.input[self.pos] != b'<' {
            return None;
        }
        let mut i = self.pos + 1;
        let mut last_gt = None;
        while i < self.input.len() && !matches!(self.input[i], b'\n' | b'\r' | b'\t') {
            if self.input[i] == b'>' {
                last_gt = Some(i);
            }
            i += 1;
        }
        let gt = last_gt?;
        (gt > self.pos + 1).then(|| gt + 1 - self.pos)
    }

    /// Option rule: a separator-free name, a run of separators
    /// (which may span line terminators), and at least one remainder
    /// character on the final line of the match.
    fn match_option_value(&self) -> Option<usize> {
        let mut i = self.pos;
        while i < self.input.len() && !is_separator(self.input[i]) {
            i += 1;
        }
        if i == self.pos {
            return None;
        }
        let name_end = i;
        while i < self.input.len() && is_separator(self.input[i]) {
            i += 1;
        }
        if i == name_end {
            return None;
        }
        if i < self.input.len() {
            // A non-separator byte follows the run; the remainder is
            // the rest of that physical line.
            return Some(self.line_end(i) - self.pos);
        }
        // The separator run hits end of input. The trailing
        // terminator-free tail of the run can serve as the remainder,
        // provided at least one separator byte is left before it.
        let mut rem_start = i;
        while rem_start > name_end && !matches!(self.input[rem_start - 1], b'\r' | b'\n') {
            rem_start -= 1;
        }
        let split_at = if rem_start > name_end {
            rem_start
        } else {
            name_end + 1
        };
        (split_at < i).then(|| i - self.pos)
    }

    /// Act on an option/value match: emit the pair directly, or hand
    /// off to continuation or here-document accumulation.
    fn read_option_value(&mut self, len: usize, span: Span) -> Result<Option<Token>, LexError> {
        let src = self.src;
        let start = self.pos;
        let raw = &src[start..start + len];
        self.consume(len);

        if raw.ends_with('\\') {
            return Ok(self.read_continuation(start, span));
        }

        let (name, value) = split_option_value(raw);

        if let Some(rest) = value.strip_prefix("<<") {
            let anchor = rest.trim().to_string();
            return self.read_heredoc(name, anchor, span).map(Some);
        }

        Ok(Some(Token {
            kind: TokenKind::OptionAndValue { name },
            text: value,
            span,
        }))
    }

    /// Consume continuation lines after an option line ending in `\`,
    /// then join the accumulated text into one logical line and split
    /// it. The span is that of the opening line.
    fn read_continuation(&mut self, start: usize, span: Span) -> Option<Token> {
        let src = self.src;
        loop {
            if self.pos >= self.input.len() {
                // A continuation still pending at end of input has no
                // final line to join; the partial option is dropped.
                return None;
            }
            if matches!(self.input[self.pos], b'\r' | b'\n') {
                self.consume_terminator();
                continue;
            }
            let end = self.line_end(self.pos);
            let line = &src[self.pos..end];
            self.consume(end - self.pos);
            if line.ends_with('\\') {
                continue;
            }
            let joined = join_continuation(&src[start..end]);
            let (name, value) = split_option_value(&joined);
            return Some(Token {
                kind: TokenKind::OptionAndValue { name },
                text: value,
                span,
            });
        }
    }

    /// Consume here-document body lines until one equals the anchor
    /// verbatim. The body is the source text between the opener line
    /// and the anchor line, newlines preserved.
    fn read_heredoc(
        &mut self,
        name: String,
        anchor: String,
        span: Span,
    ) -> Result<Token, LexError> {
        let src = self.src;
        if self.pos < self.input.len() && matches!(self.input[self.pos], b'\r' | b'\n') {
            self.consume_terminator();
        }
        let body_start = self.pos;

        loop {
            if self.pos >= self.input.len() {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedHeredoc { anchor },
                    span: self.span(),
                });
            }
            let line_start = self.pos;
            let end = self.line_end(line_start);
            let line = &src[line_start..end];
            self.consume(end - line_start);
            if !line.is_empty() && line == anchor {
                return Ok(Token {
                    kind: TokenKind::OptionAndValue { name },
                    text: src[body_start..line_start].to_string(),
                    span,
                });
            }
            if self.pos < self.input.len() {
                self.consume_terminator();
            }
        }
    }

    /// Consume a `/* ... */` comment, tracking nesting depth. The
    /// token text is the verbatim source, delimiters included.
    fn read_block_comment(&mut self) -> Result<Token, LexError> {
        let src = self.src;
        let start = self.pos;
        let span = self.span();
        self.consume(2);
        let mut depth = 1_usize;

        while depth > 0 {
            if self.pos >= self.input.len() {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedBlockComment,
                    span: self.span(),
                });
            }
            if self.input[self.pos..].starts_with(b"/*") {
                depth += 1;
                self.consume(2);
            } else if self.input[self.pos..].starts_with(b"*/") {
                depth -= 1;
                self.consume(2);
            } else if matches!(self.input[self.pos], b'\r' | b'\n') {
                self.consume_terminator();
            } else {
                self.consume(1);
            }
        }

        Ok(Token {
            kind: TokenKind::CComment,
            text: src[start..self.pos].to_string(),
            span,
        })
    }
}

/// Join physical continuation lines into one logical line: drop each
/// `\` directly before a line terminator, then drop the terminators
/// themselves.
fn join_continuation(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some(&('\r' | '\n'))) => {}
            '\r' | '\n' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_comment() {
        let tokens = tokenize("# hello\n").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, " hello");
    }

    #[test]
    fn nested_block_comment() {
        let input = "/* a /* b */ c */\n";
        let tokens = tokenize(input).expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::CComment);
        assert_eq!(tokens[0].text, "/* a /* b */ c */");
    }

    #[test]
    fn open_and_close_tags() {
        let tokens = tokenize("<Foo>\n</Foo>\n").expect("should tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::OpenTag);
        assert_eq!(tokens[0].text, "Foo");
        assert_eq!(tokens[1].kind, TokenKind::CloseTag);
        assert_eq!(tokens[1].text, "Foo");
    }

    #[test]
    fn open_close_tag() {
        let tokens = tokenize("<Foo/>\n").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::OpenCloseTag);
        assert_eq!(tokens[0].text, "Foo");
    }

    #[test]
    fn option_and_value() {
        let tokens = tokenize("key value\n").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::OptionAndValue {
                name: "key".to_string()
            }
        );
        assert_eq!(tokens[0].text, "value");
    }

    #[test]
    fn quoted_option_value() {
        let tokens = tokenize("key \"quoted value\"\n").expect("should tokenize");
        assert_eq!(tokens[0].text, "quoted value");
    }

    #[test]
    fn continuation_join() {
        let tokens = tokenize("key line1 \\\nline2\n").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::OptionAndValue {
                name: "key".to_string()
            }
        );
        assert_eq!(tokens[0].text, "line1 line2");
    }

    #[test]
    fn heredoc_value() {
        let tokens = tokenize("key <<EOF\nbody line\nEOF\n").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::OptionAndValue {
                name: "key".to_string()
            }
        );
        assert_eq!(tokens[0].text, "body line\n");
    }

    #[test]
    fn escaped_hash_in_value() {
        let tokens = tokenize("key value \\# not a comment\n").expect("should tokenize");
        assert_eq!(tokens[0].text, "value # not a comment");
    }

    #[test]
    fn one_token_per_logical_line() {
        let input = "a 1\nb 2\n# note\nc 3\n";
        let tokens = tokenize(input).expect("should tokenize");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[2].span.line, 3);
        assert_eq!(tokens[3].span.line, 4);
    }

    #[test]
    fn lines_counted_inside_block_comments() {
        let input = "/* one\ntwo\nthree */\nkey value\n";
        let tokens = tokenize(input).expect("should tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].span.line, 4);
    }

    #[test]
    fn unterminated_block_comment() {
        let err = tokenize("/* unterminated").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::UnterminatedBlockComment);
    }

    #[test]
    fn unterminated_heredoc() {
        let err = tokenize("key <<EOF\nbody\n").expect_err("should fail");
        assert_eq!(
            err.kind,
            LexErrorKind::UnterminatedHeredoc {
                anchor: "EOF".to_string()
            }
        );
    }

    #[test]
    fn illegal_character() {
        let err = tokenize("= no name\n").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::IllegalCharacter('='));
        assert_eq!(err.span.line, 1);
    }
}
