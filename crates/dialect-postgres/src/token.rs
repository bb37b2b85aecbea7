use std::fmt;

use crate::keyword::Keyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident,
    /// Double-quoted identifier; the token text carries the content between
    /// the quotes, quotes stripped.
    QuotedIdent,
    /// Single-quoted string literal; the token text carries the raw content
    /// between the quotes with escape sequences unresolved.
    StringLit,
    Number,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Equals,
    DoubleColon,
    LBracket,
    RBracket,
    Eof,
    /// A lexical error. The token text is the offending lexeme; scanning
    /// continues after it.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// 1-based line of the token's first character.
    pub line: u32,
    /// 1-based column of the token's first character.
    pub column: u32,
}

impl<'src> Token<'src> {
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Human-readable form for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(keyword) => format!("`{keyword}`"),
            TokenKind::Ident | TokenKind::QuotedIdent => format!("identifier `{}`", self.text),
            TokenKind::StringLit => "string literal".to_string(),
            TokenKind::Number => format!("number `{}`", self.text),
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Error => format!("`{}`", self.text),
            _ => format!("`{}`", self.text),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
