mod column;
mod constraint;
mod create_type;
mod table;

use schemadelta_core::{
    CreateTypeStmt, ParseError, PartitionBoundSpec, Persistence, Schema, TableStmt, TempScope,
};

use crate::keyword::Keyword;
use crate::lexer::{ExprEnd, Lexer};
use crate::token::{Token, TokenKind};

/// Parses a sequence of CREATE statements. The parser never fails: every
/// diagnostic is collected as a value and a bad statement discards that
/// statement only.
#[must_use]
pub fn parse(source: &str) -> (Schema, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let schema = parser.parse_all_statements();
    (schema, parser.errors)
}

/// Parses a partition bound fragment (`FOR VALUES ...` or `DEFAULT`) on its
/// own, as delivered by `pg_get_expr` over `relpartbound`.
#[must_use]
pub(crate) fn parse_partition_bound_text(text: &str) -> Option<PartitionBoundSpec> {
    let mut parser = Parser::new(text);
    let bound = parser.parse_partition_bound();
    if parser.errors.is_empty() { bound } else { None }
}

enum Statement {
    Table(TableStmt),
    Type(CreateTypeStmt),
}

pub(crate) struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    peeked: Option<Token<'src>>,
    errors: Vec<ParseError>,
    panic_mode: bool,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            peeked: None,
            errors: Vec::new(),
            panic_mode: false,
        }
    }

    fn parse_all_statements(&mut self) -> Schema {
        let mut schema = Schema::new();

        loop {
            while self.current.kind == TokenKind::Semicolon {
                self.advance();
            }
            if self.current.is_eof() {
                break;
            }

            match self.parse_statement() {
                Some(Statement::Table(table)) => schema.tables.push(table),
                Some(Statement::Type(type_stmt)) => schema.types.push(type_stmt),
                None => {
                    self.synchronize();
                    continue;
                }
            }

            if self.current.kind != TokenKind::Semicolon && !self.current.is_eof() {
                self.error_here(format!(
                    "expected `;` between statements, found {}",
                    self.current.describe()
                ));
                if self.at_statement_head() {
                    // Already at the next statement; no tokens to skip.
                    self.panic_mode = false;
                } else {
                    self.synchronize();
                }
            }
        }

        schema
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        if !self.match_keyword(Keyword::Create) {
            self.error_here(format!(
                "expected `CREATE`, found {}",
                self.current.describe()
            ));
            return None;
        }

        let mut temp_scope = None;
        if self.match_keyword(Keyword::Global) {
            temp_scope = Some(TempScope::Global);
        } else if self.match_keyword(Keyword::Local) {
            temp_scope = Some(TempScope::Local);
        }

        let mut persistence = Persistence::Normal;
        if self.match_keyword(Keyword::Temp) || self.match_keyword(Keyword::Temporary) {
            persistence = Persistence::Temporary;
        } else if self.match_keyword(Keyword::Unlogged) {
            persistence = Persistence::Unlogged;
        }

        if self.match_keyword(Keyword::Table) {
            return self
                .parse_create_table(persistence, temp_scope)
                .map(Statement::Table);
        }

        if temp_scope.is_none()
            && persistence == Persistence::Normal
            && self.match_keyword(Keyword::Type)
        {
            return self.parse_create_type().map(Statement::Type);
        }

        // INDEX, TRIGGER, FUNCTION, PROCEDURE and friends are recognized but
        // outside the parsed surface.
        self.error_here(format!(
            "unsupported CREATE statement: found {}",
            self.current.describe()
        ));
        None
    }

    /// Panic-mode resynchronization: skip ahead until a `;` was just
    /// consumed or the next statement head (`CREATE`/`ALTER`/`DROP`) is in
    /// view. Always makes progress.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
            if self.at_statement_head() {
                return;
            }
        }
    }

    fn at_statement_head(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Keyword(Keyword::Create | Keyword::Alter | Keyword::Drop)
        )
    }

    // --- Token plumbing ---------------------------------------------------

    fn advance(&mut self) {
        self.current = self
            .peeked
            .take()
            .unwrap_or_else(|| self.lexer.next_token());
    }

    fn peek(&mut self) -> Token<'src> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token());
        }
        self.peeked.unwrap_or(self.current)
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.is_keyword(keyword)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Option<()> {
        if self.match_keyword(keyword) {
            Some(())
        } else {
            self.error_here(format!(
                "expected `{keyword}`, found {}",
                self.current.describe()
            ));
            None
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Option<()> {
        if self.match_kind(kind) {
            Some(())
        } else {
            self.error_here(format!("expected {what}, found {}", self.current.describe()));
            None
        }
    }

    /// Consumes an identifier (plain or quoted). Quoted identifiers are
    /// delivered with their `""` escapes resolved.
    fn ident(&mut self, what: &str) -> Option<String> {
        match self.current.kind {
            TokenKind::Ident => {
                let text = self.current.text.to_string();
                self.advance();
                Some(text)
            }
            TokenKind::QuotedIdent => {
                let text = crate::lexer::unquote_ident(self.current.text);
                self.advance();
                Some(text)
            }
            _ => {
                self.error_here(format!(
                    "expected {what}, found {}",
                    self.current.describe()
                ));
                None
            }
        }
    }

    /// `ident ( '.' ident )*`, joined with dots.
    fn qualified_name(&mut self, what: &str) -> Option<String> {
        let mut name = self.ident(what)?;
        while self.match_kind(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.ident(what)?);
        }
        Some(name)
    }

    fn number_i64(&mut self, what: &str) -> Option<i64> {
        if self.current.kind != TokenKind::Number {
            self.error_here(format!("expected {what}, found {}", self.current.describe()));
            return None;
        }
        let parsed = self.current.text.parse::<i64>();
        match parsed {
            Ok(value) => {
                self.advance();
                Some(value)
            }
            Err(_) => {
                self.error_here(format!("{what} `{}` out of range", self.current.text));
                None
            }
        }
    }

    // --- Raw expression plumbing ------------------------------------------
    //
    // Expression text bypasses tokenization (it may contain operators the
    // token set does not cover). These helpers require that the lookahead
    // holds the token just before the expression and that nothing has been
    // peeked past it.

    /// Current must be `(`; captures the balanced inner text, consumes the
    /// `)`, and refreshes the lookahead.
    fn capture_paren_expr(&mut self, what: &str) -> Option<String> {
        if self.current.kind != TokenKind::LParen {
            self.error_here(format!(
                "expected `(` after {what}, found {}",
                self.current.describe()
            ));
            return None;
        }
        debug_assert!(self.peeked.is_none());
        let (text, closed) = self.lexer.capture_balanced();
        if !closed {
            self.error_here(format!("unterminated {what} expression"));
            return None;
        }
        let text = text.to_string();
        self.advance();
        Some(text)
    }

    /// Current must be `(`; captures comma-separated raw items up to the
    /// matching `)` and refreshes the lookahead.
    fn capture_raw_list(&mut self, what: &str) -> Option<Vec<String>> {
        if self.current.kind != TokenKind::LParen {
            self.error_here(format!(
                "expected `(` after {what}, found {}",
                self.current.describe()
            ));
            return None;
        }
        debug_assert!(self.peeked.is_none());
        let mut items = Vec::new();
        loop {
            let (text, end) = self.lexer.capture_list_item();
            match end {
                ExprEnd::Comma => items.push(text.to_string()),
                ExprEnd::CloseParen => {
                    if !text.is_empty() {
                        items.push(text.to_string());
                    }
                    self.advance();
                    return Some(items);
                }
                _ => {
                    self.error_here(format!("unterminated {what} list"));
                    return None;
                }
            }
        }
    }

    /// Captures a free-standing expression starting after the current
    /// token, stopping before any of the boundary keywords or a depth-0
    /// delimiter, then refreshes the lookahead.
    fn capture_expr_after_current(&mut self, boundaries: &[Keyword]) -> String {
        debug_assert!(self.peeked.is_none());
        let text = self.lexer.capture_free_expr(boundaries).to_string();
        self.advance();
        text
    }

    // --- Diagnostics ------------------------------------------------------

    fn error_here(&mut self, message: impl Into<String>) {
        let token = self.current;
        self.error_at(&token, message);
    }

    fn error_at(&mut self, token: &Token<'_>, message: impl Into<String>) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.errors
            .push(ParseError::new(message, token.line, token.column));
    }

    /// `IF NOT EXISTS`, all-or-nothing.
    fn match_if_not_exists(&mut self) -> Option<bool> {
        if !self.check_keyword(Keyword::If) {
            return Some(false);
        }
        self.advance();
        self.expect_keyword(Keyword::Not)?;
        self.expect_keyword(Keyword::Exists)?;
        Some(true)
    }
}
