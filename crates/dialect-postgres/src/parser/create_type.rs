use schemadelta_core::{
    BaseTypeDef, CompositeAttr, CreateTypeStmt, InternalLength, RangeTypeDef, TypeKind,
};

use crate::keyword::Keyword;
use crate::lexer::{ExprEnd, unescape_string};
use crate::token::TokenKind;

use super::Parser;

impl Parser<'_> {
    pub(super) fn parse_create_type(&mut self) -> Option<CreateTypeStmt> {
        let if_not_exists = self.match_if_not_exists()?;
        let name = self.qualified_name("type name")?;

        let kind = if self.match_keyword(Keyword::As) {
            if self.match_keyword(Keyword::Enum) {
                TypeKind::Enum {
                    labels: self.parse_enum_labels()?,
                }
            } else if self.match_keyword(Keyword::Range) {
                TypeKind::Range(self.parse_range_def()?)
            } else {
                TypeKind::Composite {
                    attrs: self.parse_composite_attrs()?,
                }
            }
        } else if self.check_kind(TokenKind::LParen) {
            TypeKind::Base(self.parse_base_def()?)
        } else {
            self.error_here(format!(
                "expected `AS` or `(` in CREATE TYPE, found {}",
                self.current.describe()
            ));
            return None;
        };

        let mut stmt = CreateTypeStmt::new(name, kind);
        stmt.if_not_exists = if_not_exists;
        Some(stmt)
    }

    /// `'(' 'label' (',' 'label')* ')'`, quotes stripped and escapes
    /// resolved.
    fn parse_enum_labels(&mut self) -> Option<Vec<String>> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        if self.match_kind(TokenKind::RParen) {
            return Some(Vec::new());
        }

        let mut labels = Vec::new();
        loop {
            if self.current.kind != TokenKind::StringLit {
                self.error_here(format!(
                    "expected enum label string, found {}",
                    self.current.describe()
                ));
                return None;
            }
            labels.push(unescape_string(self.current.text));
            self.advance();

            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            return Some(labels);
        }
    }

    fn parse_composite_attrs(&mut self) -> Option<Vec<CompositeAttr>> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        if self.match_kind(TokenKind::RParen) {
            return Some(Vec::new());
        }

        let mut attrs = Vec::new();
        loop {
            let name = self.ident("attribute name")?;
            let data_type = self.parse_data_type()?;
            let collation = if self.match_keyword(Keyword::Collate) {
                Some(self.qualified_name("collation name")?)
            } else {
                None
            };
            attrs.push(CompositeAttr {
                name,
                data_type,
                collation,
            });

            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            return Some(attrs);
        }
    }

    fn parse_range_def(&mut self) -> Option<RangeTypeDef> {
        let entries = self.parse_kv_body("RANGE")?;
        let mut subtype = None;
        let mut def = RangeTypeDef::new("");

        for (key, value) in entries {
            let value = match value {
                Some(value) => value,
                None => {
                    self.error_here(format!("range parameter {key} needs a value"));
                    return None;
                }
            };
            match key.as_str() {
                "SUBTYPE" => subtype = Some(value),
                "SUBTYPE_OPCLASS" => def.opclass = Some(value),
                "COLLATION" => def.collation = Some(value),
                "CANONICAL" => def.canonical = Some(value),
                "SUBTYPE_DIFF" => def.subtype_diff = Some(value),
                "MULTIRANGE_TYPE_NAME" => def.multirange_type_name = Some(value),
                _ => {
                    self.error_here(format!("unknown range type parameter `{key}`"));
                    return None;
                }
            }
        }

        match subtype {
            Some(subtype) => {
                def.subtype = subtype;
                Some(def)
            }
            None => {
                self.error_here("range type requires SUBTYPE");
                None
            }
        }
    }

    fn parse_base_def(&mut self) -> Option<BaseTypeDef> {
        let entries = self.parse_kv_body("base type")?;
        let mut input = None;
        let mut output = None;
        let mut def = BaseTypeDef::new("", "");

        for (key, value) in entries {
            match key.as_str() {
                "INPUT" => input = Some(self.require_value(&key, value)?),
                "OUTPUT" => output = Some(self.require_value(&key, value)?),
                "RECEIVE" => def.receive = Some(self.require_value(&key, value)?),
                "SEND" => def.send = Some(self.require_value(&key, value)?),
                "TYPMOD_IN" => def.typmod_in = Some(self.require_value(&key, value)?),
                "TYPMOD_OUT" => def.typmod_out = Some(self.require_value(&key, value)?),
                "ANALYZE" => def.analyze = Some(self.require_value(&key, value)?),
                "INTERNALLENGTH" => {
                    let value = self.require_value(&key, value)?;
                    def.internal_length = Some(self.parse_internal_length(&value)?);
                }
                "PASSEDBYVALUE" => def.passed_by_value = self.flag_value(&key, value)?,
                "ALIGNMENT" => def.alignment = Some(self.require_value(&key, value)?),
                "STORAGE" => def.storage = Some(self.require_value(&key, value)?),
                "LIKE" => def.like_type = Some(self.require_value(&key, value)?),
                "CATEGORY" => {
                    let value = self.require_value(&key, value)?;
                    def.category = Some(self.single_char_value(&key, &value)?);
                }
                "PREFERRED" => def.preferred = self.flag_value(&key, value)?,
                "DEFAULT" => def.default = Some(unquote_value(&self.require_value(&key, value)?)),
                "ELEMENT" => def.element = Some(self.require_value(&key, value)?),
                "DELIMITER" => {
                    let value = self.require_value(&key, value)?;
                    def.delimiter = Some(self.single_char_value(&key, &value)?);
                }
                "COLLATABLE" => def.collatable = self.flag_value(&key, value)?,
                _ => {
                    self.error_here(format!("unknown base type parameter `{key}`"));
                    return None;
                }
            }
        }

        let (Some(input), Some(output)) = (input, output) else {
            self.error_here("base type requires INPUT and OUTPUT");
            return None;
        };
        def.input = input;
        def.output = output;
        Some(def)
    }

    /// `'(' key [= value] (',' key [= value])* ')'`. Keys are identifiers or
    /// keywords; values are captured raw since they can be qualified
    /// function names or literals. The lookahead must hold the opening `(`.
    fn parse_kv_body(&mut self, what: &str) -> Option<Vec<(String, Option<String>)>> {
        if self.current.kind != TokenKind::LParen {
            self.error_here(format!(
                "expected `(` in CREATE TYPE {what} definition, found {}",
                self.current.describe()
            ));
            return None;
        }

        let mut entries = Vec::new();
        loop {
            self.advance();
            if self.current.kind == TokenKind::RParen {
                self.advance();
                return Some(entries);
            }

            let key = match self.current.kind {
                TokenKind::Ident | TokenKind::Keyword(_) => {
                    self.current.text.to_ascii_uppercase()
                }
                _ => {
                    self.error_here(format!(
                        "expected parameter name, found {}",
                        self.current.describe()
                    ));
                    return None;
                }
            };

            self.advance();
            match self.current.kind {
                TokenKind::Equals => {
                    let (value, end) = self.lexer.capture_list_item();
                    let value = value.to_string();
                    entries.push((key, Some(value)));
                    match end {
                        ExprEnd::Comma => continue,
                        ExprEnd::CloseParen => {
                            self.advance();
                            return Some(entries);
                        }
                        _ => {
                            self.error_here(format!("unterminated {what} definition"));
                            return None;
                        }
                    }
                }
                TokenKind::Comma => {
                    entries.push((key, None));
                }
                TokenKind::RParen => {
                    entries.push((key, None));
                    self.advance();
                    return Some(entries);
                }
                _ => {
                    self.error_here(format!(
                        "expected `=`, `,`, or `)`, found {}",
                        self.current.describe()
                    ));
                    return None;
                }
            }
        }
    }

    fn require_value(&mut self, key: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(value) => Some(value),
            None => {
                self.error_here(format!("base type parameter {key} needs a value"));
                None
            }
        }
    }

    /// A bare key is a true flag; `key = true/false` is also accepted.
    fn flag_value(&mut self, key: &str, value: Option<String>) -> Option<bool> {
        match value {
            None => Some(true),
            Some(raw) => {
                let unquoted = unquote_value(&raw);
                if unquoted.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if unquoted.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    self.error_here(format!("{key} expects true or false, got `{raw}`"));
                    None
                }
            }
        }
    }

    fn parse_internal_length(&mut self, raw: &str) -> Option<InternalLength> {
        if raw.eq_ignore_ascii_case("variable") {
            return Some(InternalLength::Variable);
        }
        match raw.parse::<i64>() {
            Ok(bytes) => Some(InternalLength::Bytes(bytes)),
            Err(_) => {
                self.error_here(format!(
                    "INTERNALLENGTH expects VARIABLE or an integer, got `{raw}`"
                ));
                None
            }
        }
    }

    fn single_char_value(&mut self, key: &str, raw: &str) -> Option<char> {
        let unquoted = unquote_value(raw);
        let mut chars = unquoted.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => {
                self.error_here(format!("{key} expects a single character, got `{raw}`"));
                None
            }
        }
    }
}

/// Strips one level of single quotes and resolves string escapes; leaves
/// unquoted values untouched.
fn unquote_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        unescape_string(&trimmed[1..trimmed.len() - 1])
    } else {
        trimmed.to_string()
    }
}
