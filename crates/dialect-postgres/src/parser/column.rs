use schemadelta_core::{
    ColumnConstraint, ColumnConstraintKind, ColumnDef, GeneratedStorage, IdentityWhen, StorageType,
};

use crate::keyword::Keyword;
use crate::token::TokenKind;

use super::Parser;

/// Keywords that terminate an unparenthesized column expression (a DEFAULT)
/// at depth 0. A leading NULL is still captured as the expression itself.
const COLUMN_EXPR_BOUNDARIES: &[Keyword] = &[
    Keyword::Not,
    Keyword::Null,
    Keyword::Check,
    Keyword::Default,
    Keyword::Generated,
    Keyword::Unique,
    Keyword::Primary,
    Keyword::References,
    Keyword::Constraint,
    Keyword::Collate,
    Keyword::Storage,
    Keyword::Compression,
    Keyword::Deferrable,
    Keyword::Initially,
    Keyword::Enforced,
];

impl Parser<'_> {
    pub(super) fn parse_column_def(&mut self) -> Option<ColumnDef> {
        let name = self.ident("column name")?;
        let data_type = self.parse_data_type()?;
        let mut column = ColumnDef::new(name, data_type);

        loop {
            if self.match_keyword(Keyword::Collate) {
                column.collation = Some(self.qualified_name("collation name")?);
            } else if self.match_keyword(Keyword::Storage) {
                column.storage = Some(self.parse_storage_type()?);
            } else if self.match_keyword(Keyword::Compression) {
                column.compression = Some(self.ident("compression method")?);
            } else if self.starts_column_constraint() {
                column.constraints.push(self.parse_column_constraint()?);
            } else {
                break;
            }
        }
        Some(column)
    }

    fn starts_column_constraint(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Keyword(
                Keyword::Constraint
                    | Keyword::Not
                    | Keyword::Null
                    | Keyword::Check
                    | Keyword::Default
                    | Keyword::Generated
                    | Keyword::Unique
                    | Keyword::Primary
                    | Keyword::References,
            )
        )
    }

    /// Type name (possibly schema-qualified and multi-word), optional
    /// `(n[,m])` modifier, optional time zone suffix, then array brackets.
    /// The whole spelling is kept as raw text.
    pub(super) fn parse_data_type(&mut self) -> Option<String> {
        let mut name = self.ident("data type")?;
        let qualified = self.check_kind(TokenKind::Dot);
        while self.match_kind(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.ident("data type")?);
        }

        if !qualified {
            let lowered = name.to_ascii_lowercase();
            if lowered == "double" && self.current_ident_is("precision") {
                self.advance();
                name.push_str(" precision");
            } else if (lowered == "character" || lowered == "char")
                && self.current_ident_is("varying")
            {
                self.advance();
                name.push_str(" varying");
            }
        }

        if self.check_kind(TokenKind::LParen) {
            name.push_str(&self.parse_type_modifier()?);
        }

        // `[timestamp | time] (n)? WITH|WITHOUT TIME ZONE`
        if (self.check_keyword(Keyword::With) || self.check_keyword(Keyword::Without))
            && self.peek().kind == TokenKind::Ident
            && self.peek().text.eq_ignore_ascii_case("time")
        {
            let with = self.check_keyword(Keyword::With);
            self.advance();
            self.advance();
            if !self.current_ident_is("zone") {
                self.error_here(format!(
                    "expected `ZONE`, found {}",
                    self.current.describe()
                ));
                return None;
            }
            self.advance();
            name.push_str(if with {
                " with time zone"
            } else {
                " without time zone"
            });
        }

        while self.match_kind(TokenKind::LBracket) {
            if self.check_kind(TokenKind::Number) {
                let size = self.current.text.to_string();
                self.advance();
                self.expect_kind(TokenKind::RBracket, "`]`")?;
                name.push_str(&format!("[{size}]"));
            } else {
                self.expect_kind(TokenKind::RBracket, "`]`")?;
                name.push_str("[]");
            }
        }

        Some(name)
    }

    fn current_ident_is(&self, word: &str) -> bool {
        self.current.kind == TokenKind::Ident && self.current.text.eq_ignore_ascii_case(word)
    }

    fn parse_type_modifier(&mut self) -> Option<String> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let first = self.number_i64("type length")?;
        let modifier = if self.match_kind(TokenKind::Comma) {
            let second = self.number_i64("type scale")?;
            format!("({first},{second})")
        } else {
            format!("({first})")
        };
        self.expect_kind(TokenKind::RParen, "`)`")?;
        Some(modifier)
    }

    fn parse_storage_type(&mut self) -> Option<StorageType> {
        let storage = match self.current.kind {
            TokenKind::Keyword(Keyword::Plain) => StorageType::Plain,
            TokenKind::Keyword(Keyword::External) => StorageType::External,
            TokenKind::Keyword(Keyword::Extended) => StorageType::Extended,
            TokenKind::Keyword(Keyword::Main) => StorageType::Main,
            TokenKind::Keyword(Keyword::Default) => StorageType::Default,
            _ => {
                self.error_here(format!(
                    "expected PLAIN, EXTERNAL, EXTENDED, MAIN, or DEFAULT, found {}",
                    self.current.describe()
                ));
                return None;
            }
        };
        self.advance();
        Some(storage)
    }

    pub(super) fn parse_column_constraint(&mut self) -> Option<ColumnConstraint> {
        let name = if self.match_keyword(Keyword::Constraint) {
            Some(self.ident("constraint name")?)
        } else {
            None
        };
        let kind = self.parse_column_constraint_kind()?;
        let timing = self.parse_constraint_timing();
        Some(ColumnConstraint { name, kind, timing })
    }

    fn parse_column_constraint_kind(&mut self) -> Option<ColumnConstraintKind> {
        if self.match_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Null)?;
            return Some(ColumnConstraintKind::NotNull);
        }
        if self.match_keyword(Keyword::Null) {
            return Some(ColumnConstraintKind::Null);
        }
        if self.match_keyword(Keyword::Check) {
            let expr = self.capture_paren_expr("CHECK")?;
            let no_inherit = self.match_no_inherit();
            return Some(ColumnConstraintKind::Check { expr, no_inherit });
        }
        if self.check_keyword(Keyword::Default) {
            let expr = self.capture_expr_after_current(COLUMN_EXPR_BOUNDARIES);
            if expr.is_empty() {
                self.error_here("expected expression after `DEFAULT`");
                return None;
            }
            return Some(ColumnConstraintKind::Default { expr });
        }
        if self.match_keyword(Keyword::Generated) {
            return self.parse_generated();
        }
        if self.match_keyword(Keyword::Unique) {
            let nulls_distinct = self.parse_nulls_distinct()?;
            let index_params = self.parse_index_params()?;
            return Some(ColumnConstraintKind::Unique {
                nulls_distinct,
                index_params,
            });
        }
        if self.match_keyword(Keyword::Primary) {
            self.expect_keyword(Keyword::Key)?;
            let index_params = self.parse_index_params()?;
            return Some(ColumnConstraintKind::PrimaryKey { index_params });
        }
        if self.match_keyword(Keyword::References) {
            return self.parse_column_references();
        }

        self.error_here(format!(
            "expected column constraint, found {}",
            self.current.describe()
        ));
        None
    }

    fn parse_generated(&mut self) -> Option<ColumnConstraintKind> {
        let when = if self.match_keyword(Keyword::Always) {
            IdentityWhen::Always
        } else {
            self.expect_keyword(Keyword::By)?;
            self.expect_keyword(Keyword::Default)?;
            IdentityWhen::ByDefault
        };
        self.expect_keyword(Keyword::As)?;

        if self.match_keyword(Keyword::Identity) {
            let sequence_options = if self.check_kind(TokenKind::LParen) {
                Some(self.capture_paren_expr("sequence options")?)
            } else {
                None
            };
            return Some(ColumnConstraintKind::GeneratedIdentity {
                when,
                sequence_options,
            });
        }

        let expr = self.capture_paren_expr("generation")?;
        let storage = if self.match_keyword(Keyword::Virtual) {
            GeneratedStorage::Virtual
        } else {
            // STORED is also the default when unspecified.
            self.match_keyword(Keyword::Stored);
            GeneratedStorage::Stored
        };
        Some(ColumnConstraintKind::GeneratedExpr { expr, storage })
    }

    fn parse_column_references(&mut self) -> Option<ColumnConstraintKind> {
        let table = self.qualified_name("referenced table")?;
        let column = if self.match_kind(TokenKind::LParen) {
            let column = self.ident("referenced column")?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            Some(column)
        } else {
            None
        };

        let actions = self.parse_reference_actions()?;
        if !actions.on_delete_columns.is_empty() || !actions.on_update_columns.is_empty() {
            self.error_here("per-column referential actions require a table-level FOREIGN KEY");
            return None;
        }

        Some(ColumnConstraintKind::References {
            table,
            column,
            match_type: actions.match_type,
            on_delete: actions.on_delete,
            on_update: actions.on_update,
        })
    }
}
