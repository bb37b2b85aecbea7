use schemadelta_core::{
    ConstraintTiming, ExcludeElement, MatchType, RefAction, TableConstraint, TableConstraintKind,
};

use crate::keyword::Keyword;
use crate::lexer::ExprEnd;
use crate::token::TokenKind;

use super::Parser;

#[derive(Debug, Default)]
pub(super) struct ReferenceActions {
    pub match_type: Option<MatchType>,
    pub on_delete: Option<RefAction>,
    pub on_update: Option<RefAction>,
    pub on_delete_columns: Vec<String>,
    pub on_update_columns: Vec<String>,
}

impl Parser<'_> {
    pub(super) fn parse_table_constraint(&mut self) -> Option<TableConstraint> {
        let name = if self.match_keyword(Keyword::Constraint) {
            Some(self.ident("constraint name")?)
        } else {
            None
        };
        let kind = self.parse_table_constraint_kind()?;
        let timing = self.parse_constraint_timing();
        Some(TableConstraint { name, kind, timing })
    }

    fn parse_table_constraint_kind(&mut self) -> Option<TableConstraintKind> {
        if self.match_keyword(Keyword::Check) {
            let expr = self.capture_paren_expr("CHECK")?;
            let no_inherit = self.match_no_inherit();
            return Some(TableConstraintKind::Check { expr, no_inherit });
        }
        if self.match_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Null)?;
            let column = self.ident("column name")?;
            let no_inherit = self.match_no_inherit();
            return Some(TableConstraintKind::NotNull { column, no_inherit });
        }
        if self.match_keyword(Keyword::Unique) {
            let nulls_distinct = self.parse_nulls_distinct()?;
            let columns = self.paren_name_list("column name")?;
            let index_params = self.parse_index_params()?;
            return Some(TableConstraintKind::Unique {
                columns,
                nulls_distinct,
                index_params,
            });
        }
        if self.match_keyword(Keyword::Primary) {
            self.expect_keyword(Keyword::Key)?;
            let columns = self.paren_name_list("column name")?;
            let index_params = self.parse_index_params()?;
            return Some(TableConstraintKind::PrimaryKey {
                columns,
                index_params,
            });
        }
        if self.match_keyword(Keyword::Foreign) {
            self.expect_keyword(Keyword::Key)?;
            let columns = self.paren_name_list("column name")?;
            self.expect_keyword(Keyword::References)?;
            let ref_table = self.qualified_name("referenced table")?;
            let ref_columns = if self.check_kind(TokenKind::LParen) {
                self.paren_name_list("referenced column")?
            } else {
                Vec::new()
            };
            let actions = self.parse_reference_actions()?;
            return Some(TableConstraintKind::ForeignKey {
                columns,
                ref_table,
                ref_columns,
                match_type: actions.match_type,
                on_delete: actions.on_delete,
                on_update: actions.on_update,
                on_delete_columns: actions.on_delete_columns,
                on_update_columns: actions.on_update_columns,
            });
        }
        if self.match_keyword(Keyword::Exclude) {
            return self.parse_exclude();
        }

        self.error_here(format!(
            "expected table constraint, found {}",
            self.current.describe()
        ));
        None
    }

    /// `EXCLUDE [USING method] (element WITH operator, ...) [params]
    ///  [WHERE (predicate)]`. Elements and operators are raw text: both can
    /// contain operators outside the token set.
    fn parse_exclude(&mut self) -> Option<TableConstraintKind> {
        let index_method = if self.match_keyword(Keyword::Using) {
            Some(self.ident("index method")?)
        } else {
            None
        };

        if self.current.kind != TokenKind::LParen {
            self.error_here(format!(
                "expected `(` after EXCLUDE, found {}",
                self.current.describe()
            ));
            return None;
        }

        let mut elements = Vec::new();
        loop {
            let expr = self.capture_expr_after_current(&[Keyword::With]);
            if expr.is_empty() {
                self.error_here("expected exclusion element");
                return None;
            }
            if !self.check_keyword(Keyword::With) {
                self.error_here(format!(
                    "expected `WITH`, found {}",
                    self.current.describe()
                ));
                return None;
            }

            let (operator, end) = self.capture_list_item_after_current();
            if operator.is_empty() {
                self.error_here("expected operator after `WITH`");
                return None;
            }
            elements.push(ExcludeElement { expr, operator });

            match end {
                ExprEnd::Comma => continue,
                ExprEnd::CloseParen => {
                    self.advance();
                    break;
                }
                _ => {
                    self.error_here("unterminated EXCLUDE constraint");
                    return None;
                }
            }
        }

        let index_params = self.parse_index_params()?;
        let where_clause = if self.match_keyword(Keyword::Where) {
            Some(self.capture_paren_expr("WHERE")?)
        } else {
            None
        };

        Some(TableConstraintKind::Exclude {
            index_method,
            elements,
            index_params,
            where_clause,
        })
    }

    /// `[MATCH FULL|PARTIAL|SIMPLE] [ON DELETE action [(cols)]]
    ///  [ON UPDATE action [(cols)]]`, clauses in any order.
    pub(super) fn parse_reference_actions(&mut self) -> Option<ReferenceActions> {
        let mut actions = ReferenceActions::default();
        loop {
            if self.match_keyword(Keyword::Match) {
                actions.match_type = Some(self.parse_match_type()?);
            } else if self.check_keyword(Keyword::On) && self.peek().is_keyword(Keyword::Delete) {
                self.advance();
                self.advance();
                let (action, columns) = self.parse_ref_action()?;
                actions.on_delete = Some(action);
                actions.on_delete_columns = columns;
            } else if self.check_keyword(Keyword::On) && self.peek().is_keyword(Keyword::Update) {
                self.advance();
                self.advance();
                let (action, columns) = self.parse_ref_action()?;
                actions.on_update = Some(action);
                actions.on_update_columns = columns;
            } else {
                return Some(actions);
            }
        }
    }

    fn parse_match_type(&mut self) -> Option<MatchType> {
        if self.match_keyword(Keyword::Full) {
            Some(MatchType::Full)
        } else if self.match_keyword(Keyword::Partial) {
            Some(MatchType::Partial)
        } else if self.match_keyword(Keyword::Simple) {
            Some(MatchType::Simple)
        } else {
            self.error_here(format!(
                "expected FULL, PARTIAL, or SIMPLE, found {}",
                self.current.describe()
            ));
            None
        }
    }

    /// Referential action, with the optional column subset of
    /// `SET NULL (cols)` / `SET DEFAULT (cols)`.
    fn parse_ref_action(&mut self) -> Option<(RefAction, Vec<String>)> {
        if self.match_keyword(Keyword::Cascade) {
            return Some((RefAction::Cascade, Vec::new()));
        }
        if self.match_keyword(Keyword::Restrict) {
            return Some((RefAction::Restrict, Vec::new()));
        }
        if self.match_keyword(Keyword::No) {
            self.expect_keyword(Keyword::Action)?;
            return Some((RefAction::NoAction, Vec::new()));
        }
        if self.match_keyword(Keyword::Set) {
            let action = if self.match_keyword(Keyword::Null) {
                RefAction::SetNull
            } else if self.match_keyword(Keyword::Default) {
                RefAction::SetDefault
            } else {
                self.error_here(format!(
                    "expected NULL or DEFAULT after SET, found {}",
                    self.current.describe()
                ));
                return None;
            };
            let columns = if self.check_kind(TokenKind::LParen) {
                self.paren_name_list("column name")?
            } else {
                Vec::new()
            };
            return Some((action, columns));
        }

        self.error_here(format!(
            "expected referential action, found {}",
            self.current.describe()
        ));
        None
    }

    pub(super) fn parse_nulls_distinct(&mut self) -> Option<Option<bool>> {
        if !self.match_keyword(Keyword::Nulls) {
            return Some(None);
        }
        if self.match_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Distinct)?;
            Some(Some(false))
        } else {
            self.expect_keyword(Keyword::Distinct)?;
            Some(Some(true))
        }
    }

    /// `INCLUDE (...)`, `WITH (...)`, and `USING INDEX TABLESPACE name`
    /// after UNIQUE / PRIMARY KEY, captured as one raw blob.
    pub(super) fn parse_index_params(&mut self) -> Option<Option<String>> {
        let mut parts: Vec<String> = Vec::new();
        loop {
            if self.match_keyword(Keyword::Include) {
                let columns = self.capture_paren_expr("INCLUDE")?;
                parts.push(format!("INCLUDE ({columns})"));
            } else if self.check_keyword(Keyword::With) && self.peek().kind == TokenKind::LParen {
                self.advance();
                let params = self.capture_paren_expr("WITH")?;
                parts.push(format!("WITH ({params})"));
            } else if self.check_keyword(Keyword::Using)
                && self.peek().kind == TokenKind::Ident
                && self.peek().text.eq_ignore_ascii_case("index")
            {
                self.advance();
                self.advance();
                self.expect_keyword(Keyword::Tablespace)?;
                let name = self.ident("tablespace name")?;
                parts.push(format!("USING INDEX TABLESPACE {name}"));
            } else {
                break;
            }
        }
        Some((!parts.is_empty()).then(|| parts.join(" ")))
    }

    pub(super) fn parse_constraint_timing(&mut self) -> ConstraintTiming {
        let mut timing = ConstraintTiming::default();
        loop {
            if self.match_keyword(Keyword::Deferrable) {
                timing.deferrable = Some(true);
            } else if self.check_keyword(Keyword::Not)
                && self.peek().is_keyword(Keyword::Deferrable)
            {
                self.advance();
                self.advance();
                timing.deferrable = Some(false);
            } else if self.check_keyword(Keyword::Not) && self.peek().is_keyword(Keyword::Enforced)
            {
                self.advance();
                self.advance();
                timing.enforced = Some(false);
            } else if self.match_keyword(Keyword::Initially) {
                if self.match_keyword(Keyword::Deferred) {
                    timing.initially_deferred = Some(true);
                } else if self.match_keyword(Keyword::Immediate) {
                    timing.initially_deferred = Some(false);
                } else {
                    self.error_here(format!(
                        "expected DEFERRED or IMMEDIATE, found {}",
                        self.current.describe()
                    ));
                    return timing;
                }
            } else if self.match_keyword(Keyword::Enforced) {
                timing.enforced = Some(true);
            } else {
                return timing;
            }
        }
    }

    /// `NO INHERIT`; INHERIT is not in the keyword table, so the second word
    /// arrives as a plain identifier.
    pub(super) fn match_no_inherit(&mut self) -> bool {
        if !self.check_keyword(Keyword::No) {
            return false;
        }
        let next = self.peek();
        let is_inherit = next.is_keyword(Keyword::Inherits)
            || (next.kind == TokenKind::Ident && next.text.eq_ignore_ascii_case("inherit"));
        if is_inherit {
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn paren_name_list(&mut self, what: &str) -> Option<Vec<String>> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let mut names = Vec::new();
        loop {
            names.push(self.ident(what)?);
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            return Some(names);
        }
    }

    /// Raw capture of a list element starting right after the current
    /// token; consumes the `,` or `)` terminator.
    fn capture_list_item_after_current(&mut self) -> (String, ExprEnd) {
        debug_assert!(self.peeked.is_none());
        let (text, end) = self.lexer.capture_list_item();
        (text.to_string(), end)
    }
}
