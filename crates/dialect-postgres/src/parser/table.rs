use schemadelta_core::{
    LikeClause, LikeOption, OnCommitAction, PartitionBoundSpec, PartitionByClause, PartitionElem,
    PartitionStrategy, Persistence, RangeBound, TableElement, TableKind, TableStmt, TempScope,
};

use crate::keyword::Keyword;
use crate::token::TokenKind;

use super::Parser;

impl Parser<'_> {
    pub(super) fn parse_create_table(
        &mut self,
        persistence: Persistence,
        temp_scope: Option<TempScope>,
    ) -> Option<TableStmt> {
        let if_not_exists = self.match_if_not_exists()?;
        let name = self.qualified_name("table name")?;

        let mut table = if self.match_keyword(Keyword::Of) {
            let type_name = self.qualified_name("composite type name")?;
            let mut table = TableStmt::of_type(name, type_name);
            if self.match_kind(TokenKind::LParen) {
                self.parse_element_list(&mut table)?;
            }
            table
        } else if self.check_keyword(Keyword::Partition) && self.peek().is_keyword(Keyword::Of) {
            self.advance();
            self.advance();
            let parent = self.qualified_name("parent table name")?;
            let mut table = TableStmt::partition_of(name, parent);
            if self.match_kind(TokenKind::LParen) {
                self.parse_element_list(&mut table)?;
            }
            let bound = self.parse_partition_bound()?;
            if let TableKind::Partition {
                bound: table_bound, ..
            } = &mut table.kind
            {
                *table_bound = bound;
            }
            table
        } else {
            self.expect_kind(TokenKind::LParen, "`(`")?;
            let mut table = TableStmt::regular(name);
            self.parse_element_list(&mut table)?;
            table
        };

        table.persistence = persistence;
        table.temp_scope = temp_scope;
        table.if_not_exists = if_not_exists;
        self.parse_table_trailers(&mut table)?;
        Some(table)
    }

    /// Element list body; the opening `(` is already consumed.
    fn parse_element_list(&mut self, table: &mut TableStmt) -> Option<()> {
        if self.match_kind(TokenKind::RParen) {
            return Some(());
        }
        loop {
            self.parse_table_element(table)?;
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            return Some(());
        }
    }

    fn parse_table_element(&mut self, table: &mut TableStmt) -> Option<()> {
        let element = match self.current.kind {
            TokenKind::Keyword(Keyword::Like) => {
                self.advance();
                TableElement::Like(self.parse_like_clause()?)
            }
            TokenKind::Keyword(
                Keyword::Constraint
                | Keyword::Check
                | Keyword::Unique
                | Keyword::Primary
                | Keyword::Foreign
                | Keyword::Exclude
                | Keyword::Not,
            ) => TableElement::Constraint(self.parse_table_constraint()?),
            TokenKind::Ident | TokenKind::QuotedIdent => {
                TableElement::Column(self.parse_column_def()?)
            }
            _ => {
                self.error_here(format!(
                    "expected column, constraint, or LIKE clause, found {}",
                    self.current.describe()
                ));
                return None;
            }
        };
        table.elements_mut().push(element);
        Some(())
    }

    fn parse_like_clause(&mut self) -> Option<LikeClause> {
        let source_table = self.qualified_name("source table name")?;
        let mut clause = LikeClause::new(source_table);

        loop {
            let including = if self.match_keyword(Keyword::Including) {
                true
            } else if self.match_keyword(Keyword::Excluding) {
                false
            } else {
                break;
            };
            let option = self.parse_like_option()?;
            clause.options.push((option, including));
        }
        Some(clause)
    }

    fn parse_like_option(&mut self) -> Option<LikeOption> {
        let option = match self.current.kind {
            TokenKind::Keyword(Keyword::Comments) => LikeOption::Comments,
            TokenKind::Keyword(Keyword::Compression) => LikeOption::Compression,
            TokenKind::Keyword(Keyword::Constraints) => LikeOption::Constraints,
            TokenKind::Keyword(Keyword::Defaults) => LikeOption::Defaults,
            TokenKind::Keyword(Keyword::Generated) => LikeOption::Generated,
            TokenKind::Keyword(Keyword::Identity) => LikeOption::Identity,
            TokenKind::Keyword(Keyword::Indexes) => LikeOption::Indexes,
            TokenKind::Keyword(Keyword::Statistics) => LikeOption::Statistics,
            TokenKind::Keyword(Keyword::Storage) => LikeOption::Storage,
            TokenKind::Keyword(Keyword::All) => LikeOption::All,
            _ => {
                self.error_here(format!(
                    "expected LIKE option, found {}",
                    self.current.describe()
                ));
                return None;
            }
        };
        self.advance();
        Some(option)
    }

    /// `FOR VALUES IN (...) | FOR VALUES FROM (...) TO (...) |
    ///  FOR VALUES WITH (MODULUS n, REMAINDER m) | DEFAULT`
    pub(super) fn parse_partition_bound(&mut self) -> Option<PartitionBoundSpec> {
        if self.match_keyword(Keyword::Default) {
            return Some(PartitionBoundSpec::Default);
        }

        self.expect_keyword(Keyword::For)?;
        self.expect_keyword(Keyword::Values)?;

        if self.match_keyword(Keyword::In) {
            let exprs = self.capture_raw_list("IN")?;
            if exprs.is_empty() {
                self.error_here("partition IN bound needs at least one value");
                return None;
            }
            return Some(PartitionBoundSpec::In { exprs });
        }

        if self.match_keyword(Keyword::From) {
            let from = self.parse_range_bound_list("FROM")?;
            self.expect_keyword(Keyword::To)?;
            let to = self.parse_range_bound_list("TO")?;
            return Some(PartitionBoundSpec::Range { from, to });
        }

        if self.match_keyword(Keyword::With) {
            self.expect_kind(TokenKind::LParen, "`(`")?;
            self.expect_keyword(Keyword::Modulus)?;
            let modulus = self.number_i64("modulus")?;
            self.expect_kind(TokenKind::Comma, "`,`")?;
            self.expect_keyword(Keyword::Remainder)?;
            let remainder = self.number_i64("remainder")?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            return Some(PartitionBoundSpec::Hash { modulus, remainder });
        }

        self.error_here(format!(
            "expected IN, FROM, or WITH in partition bound, found {}",
            self.current.describe()
        ));
        None
    }

    fn parse_range_bound_list(&mut self, what: &str) -> Option<Vec<RangeBound>> {
        let items = self.capture_raw_list(what)?;
        Some(
            items
                .into_iter()
                .map(|item| {
                    if item.eq_ignore_ascii_case("minvalue") {
                        RangeBound::MinValue
                    } else if item.eq_ignore_ascii_case("maxvalue") {
                        RangeBound::MaxValue
                    } else {
                        RangeBound::Expr(item)
                    }
                })
                .collect(),
        )
    }

    /// Optional clauses after the element list, in any order.
    fn parse_table_trailers(&mut self, table: &mut TableStmt) -> Option<()> {
        loop {
            if self.match_keyword(Keyword::Inherits) {
                self.parse_inherits(table)?;
            } else if self.check_keyword(Keyword::Partition) && self.peek().is_keyword(Keyword::By)
            {
                self.advance();
                self.advance();
                table.partition_by = Some(self.parse_partition_by()?);
            } else if self.match_keyword(Keyword::Using) {
                table.access_method = Some(self.ident("access method")?);
            } else if self.check_keyword(Keyword::With) && self.peek().kind == TokenKind::LParen {
                self.advance();
                self.advance();
                self.parse_with_options(table)?;
            } else if self.check_keyword(Keyword::With) && self.peek().is_keyword(Keyword::Oids) {
                self.advance();
                self.advance();
                table.without_oids = false;
            } else if self.match_keyword(Keyword::Without) {
                self.expect_keyword(Keyword::Oids)?;
                table.without_oids = true;
            } else if self.match_keyword(Keyword::On) {
                self.expect_keyword(Keyword::Commit)?;
                table.on_commit = Some(self.parse_on_commit()?);
            } else if self.match_keyword(Keyword::Tablespace) {
                table.tablespace = Some(self.ident("tablespace name")?);
            } else {
                return Some(());
            }
        }
    }

    fn parse_inherits(&mut self, table: &mut TableStmt) -> Option<()> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let mut names = Vec::new();
        loop {
            names.push(self.qualified_name("parent table name")?);
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            break;
        }

        if let TableKind::Regular { inherits, .. } = &mut table.kind {
            *inherits = names;
            Some(())
        } else {
            self.error_here("INHERITS is only valid for regular tables");
            None
        }
    }

    fn parse_on_commit(&mut self) -> Option<OnCommitAction> {
        if self.match_keyword(Keyword::Preserve) {
            self.expect_keyword(Keyword::Rows)?;
            Some(OnCommitAction::PreserveRows)
        } else if self.match_keyword(Keyword::Delete) {
            self.expect_keyword(Keyword::Rows)?;
            Some(OnCommitAction::DeleteRows)
        } else if self.match_keyword(Keyword::Drop) {
            Some(OnCommitAction::Drop)
        } else {
            self.error_here(format!(
                "expected PRESERVE ROWS, DELETE ROWS, or DROP, found {}",
                self.current.describe()
            ));
            None
        }
    }

    /// `(RANGE|LIST|HASH) '(' part_elem (',' part_elem)* ')'`; the PARTITION
    /// BY keywords are already consumed.
    fn parse_partition_by(&mut self) -> Option<PartitionByClause> {
        let strategy = if self.match_keyword(Keyword::Range) {
            PartitionStrategy::Range
        } else if self.match_keyword(Keyword::List) {
            PartitionStrategy::List
        } else if self.match_keyword(Keyword::Hash) {
            PartitionStrategy::Hash
        } else {
            self.error_here(format!(
                "expected RANGE, LIST, or HASH, found {}",
                self.current.describe()
            ));
            return None;
        };

        self.expect_kind(TokenKind::LParen, "`(`")?;
        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_partition_elem()?);
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            break;
        }

        Some(PartitionByClause { strategy, elements })
    }

    fn parse_partition_elem(&mut self) -> Option<PartitionElem> {
        let mut elem = if self.check_kind(TokenKind::LParen) {
            let expr = self.capture_paren_expr("partition key")?;
            PartitionElem::expression(expr)
        } else {
            let name = self.ident("partition column")?;
            if self.check_kind(TokenKind::LParen) {
                // Function-call expression key, e.g. date_trunc('month', ts).
                let args = self.capture_paren_expr("partition key")?;
                PartitionElem::expression(format!("{name}({args})"))
            } else {
                PartitionElem::column(name)
            }
        };

        if self.match_keyword(Keyword::Collate) {
            elem.collation = Some(self.qualified_name("collation name")?);
        }
        if matches!(self.current.kind, TokenKind::Ident | TokenKind::QuotedIdent) {
            elem.opclass = Some(self.qualified_name("operator class")?);
        }
        Some(elem)
    }

    /// `WITH '(' key [= value] (',' key [= value])* ')'`; the `WITH (` is
    /// already consumed. A bare key means `true`.
    fn parse_with_options(&mut self, table: &mut TableStmt) -> Option<()> {
        if self.match_kind(TokenKind::RParen) {
            return Some(());
        }
        loop {
            let key = self.storage_param_name()?;
            let value = if self.match_kind(TokenKind::Equals) {
                self.storage_param_value()?
            } else {
                "true".to_string()
            };
            table.with_options.push((key, value));

            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen, "`,` or `)`")?;
            return Some(());
        }
    }

    /// Storage parameter names admit keywords and dotted namespaces
    /// (`toast.autovacuum_enabled`).
    fn storage_param_name(&mut self) -> Option<String> {
        let mut name = self.param_name_segment()?;
        while self.match_kind(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.param_name_segment()?);
        }
        Some(name)
    }

    fn param_name_segment(&mut self) -> Option<String> {
        match self.current.kind {
            TokenKind::Ident | TokenKind::Keyword(_) => {
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
                    "expected storage parameter name, found {}",
                    self.current.describe()
                ));
                None
            }
        }
    }

    fn storage_param_value(&mut self) -> Option<String> {
        match self.current.kind {
            TokenKind::Number | TokenKind::Ident | TokenKind::Keyword(_) => {
                let text = self.current.text.to_string();
                self.advance();
                Some(text)
            }
            TokenKind::StringLit => {
                let text = crate::lexer::unescape_string(self.current.text);
                self.advance();
                Some(text)
            }
            _ => {
                self.error_here(format!(
                    "expected storage parameter value, found {}",
                    self.current.describe()
                ));
                None
            }
        }
    }
}
