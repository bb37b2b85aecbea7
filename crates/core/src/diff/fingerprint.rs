use crate::ast::{
    ColumnConstraintKind, ConstraintTiming, MatchType, RefAction, TableConstraintKind, TableStmt,
    TableElement,
};

use super::{equivalence, options::CompareOptions};

/// A constraint lifted into a single comparable shape. Column-level
/// CHECK/UNIQUE/PRIMARY KEY/REFERENCES constraints are promoted to their
/// table-scope equivalent so both spellings of the same constraint match.
/// NOT NULL never appears here, in either spelling: it is a nullability
/// attribute owned by column comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedConstraint {
    pub name: Option<String>,
    pub kind_label: &'static str,
    /// Semantic identity: kind, sorted key columns, referenced object, and
    /// normalized expression plus action flags.
    pub fingerprint: String,
    /// Secondary attributes (timing flags, NULLS DISTINCT, index params,
    /// per-column action subsets). Equal fingerprints with unequal
    /// secondaries report as modified.
    pub secondary: String,
    /// Readable rendering used in diff records.
    pub definition: String,
}

pub(crate) fn collect_constraints(
    table: &TableStmt,
    options: &CompareOptions,
) -> Vec<NormalizedConstraint> {
    let mut constraints = Vec::new();

    for element in table.elements() {
        match element {
            TableElement::Constraint(constraint) => {
                if let Some(normalized) = normalize_table_constraint(
                    constraint.name.as_deref(),
                    &constraint.kind,
                    constraint.timing,
                    options,
                ) {
                    constraints.push(normalized);
                }
            }
            TableElement::Column(column) => {
                for constraint in &column.constraints {
                    if let Some(normalized) = promote_column_constraint(
                        &column.name,
                        constraint.name.as_deref(),
                        &constraint.kind,
                        constraint.timing,
                        options,
                    ) {
                        constraints.push(normalized);
                    }
                }
            }
            TableElement::Like(_) => {}
        }
    }

    constraints
}

fn normalize_table_constraint(
    name: Option<&str>,
    kind: &TableConstraintKind,
    timing: ConstraintTiming,
    options: &CompareOptions,
) -> Option<NormalizedConstraint> {
    let normalized = match kind {
        TableConstraintKind::Check { expr, no_inherit } => NormalizedConstraint {
            name: name.map(str::to_string),
            kind_label: "CHECK",
            fingerprint: format!(
                "check|{}|no_inherit={no_inherit}",
                expr_key(expr, options)
            ),
            secondary: timing_key(timing),
            definition: format!(
                "CHECK ({expr}){}",
                if *no_inherit { " NO INHERIT" } else { "" }
            ),
        },
        // Folded into column nullability, same as the inline spelling.
        TableConstraintKind::NotNull { .. } => return None,
        TableConstraintKind::Unique {
            columns,
            nulls_distinct,
            index_params,
        } => NormalizedConstraint {
            name: name.map(str::to_string),
            kind_label: "UNIQUE",
            fingerprint: format!("unique|{}", column_set_key(columns, options)),
            secondary: format!(
                "nulls_distinct={nulls_distinct:?}|params={}|{}",
                params_key(index_params.as_deref(), options),
                timing_key(timing)
            ),
            definition: format!("UNIQUE ({})", columns.join(", ")),
        },
        TableConstraintKind::PrimaryKey {
            columns,
            index_params,
        } => NormalizedConstraint {
            name: name.map(str::to_string),
            kind_label: "PRIMARY KEY",
            fingerprint: format!("primary_key|{}", column_set_key(columns, options)),
            secondary: format!(
                "params={}|{}",
                params_key(index_params.as_deref(), options),
                timing_key(timing)
            ),
            definition: format!("PRIMARY KEY ({})", columns.join(", ")),
        },
        TableConstraintKind::Exclude {
            index_method,
            elements,
            index_params,
            where_clause,
        } => {
            let element_key = elements
                .iter()
                .map(|element| {
                    format!(
                        "{} with {}",
                        expr_key(&element.expr, options),
                        element.operator
                    )
                })
                .collect::<Vec<_>>()
                .join(",");
            NormalizedConstraint {
                name: name.map(str::to_string),
                kind_label: "EXCLUDE",
                fingerprint: format!(
                    "exclude|{}|{element_key}|where={}",
                    index_method.as_deref().unwrap_or(""),
                    where_clause
                        .as_deref()
                        .map(|clause| expr_key(clause, options))
                        .unwrap_or_default()
                ),
                secondary: format!(
                    "params={}|{}",
                    params_key(index_params.as_deref(), options),
                    timing_key(timing)
                ),
                definition: render_exclude(index_method.as_deref(), elements, where_clause.as_deref()),
            }
        }
        TableConstraintKind::ForeignKey {
            columns,
            ref_table,
            ref_columns,
            match_type,
            on_delete,
            on_update,
            on_delete_columns,
            on_update_columns,
        } => NormalizedConstraint {
            name: name.map(str::to_string),
            kind_label: "FOREIGN KEY",
            fingerprint: foreign_key_fingerprint(
                columns,
                ref_table,
                ref_columns,
                *match_type,
                *on_delete,
                *on_update,
                options,
            ),
            secondary: format!(
                "del_cols={}|upd_cols={}|{}",
                column_set_key(on_delete_columns, options),
                column_set_key(on_update_columns, options),
                timing_key(timing)
            ),
            definition: render_foreign_key(
                columns,
                ref_table,
                ref_columns,
                *match_type,
                *on_delete,
                *on_update,
            ),
        },
    };
    Some(normalized)
}

/// Lifts a column constraint to table scope. NOT NULL, NULL, DEFAULT, and
/// GENERATED are column attributes handled by column comparison and return
/// `None` here.
fn promote_column_constraint(
    column: &str,
    name: Option<&str>,
    kind: &ColumnConstraintKind,
    timing: ConstraintTiming,
    options: &CompareOptions,
) -> Option<NormalizedConstraint> {
    let table_kind = match kind {
        ColumnConstraintKind::Check { expr, no_inherit } => TableConstraintKind::Check {
            expr: expr.clone(),
            no_inherit: *no_inherit,
        },
        ColumnConstraintKind::Unique {
            nulls_distinct,
            index_params,
        } => TableConstraintKind::Unique {
            columns: vec![column.to_string()],
            nulls_distinct: *nulls_distinct,
            index_params: index_params.clone(),
        },
        ColumnConstraintKind::PrimaryKey { index_params } => TableConstraintKind::PrimaryKey {
            columns: vec![column.to_string()],
            index_params: index_params.clone(),
        },
        ColumnConstraintKind::References {
            table,
            column: ref_column,
            match_type,
            on_delete,
            on_update,
        } => TableConstraintKind::ForeignKey {
            columns: vec![column.to_string()],
            ref_table: table.clone(),
            ref_columns: ref_column.iter().cloned().collect(),
            match_type: *match_type,
            on_delete: *on_delete,
            on_update: *on_update,
            on_delete_columns: Vec::new(),
            on_update_columns: Vec::new(),
        },
        ColumnConstraintKind::NotNull
        | ColumnConstraintKind::Null
        | ColumnConstraintKind::Default { .. }
        | ColumnConstraintKind::GeneratedExpr { .. }
        | ColumnConstraintKind::GeneratedIdentity { .. } => return None,
    };

    normalize_table_constraint(name, &table_kind, timing, options)
}

fn foreign_key_fingerprint(
    columns: &[String],
    ref_table: &str,
    ref_columns: &[String],
    match_type: Option<MatchType>,
    on_delete: Option<RefAction>,
    on_update: Option<RefAction>,
    options: &CompareOptions,
) -> String {
    format!(
        "foreign_key|{}|{}|{}|match={}|on_delete={}|on_update={}",
        column_set_key(columns, options),
        name_key(ref_table, options),
        column_set_key(ref_columns, options),
        match_type.map(MatchType::as_str).unwrap_or(""),
        on_delete.map(RefAction::as_str).unwrap_or(""),
        on_update.map(RefAction::as_str).unwrap_or(""),
    )
}

fn render_foreign_key(
    columns: &[String],
    ref_table: &str,
    ref_columns: &[String],
    match_type: Option<MatchType>,
    on_delete: Option<RefAction>,
    on_update: Option<RefAction>,
) -> String {
    let mut definition = format!("FOREIGN KEY ({}) REFERENCES {ref_table}", columns.join(", "));
    if !ref_columns.is_empty() {
        definition.push_str(&format!(" ({})", ref_columns.join(", ")));
    }
    if let Some(match_type) = match_type {
        definition.push_str(&format!(" MATCH {}", match_type.as_str()));
    }
    if let Some(action) = on_delete {
        definition.push_str(&format!(" ON DELETE {}", action.as_str()));
    }
    if let Some(action) = on_update {
        definition.push_str(&format!(" ON UPDATE {}", action.as_str()));
    }
    definition
}

fn render_exclude(
    index_method: Option<&str>,
    elements: &[crate::ast::ExcludeElement],
    where_clause: Option<&str>,
) -> String {
    let mut definition = String::from("EXCLUDE");
    if let Some(method) = index_method {
        definition.push_str(&format!(" USING {method}"));
    }
    let rendered: Vec<String> = elements
        .iter()
        .map(|element| format!("{} WITH {}", element.expr, element.operator))
        .collect();
    definition.push_str(&format!(" ({})", rendered.join(", ")));
    if let Some(clause) = where_clause {
        definition.push_str(&format!(" WHERE ({clause})"));
    }
    definition
}

fn name_key(name: &str, options: &CompareOptions) -> String {
    if options.case_sensitive {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

fn column_set_key(columns: &[String], options: &CompareOptions) -> String {
    let mut keys: Vec<String> = columns
        .iter()
        .map(|column| name_key(column, options))
        .collect();
    keys.sort_unstable();
    keys.join(",")
}

fn expr_key(expr: &str, options: &CompareOptions) -> String {
    if options.ignore_whitespace {
        equivalence::collapse_whitespace(expr)
    } else {
        expr.to_string()
    }
}

fn params_key(params: Option<&str>, options: &CompareOptions) -> String {
    params.map(|text| expr_key(text, options)).unwrap_or_default()
}

fn timing_key(timing: ConstraintTiming) -> String {
    format!(
        "deferrable={:?}|initially_deferred={:?}|enforced={:?}",
        timing.deferrable, timing.initially_deferred, timing.enforced
    )
}
