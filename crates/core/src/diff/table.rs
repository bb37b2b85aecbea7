use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{
    ColumnDef, PartitionBoundSpec, PartitionByClause, PartitionKey, RangeBound, TableKind,
    TableStmt,
};

use super::{
    equivalence::{data_types_equal, expressions_equal, names_equal},
    fingerprint::{NormalizedConstraint, collect_constraints},
    options::CompareOptions,
    types::{ColumnDiff, ConstraintDiff, Diff, DiffKind, TableChange, TableDiff},
};

/// Computes the full difference between two tables matched by name. Never
/// fails; anything it cannot interpret compares as unchanged.
pub(crate) fn diff_tables<'a>(
    source: &'a TableStmt,
    target: &'a TableStmt,
    options: &CompareOptions,
) -> TableDiff<'a> {
    let mut diff = TableDiff::unchanged(target.name.clone());
    diff.source_table = Some(source);
    diff.target_table = Some(target);

    compare_table_kind(source, target, options, &mut diff);
    compare_table_options(source, target, options, &mut diff);
    compare_inherits(source, target, options, &mut diff);
    compare_partitioning(source, target, options, &mut diff);
    compare_columns(source, target, options, &mut diff);
    if options.compare_constraints {
        compare_constraints(source, target, options, &mut diff);
    }

    let changed = diff.any_table_flag()
        || !diff.columns_added.is_empty()
        || !diff.columns_removed.is_empty()
        || !diff.columns_modified.is_empty()
        || !diff.constraints_added.is_empty()
        || !diff.constraints_removed.is_empty()
        || !diff.constraints_modified.is_empty();
    if changed {
        diff.change = TableChange::Modified;
    }
    diff
}

fn compare_table_kind(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let table = target.name.as_str();

    match (&source.kind, &target.kind) {
        (TableKind::Regular { .. }, TableKind::Regular { .. }) => {}
        (TableKind::OfType { type_name: a, .. }, TableKind::OfType { type_name: b, .. }) => {
            if !names_equal(a, b, options) {
                diff.type_changed = true;
                diff.diffs.push(
                    Diff::new(DiffKind::TableTypeChanged, table, table)
                        .with_values(a.clone(), b.clone())
                        .with_description("composite type changed"),
                );
            }
        }
        (TableKind::Partition { .. }, TableKind::Partition { .. }) => {}
        (source_kind, target_kind) => {
            diff.type_changed = true;
            diff.diffs.push(
                Diff::new(DiffKind::TableTypeChanged, table, table)
                    .with_values(kind_label(source_kind), kind_label(target_kind))
                    .with_description("table variant changed"),
            );
        }
    }

    if source.persistence != target.persistence {
        diff.type_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::TableTypeChanged, table, table)
                .with_values(
                    format!("{:?}", source.persistence),
                    format!("{:?}", target.persistence),
                )
                .with_description("persistence changed"),
        );
    }

    if source.temp_scope != target.temp_scope {
        diff.type_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::TableTypeChanged, table, table)
                .with_values(
                    format!("{:?}", source.temp_scope),
                    format!("{:?}", target.temp_scope),
                )
                .with_description("temp scope changed"),
        );
    }

    if source.on_commit != target.on_commit {
        diff.type_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::TableTypeChanged, table, table)
                .with_values(
                    format!("{:?}", source.on_commit),
                    format!("{:?}", target.on_commit),
                )
                .with_description("on-commit action changed"),
        );
    }
}

fn kind_label(kind: &TableKind) -> &'static str {
    match kind {
        TableKind::Regular { .. } => "regular",
        TableKind::OfType { .. } => "of type",
        TableKind::Partition { .. } => "partition",
    }
}

fn compare_table_options(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let table = target.name.as_str();

    if options.compare_tablespaces
        && !optional_names_equal(
            source.tablespace.as_deref(),
            target.tablespace.as_deref(),
            options,
        )
    {
        diff.tablespace_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::TablespaceChanged, table, table).with_values(
                source.tablespace.clone().unwrap_or_default(),
                target.tablespace.clone().unwrap_or_default(),
            ),
        );
    }

    if !options.compare_storage_params {
        return;
    }

    if !optional_names_equal(
        source.access_method.as_deref(),
        target.access_method.as_deref(),
        options,
    ) {
        diff.storage_params_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::StorageParamsChanged, table, table)
                .with_values(
                    source.access_method.clone().unwrap_or_default(),
                    target.access_method.clone().unwrap_or_default(),
                )
                .with_description("access method changed"),
        );
    }

    if source.without_oids != target.without_oids {
        diff.storage_params_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::StorageParamsChanged, table, table)
                .with_values(
                    source.without_oids.to_string(),
                    target.without_oids.to_string(),
                )
                .with_description("without-oids changed"),
        );
    }

    if !storage_params_equal(&source.with_options, &target.with_options) {
        diff.storage_params_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::StorageParamsChanged, table, table)
                .with_values(
                    render_params(&source.with_options),
                    render_params(&target.with_options),
                )
                .with_description("storage parameters changed"),
        );
    }
}

/// WITH options compare as a set of key/value pairs; order alone is not a
/// change. Parameter names fold to lowercase, values compare exactly.
fn storage_params_equal(source: &[(String, String)], target: &[(String, String)]) -> bool {
    param_map(source) == param_map(target)
}

fn param_map(params: &[(String, String)]) -> BTreeMap<String, &str> {
    params
        .iter()
        .map(|(key, value)| (key.to_ascii_lowercase(), value.as_str()))
        .collect()
}

fn render_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn compare_inherits(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let table = target.name.as_str();
    let source_inherits = source.inherits();
    let target_inherits = target.inherits();

    // Ordered comparison: inheritance order drives column merging.
    let equal = source_inherits.len() == target_inherits.len()
        && source_inherits
            .iter()
            .zip(target_inherits)
            .all(|(a, b)| names_equal(a, b, options));
    if !equal {
        diff.inherits_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::InheritsChanged, table, table).with_values(
                source_inherits.join(", "),
                target_inherits.join(", "),
            ),
        );
    }
}

fn compare_partitioning(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let table = target.name.as_str();

    if !partition_by_equal(
        source.partition_by.as_ref(),
        target.partition_by.as_ref(),
        options,
    ) {
        diff.partition_changed = true;
        diff.diffs.push(
            Diff::new(DiffKind::PartitionChanged, table, table)
                .with_description("partition key changed"),
        );
    }

    if let (
        TableKind::Partition {
            parent: source_parent,
            bound: source_bound,
            ..
        },
        TableKind::Partition {
            parent: target_parent,
            bound: target_bound,
            ..
        },
    ) = (&source.kind, &target.kind)
    {
        if !names_equal(source_parent, target_parent, options) {
            diff.partition_changed = true;
            diff.diffs.push(
                Diff::new(DiffKind::PartitionChanged, table, table)
                    .with_values(source_parent.clone(), target_parent.clone())
                    .with_description("partition parent changed"),
            );
        }
        if !bounds_equal(source_bound, target_bound, options) {
            diff.partition_changed = true;
            diff.diffs.push(
                Diff::new(DiffKind::PartitionChanged, table, table)
                    .with_description("partition bound changed"),
            );
        }
    }
}

fn partition_by_equal(
    source: Option<&PartitionByClause>,
    target: Option<&PartitionByClause>,
    options: &CompareOptions,
) -> bool {
    match (source, target) {
        (None, None) => true,
        (Some(source), Some(target)) => {
            source.strategy == target.strategy
                && source.elements.len() == target.elements.len()
                && source.elements.iter().zip(&target.elements).all(|(a, b)| {
                    partition_keys_equal(&a.key, &b.key, options)
                        && optional_names_equal(a.collation.as_deref(), b.collation.as_deref(), options)
                        && optional_names_equal(a.opclass.as_deref(), b.opclass.as_deref(), options)
                })
        }
        _ => false,
    }
}

fn partition_keys_equal(a: &PartitionKey, b: &PartitionKey, options: &CompareOptions) -> bool {
    match (a, b) {
        (PartitionKey::Column(a), PartitionKey::Column(b)) => names_equal(a, b, options),
        _ => expressions_equal(a.text(), b.text(), options),
    }
}

fn bounds_equal(a: &PartitionBoundSpec, b: &PartitionBoundSpec, options: &CompareOptions) -> bool {
    match (a, b) {
        (PartitionBoundSpec::Default, PartitionBoundSpec::Default) => true,
        (PartitionBoundSpec::In { exprs: a }, PartitionBoundSpec::In { exprs: b }) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(a, b)| expressions_equal(a, b, options))
        }
        (
            PartitionBoundSpec::Range { from: af, to: at },
            PartitionBoundSpec::Range { from: bf, to: bt },
        ) => range_bounds_equal(af, bf, options) && range_bounds_equal(at, bt, options),
        (
            PartitionBoundSpec::Hash {
                modulus: am,
                remainder: ar,
            },
            PartitionBoundSpec::Hash {
                modulus: bm,
                remainder: br,
            },
        ) => am == bm && ar == br,
        _ => false,
    }
}

fn range_bounds_equal(a: &[RangeBound], b: &[RangeBound], options: &CompareOptions) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| match (a, b) {
            (RangeBound::MinValue, RangeBound::MinValue)
            | (RangeBound::MaxValue, RangeBound::MaxValue) => true,
            (RangeBound::Expr(a), RangeBound::Expr(b)) => expressions_equal(a, b, options),
            _ => false,
        })
}

fn compare_columns(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let table = target.name.as_str();
    let target_by_name: BTreeMap<String, &ColumnDef> = target
        .columns()
        .map(|column| (column_key(&column.name, options), column))
        .collect();
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for source_column in source.columns() {
        let key = column_key(&source_column.name, options);
        let Some(target_column) = target_by_name.get(&key).copied() else {
            diff.columns_removed.push(ColumnDiff {
                old_type: Some(source_column.data_type.clone()),
                ..ColumnDiff::named(&source_column.name)
            });
            diff.diffs.push(
                Diff::new(DiffKind::ColumnRemoved, table, &source_column.name)
                    .with_description(format!("column was {}", source_column.data_type)),
            );
            continue;
        };
        matched.insert(key);

        if let Some(column_diff) =
            diff_column(source, source_column, target, target_column, options, table, &mut diff.diffs)
        {
            diff.columns_modified.push(column_diff);
        }
    }

    for target_column in target.columns() {
        let key = column_key(&target_column.name, options);
        if matched.contains(&key) || source_column_exists(source, &key, options) {
            continue;
        }
        diff.columns_added.push(ColumnDiff {
            new_type: Some(target_column.data_type.clone()),
            ..ColumnDiff::named(&target_column.name)
        });
        diff.diffs.push(
            Diff::new(DiffKind::ColumnAdded, table, &target_column.name)
                .with_description(format!("column is {}", target_column.data_type)),
        );
    }
}

fn source_column_exists(source: &TableStmt, key: &str, options: &CompareOptions) -> bool {
    source
        .columns()
        .any(|column| column_key(&column.name, options) == key)
}

fn column_key(name: &str, options: &CompareOptions) -> String {
    if options.case_sensitive {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

#[allow(clippy::too_many_arguments)]
fn diff_column(
    source: &TableStmt,
    source_column: &ColumnDef,
    target: &TableStmt,
    target_column: &ColumnDef,
    options: &CompareOptions,
    table: &str,
    diffs: &mut Vec<Diff>,
) -> Option<ColumnDiff> {
    let mut column_diff = ColumnDiff::named(&target_column.name);
    let column = &target_column.name;

    if !data_types_equal(&source_column.data_type, &target_column.data_type, options) {
        column_diff.type_changed = true;
        column_diff.old_type = Some(source_column.data_type.clone());
        column_diff.new_type = Some(target_column.data_type.clone());
        diffs.push(
            Diff::new(DiffKind::ColumnTypeChanged, table, column).with_values(
                source_column.data_type.clone(),
                target_column.data_type.clone(),
            ),
        );
    }

    let source_not_null = column_not_null(source, source_column, options);
    let target_not_null = column_not_null(target, target_column, options);
    if source_not_null != target_not_null {
        column_diff.nullable_changed = true;
        diffs.push(
            Diff::new(DiffKind::ColumnNullableChanged, table, column)
                .with_values(null_label(source_not_null), null_label(target_not_null)),
        );
    }

    if !optional_exprs_equal(
        source_column.default_expr(),
        target_column.default_expr(),
        options,
    ) {
        column_diff.default_changed = true;
        diffs.push(
            Diff::new(DiffKind::ColumnDefaultChanged, table, column).with_values(
                source_column.default_expr().unwrap_or_default(),
                target_column.default_expr().unwrap_or_default(),
            ),
        );
    }

    if !optional_names_equal(
        source_column.collation.as_deref(),
        target_column.collation.as_deref(),
        options,
    ) {
        column_diff.collation_changed = true;
        diffs.push(
            Diff::new(DiffKind::ColumnCollationChanged, table, column).with_values(
                source_column.collation.clone().unwrap_or_default(),
                target_column.collation.clone().unwrap_or_default(),
            ),
        );
    }

    if source_column.storage != target_column.storage {
        column_diff.storage_changed = true;
        diffs.push(
            Diff::new(DiffKind::ColumnStorageChanged, table, column).with_values(
                format!("{:?}", source_column.storage),
                format!("{:?}", target_column.storage),
            ),
        );
    }

    if !optional_names_equal(
        source_column.compression.as_deref(),
        target_column.compression.as_deref(),
        options,
    ) {
        column_diff.compression_changed = true;
        diffs.push(
            Diff::new(DiffKind::ColumnCompressionChanged, table, column).with_values(
                source_column.compression.clone().unwrap_or_default(),
                target_column.compression.clone().unwrap_or_default(),
            ),
        );
    }

    column_diff.any_changed().then_some(column_diff)
}

/// NOT NULL can come from the column itself or a table-scope NOT NULL
/// constraint naming the column.
fn column_not_null(table: &TableStmt, column: &ColumnDef, options: &CompareOptions) -> bool {
    if column.is_not_null() {
        return true;
    }
    table.table_constraints().any(|constraint| {
        matches!(
            &constraint.kind,
            crate::ast::TableConstraintKind::NotNull { column: name, .. }
                if names_equal(name, &column.name, options)
        )
    })
}

fn null_label(not_null: bool) -> &'static str {
    if not_null { "NOT NULL" } else { "NULL" }
}

fn optional_exprs_equal(a: Option<&str>, b: Option<&str>, options: &CompareOptions) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => expressions_equal(a, b, options),
        _ => false,
    }
}

fn optional_names_equal(a: Option<&str>, b: Option<&str>, options: &CompareOptions) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => names_equal(a, b, options),
        _ => false,
    }
}

fn compare_constraints(
    source: &TableStmt,
    target: &TableStmt,
    options: &CompareOptions,
    diff: &mut TableDiff<'_>,
) {
    let source_constraints = collect_constraints(source, options);
    let target_constraints = collect_constraints(target, options);
    let mut target_used = vec![false; target_constraints.len()];

    for source_constraint in &source_constraints {
        let matched = find_match(
            source_constraint,
            &target_constraints,
            &target_used,
            options,
        );

        match matched {
            Some(index) => {
                target_used[index] = true;
                let target_constraint = &target_constraints[index];
                if constraint_modified(source_constraint, target_constraint, options) {
                    push_constraint_diff(
                        diff,
                        &target.name,
                        DiffKind::ConstraintModified,
                        target_constraint.name.as_deref().or(source_constraint.name.as_deref()),
                        target_constraint.kind_label,
                        Some(&source_constraint.definition),
                        Some(&target_constraint.definition),
                    );
                }
            }
            None => {
                push_constraint_diff(
                    diff,
                    &target.name,
                    DiffKind::ConstraintRemoved,
                    source_constraint.name.as_deref(),
                    source_constraint.kind_label,
                    Some(&source_constraint.definition),
                    None,
                );
            }
        }
    }

    for (index, target_constraint) in target_constraints.iter().enumerate() {
        if target_used[index] {
            continue;
        }
        push_constraint_diff(
            diff,
            &target.name,
            DiffKind::ConstraintAdded,
            target_constraint.name.as_deref(),
            target_constraint.kind_label,
            None,
            Some(&target_constraint.definition),
        );
    }
}

/// Pairing rule: under `ignore_constraint_names` everything pairs by
/// fingerprint, first unused match in source order. Otherwise named
/// constraints pair by name and unnamed ones fall back to the fingerprint.
fn find_match(
    source_constraint: &NormalizedConstraint,
    target_constraints: &[NormalizedConstraint],
    target_used: &[bool],
    options: &CompareOptions,
) -> Option<usize> {
    if !options.ignore_constraint_names
        && let Some(source_name) = source_constraint.name.as_deref()
    {
        return target_constraints.iter().enumerate().position(|(index, candidate)| {
            !target_used[index]
                && candidate
                    .name
                    .as_deref()
                    .is_some_and(|name| names_equal(name, source_name, options))
        });
    }

    target_constraints.iter().enumerate().position(|(index, candidate)| {
        !target_used[index]
            && candidate.fingerprint == source_constraint.fingerprint
            && (options.ignore_constraint_names || candidate.name.is_none())
    })
}

fn constraint_modified(
    source: &NormalizedConstraint,
    target: &NormalizedConstraint,
    _options: &CompareOptions,
) -> bool {
    source.fingerprint != target.fingerprint || source.secondary != target.secondary
}

#[allow(clippy::too_many_arguments)]
fn push_constraint_diff(
    diff: &mut TableDiff<'_>,
    table: &str,
    kind: DiffKind,
    name: Option<&str>,
    kind_label: &str,
    old_definition: Option<&str>,
    new_definition: Option<&str>,
) {
    let entry = ConstraintDiff {
        name: name.map(str::to_string),
        kind: kind_label.to_string(),
        old_definition: old_definition.map(str::to_string),
        new_definition: new_definition.map(str::to_string),
    };
    let element = name
        .map(str::to_string)
        .unwrap_or_else(|| kind_label.to_string());

    let mut record = Diff::new(kind, table, element);
    record.old_value = old_definition.map(str::to_string);
    record.new_value = new_definition.map(str::to_string);
    diff.diffs.push(record);

    match kind {
        DiffKind::ConstraintAdded => diff.constraints_added.push(entry),
        DiffKind::ConstraintRemoved => diff.constraints_removed.push(entry),
        _ => diff.constraints_modified.push(entry),
    }
}
