use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::ast::{CompositeAttr, CreateTypeStmt, Schema, TableStmt, TypeKind};

use super::{
    equivalence::{data_types_equal, names_equal},
    options::{CompareOptions, should_compare_table},
    table::diff_tables,
    types::{Diff, DiffKind, SchemaDiff, TableChange, TableDiff},
};

/// Compares two tables matched by name. Total: always returns a diff, which
/// is `Unchanged` when nothing differs.
#[must_use]
pub fn compare_tables<'a>(
    source: &'a TableStmt,
    target: &'a TableStmt,
    options: &CompareOptions,
) -> TableDiff<'a> {
    diff_tables(source, target, options)
}

/// Compares two schemas. Removed and modified tables appear in source order,
/// added tables in target order; unchanged tables are omitted. Comparison is
/// total and never fails.
#[must_use]
pub fn compare_schemas<'a>(
    source: &'a Schema,
    target: &'a Schema,
    options: &CompareOptions,
) -> SchemaDiff<'a> {
    let mut diff = SchemaDiff::default();

    compare_schema_tables(source, target, options, &mut diff);
    compare_schema_types(source, target, options, &mut diff);
    compare_name_sets(
        &source.functions,
        &target.functions,
        DiffKind::FunctionRemoved,
        DiffKind::FunctionAdded,
        options,
        &mut diff.object_diffs,
    );
    compare_name_sets(
        &source.procedures,
        &target.procedures,
        DiffKind::ProcedureRemoved,
        DiffKind::ProcedureAdded,
        options,
        &mut diff.object_diffs,
    );

    diff
}

fn compare_schema_tables<'a>(
    source: &'a Schema,
    target: &'a Schema,
    options: &CompareOptions,
    diff: &mut SchemaDiff<'a>,
) {
    let target_by_name = index_tables(&target.tables, options);
    let source_by_name = index_tables(&source.tables, options);
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for source_table in &source.tables {
        let key = fold_name(&source_table.name, options);
        if matched.contains(&key) {
            warn!(
                "duplicate table `{}` in source schema; first definition wins",
                source_table.name
            );
            continue;
        }
        if !should_compare_table(&source_table.name, options) {
            matched.insert(key);
            continue;
        }

        match target_by_name.get(&key).copied() {
            Some(target_table) => {
                matched.insert(key);
                let table_diff = diff_tables(source_table, target_table, options);
                if table_diff.change == TableChange::Modified {
                    diff.table_diffs.push(table_diff);
                }
            }
            None => {
                matched.insert(key);
                let mut removed = TableDiff::unchanged(source_table.name.clone());
                removed.change = TableChange::Removed;
                removed.source_table = Some(source_table);
                removed
                    .diffs
                    .push(Diff::new(DiffKind::TableRemoved, &source_table.name, &source_table.name));
                diff.table_diffs.push(removed);
            }
        }
    }

    for target_table in &target.tables {
        let key = fold_name(&target_table.name, options);
        if source_by_name.contains_key(&key) || !should_compare_table(&target_table.name, options) {
            continue;
        }

        let mut added = TableDiff::unchanged(target_table.name.clone());
        added.change = TableChange::Added;
        added.target_table = Some(target_table);
        added
            .diffs
            .push(Diff::new(DiffKind::TableAdded, &target_table.name, &target_table.name));
        diff.table_diffs.push(added);
    }
}

fn index_tables<'a>(
    tables: &'a [TableStmt],
    options: &CompareOptions,
) -> BTreeMap<String, &'a TableStmt> {
    let mut by_name = BTreeMap::new();
    for table in tables {
        let key = fold_name(&table.name, options);
        // First definition wins on duplicates.
        by_name.entry(key).or_insert(table);
    }
    by_name
}

fn fold_name(name: &str, options: &CompareOptions) -> String {
    if options.case_sensitive {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

fn compare_schema_types(
    source: &Schema,
    target: &Schema,
    options: &CompareOptions,
    diff: &mut SchemaDiff<'_>,
) {
    let target_by_name: BTreeMap<String, &CreateTypeStmt> = target
        .types
        .iter()
        .map(|stmt| (fold_name(&stmt.name, options), stmt))
        .collect();
    let source_by_name: BTreeMap<String, &CreateTypeStmt> = source
        .types
        .iter()
        .map(|stmt| (fold_name(&stmt.name, options), stmt))
        .collect();

    for source_type in &source.types {
        let key = fold_name(&source_type.name, options);
        match target_by_name.get(&key) {
            Some(target_type) => {
                if !type_kinds_equal(&source_type.kind, &target_type.kind, options) {
                    diff.object_diffs.push(
                        Diff::new(DiffKind::TypeModified, &target_type.name, &target_type.name)
                            .with_description(type_kind_label(&target_type.kind)),
                    );
                }
            }
            None => {
                diff.object_diffs.push(
                    Diff::new(DiffKind::TypeRemoved, &source_type.name, &source_type.name)
                        .with_description(type_kind_label(&source_type.kind)),
                );
            }
        }
    }

    for target_type in &target.types {
        let key = fold_name(&target_type.name, options);
        if !source_by_name.contains_key(&key) {
            diff.object_diffs.push(
                Diff::new(DiffKind::TypeAdded, &target_type.name, &target_type.name)
                    .with_description(type_kind_label(&target_type.kind)),
            );
        }
    }
}

fn type_kind_label(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Enum { .. } => "enum type",
        TypeKind::Composite { .. } => "composite type",
        TypeKind::Range(_) => "range type",
        TypeKind::Base(_) => "base type",
    }
}

fn type_kinds_equal(source: &TypeKind, target: &TypeKind, options: &CompareOptions) -> bool {
    match (source, target) {
        (TypeKind::Enum { labels: a }, TypeKind::Enum { labels: b }) => a == b,
        (TypeKind::Composite { attrs: a }, TypeKind::Composite { attrs: b }) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(a, b)| composite_attrs_equal(a, b, options))
        }
        (TypeKind::Range(a), TypeKind::Range(b)) => {
            data_types_equal(&a.subtype, &b.subtype, options)
                && optional_names_equal(a.opclass.as_deref(), b.opclass.as_deref(), options)
                && optional_names_equal(a.collation.as_deref(), b.collation.as_deref(), options)
                && optional_names_equal(a.canonical.as_deref(), b.canonical.as_deref(), options)
                && optional_names_equal(a.subtype_diff.as_deref(), b.subtype_diff.as_deref(), options)
                && optional_names_equal(
                    a.multirange_type_name.as_deref(),
                    b.multirange_type_name.as_deref(),
                    options,
                )
        }
        (TypeKind::Base(a), TypeKind::Base(b)) => {
            // Base types carry catalog wiring; only the DEFAULT literal gets
            // whitespace normalization.
            let mut a = a.clone();
            let mut b = b.clone();
            if options.ignore_whitespace {
                if let Some(default) = a.default.as_mut() {
                    *default = super::equivalence::collapse_whitespace(default);
                }
                if let Some(default) = b.default.as_mut() {
                    *default = super::equivalence::collapse_whitespace(default);
                }
            }
            a == b
        }
        _ => false,
    }
}

fn composite_attrs_equal(a: &CompositeAttr, b: &CompositeAttr, options: &CompareOptions) -> bool {
    names_equal(&a.name, &b.name, options)
        && data_types_equal(&a.data_type, &b.data_type, options)
        && optional_names_equal(a.collation.as_deref(), b.collation.as_deref(), options)
}

fn optional_names_equal(a: Option<&str>, b: Option<&str>, options: &CompareOptions) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => names_equal(a, b, options),
        _ => false,
    }
}

fn compare_name_sets(
    source: &[String],
    target: &[String],
    removed_kind: DiffKind,
    added_kind: DiffKind,
    options: &CompareOptions,
    records: &mut Vec<Diff>,
) {
    let target_keys: BTreeSet<String> = target
        .iter()
        .map(|name| fold_name(name, options))
        .collect();
    let source_keys: BTreeSet<String> = source
        .iter()
        .map(|name| fold_name(name, options))
        .collect();

    for name in source {
        if !target_keys.contains(&fold_name(name, options)) {
            records.push(Diff::new(removed_kind, name, name));
        }
    }
    for name in target {
        if !source_keys.contains(&fold_name(name, options)) {
            records.push(Diff::new(added_kind, name, name));
        }
    }
}
