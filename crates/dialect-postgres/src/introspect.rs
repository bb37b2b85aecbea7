use log::debug;
use postgres::{Client, Row, types::FromSqlOwned};
use schemadelta_core::{
    ColumnConstraint, ColumnConstraintKind, ColumnDef, CompositeAttr, ConstraintTiming,
    CreateTypeStmt, ExcludeElement, GeneratedStorage, IdentityWhen, MatchType, PartitionByClause,
    PartitionElem, PartitionStrategy, Persistence, RangeTypeDef, RefAction, Schema, StorageType,
    TableConstraint, TableConstraintKind, TableElement, TableKind, TableStmt, TypeKind,
};
use thiserror::Error;

use crate::export_queries;
use crate::parser::parse_partition_bound_text;

/// A failed catalog query or row decode. Fatal to the introspection run;
/// nothing is partially returned.
#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("catalog query failed: {query}")]
    Query {
        query: &'static str,
        #[source]
        source: postgres::Error,
    },
}

/// Reads the connected database's catalogs and builds the same AST shape
/// the parser produces, through the same constructors. Issues read-only
/// queries only.
pub fn introspect_schema(client: &mut Client) -> Result<Schema, IntrospectError> {
    let mut schema = Schema::new();

    let table_rows = query(client, export_queries::TABLES_QUERY, &[])?;
    for row in &table_rows {
        let table = build_table(client, row)?;
        schema.tables.push(table);
    }
    debug!("introspected {} tables", schema.tables.len());

    build_enum_types(client, &mut schema)?;
    build_composite_types(client, &mut schema)?;
    build_range_types(client, &mut schema)?;
    build_routines(client, &mut schema)?;

    Ok(schema)
}

fn query(
    client: &mut Client,
    sql: &'static str,
    params: &[&(dyn postgres::types::ToSql + Sync)],
) -> Result<Vec<Row>, IntrospectError> {
    client
        .query(sql, params)
        .map_err(|source| IntrospectError::Query { query: sql, source })
}

fn row_value<T>(row: &Row, column: &str, sql: &'static str) -> Result<T, IntrospectError>
where
    T: FromSqlOwned,
{
    row.try_get(column)
        .map_err(|source| IntrospectError::Query { query: sql, source })
}

fn build_table(client: &mut Client, row: &Row) -> Result<TableStmt, IntrospectError> {
    const SQL: &str = export_queries::TABLES_QUERY;
    let schema_name: String = row_value(row, "table_schema", SQL)?;
    let table_name: String = row_value(row, "table_name", SQL)?;
    let persistence: String = row_value(row, "persistence", SQL)?;
    let is_partition: bool = row_value(row, "is_partition", SQL)?;
    let partition_key: Option<String> = row_value(row, "partition_key", SQL)?;
    let partition_bound: Option<String> = row_value(row, "partition_bound", SQL)?;
    let parent_schema: Option<String> = row_value(row, "parent_schema", SQL)?;
    let parent_name: Option<String> = row_value(row, "parent_name", SQL)?;
    let access_method: Option<String> = row_value(row, "access_method", SQL)?;
    let tablespace: Option<String> = row_value(row, "tablespace_name", SQL)?;
    let storage_options: Option<Vec<String>> = row_value(row, "storage_options", SQL)?;

    let qualified = qualify(&schema_name, &table_name);

    let mut table = if is_partition {
        let parent = match (parent_schema.as_deref(), parent_name.as_deref()) {
            (Some(schema), Some(name)) => qualify(schema, name),
            _ => String::new(),
        };
        let mut table = TableStmt::partition_of(qualified, parent);
        if let Some(bound_text) = partition_bound.as_deref()
            && let Some(bound) = parse_partition_bound_text(bound_text)
            && let TableKind::Partition {
                bound: table_bound, ..
            } = &mut table.kind
        {
            *table_bound = bound;
        }
        table
    } else {
        TableStmt::regular(qualified)
    };

    table.persistence = match persistence.as_str() {
        "u" => Persistence::Unlogged,
        "t" => Persistence::Temporary,
        _ => Persistence::Normal,
    };
    if let Some(key_text) = partition_key.as_deref() {
        table.partition_by = parse_partition_key(key_text);
    }
    table.access_method = access_method.filter(|method| method != "heap");
    table.tablespace = tablespace;
    if let Some(options) = storage_options {
        for option in options {
            match option.split_once('=') {
                Some((key, value)) => table
                    .with_options
                    .push((key.to_string(), value.to_string())),
                None => table.with_options.push((option, "true".to_string())),
            }
        }
    }

    populate_columns(client, &schema_name, &table_name, &mut table)?;
    populate_constraints(client, &schema_name, &table_name, &mut table)?;
    populate_inherits(client, &schema_name, &table_name, &mut table)?;

    Ok(table)
}

fn populate_columns(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
    table: &mut TableStmt,
) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::TABLE_COLUMNS_QUERY;
    let rows = query(client, SQL, &[&schema_name, &table_name])?;

    for row in &rows {
        let name: String = row_value(row, "column_name", SQL)?;
        let data_type: String = row_value(row, "data_type", SQL)?;
        let not_null: bool = row_value(row, "not_null", SQL)?;
        let default_expr: Option<String> = row_value(row, "default_expr", SQL)?;
        let identity_kind: String = row_value(row, "identity_kind", SQL)?;
        let generated_kind: String = row_value(row, "generated_kind", SQL)?;
        let column_storage: String = row_value(row, "column_storage", SQL)?;
        let type_storage: String = row_value(row, "type_storage", SQL)?;
        let compression: String = row_value(row, "compression", SQL)?;
        let collation: Option<String> = row_value(row, "collation_name", SQL)?;

        let mut column = ColumnDef::new(name, data_type);
        column.collation = collation;
        if column_storage != type_storage {
            column.storage = storage_from_char(&column_storage);
        }
        column.compression = match compression.as_str() {
            "p" => Some("pglz".to_string()),
            "l" => Some("lz4".to_string()),
            _ => None,
        };

        if not_null {
            column
                .constraints
                .push(ColumnConstraint::new(ColumnConstraintKind::NotNull));
        }

        match identity_kind.as_str() {
            "a" => column.constraints.push(ColumnConstraint::new(
                ColumnConstraintKind::GeneratedIdentity {
                    when: IdentityWhen::Always,
                    sequence_options: None,
                },
            )),
            "d" => column.constraints.push(ColumnConstraint::new(
                ColumnConstraintKind::GeneratedIdentity {
                    when: IdentityWhen::ByDefault,
                    sequence_options: None,
                },
            )),
            _ => {}
        }

        // For generated columns the catalog stores the generation
        // expression where plain defaults live.
        if let Some(expr) = default_expr {
            if generated_kind == "s" {
                column
                    .constraints
                    .push(ColumnConstraint::new(ColumnConstraintKind::GeneratedExpr {
                        expr,
                        storage: GeneratedStorage::Stored,
                    }));
            } else if identity_kind.is_empty() {
                column
                    .constraints
                    .push(ColumnConstraint::new(ColumnConstraintKind::Default {
                        expr,
                    }));
            }
        }

        table.elements_mut().push(TableElement::Column(column));
    }

    Ok(())
}

fn populate_constraints(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
    table: &mut TableStmt,
) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::TABLE_CONSTRAINTS_QUERY;
    let rows = query(client, SQL, &[&schema_name, &table_name])?;

    for row in &rows {
        let name: String = row_value(row, "constraint_name", SQL)?;
        let constraint_type: String = row_value(row, "constraint_type", SQL)?;
        let definition: String = row_value(row, "definition", SQL)?;
        let deferrable: bool = row_value(row, "deferrable", SQL)?;
        let initially_deferred: bool = row_value(row, "initially_deferred", SQL)?;
        let no_inherit: bool = row_value(row, "no_inherit", SQL)?;
        let fk_match: Option<String> = row_value(row, "fk_match", SQL)?;
        let fk_on_update: Option<String> = row_value(row, "fk_on_update", SQL)?;
        let fk_on_delete: Option<String> = row_value(row, "fk_on_delete", SQL)?;
        let ref_schema: Option<String> = row_value(row, "ref_schema", SQL)?;
        let ref_table: Option<String> = row_value(row, "ref_table", SQL)?;
        let columns: Option<Vec<String>> = row_value(row, "columns", SQL)?;
        let ref_columns: Option<Vec<String>> = row_value(row, "ref_columns", SQL)?;

        let columns = columns.unwrap_or_default();
        let kind = match constraint_type.as_str() {
            "c" => TableConstraintKind::Check {
                expr: strip_check_wrapper(&definition),
                no_inherit,
            },
            "u" => TableConstraintKind::Unique {
                columns,
                nulls_distinct: nulls_distinct_from_definition(&definition),
                index_params: None,
            },
            "p" => TableConstraintKind::PrimaryKey {
                columns,
                index_params: None,
            },
            "f" => {
                let ref_table = match (ref_schema.as_deref(), ref_table.as_deref()) {
                    (Some(schema), Some(name)) => qualify(schema, name),
                    _ => continue,
                };
                TableConstraintKind::ForeignKey {
                    columns,
                    ref_table,
                    ref_columns: ref_columns.unwrap_or_default(),
                    match_type: match fk_match.as_deref() {
                        Some("f") => Some(MatchType::Full),
                        Some("p") => Some(MatchType::Partial),
                        _ => None,
                    },
                    on_delete: ref_action_from_char(fk_on_delete.as_deref()),
                    on_update: ref_action_from_char(fk_on_update.as_deref()),
                    on_delete_columns: Vec::new(),
                    on_update_columns: Vec::new(),
                }
            }
            "x" => match exclude_from_definition(&definition) {
                Some(kind) => kind,
                None => continue,
            },
            _ => continue,
        };

        let mut constraint = TableConstraint::named(name, kind);
        if deferrable {
            constraint.timing = ConstraintTiming {
                deferrable: Some(true),
                initially_deferred: Some(initially_deferred),
                enforced: None,
            };
        }
        table.elements_mut().push(TableElement::Constraint(constraint));
    }

    Ok(())
}

fn populate_inherits(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
    table: &mut TableStmt,
) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::TABLE_INHERITS_QUERY;
    let rows = query(client, SQL, &[&schema_name, &table_name])?;

    let mut parents = Vec::with_capacity(rows.len());
    for row in &rows {
        let parent_schema: String = row_value(row, "parent_schema", SQL)?;
        let parent_name: String = row_value(row, "parent_name", SQL)?;
        parents.push(qualify(&parent_schema, &parent_name));
    }

    if let TableKind::Regular { inherits, .. } = &mut table.kind {
        *inherits = parents;
    }
    Ok(())
}

fn build_enum_types(client: &mut Client, schema: &mut Schema) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::ENUM_TYPES_QUERY;
    let rows = query(client, SQL, &[])?;
    for row in &rows {
        let type_schema: String = row_value(row, "type_schema", SQL)?;
        let type_name: String = row_value(row, "type_name", SQL)?;
        let labels: Vec<String> = row_value(row, "labels", SQL)?;
        schema.types.push(CreateTypeStmt::new(
            qualify(&type_schema, &type_name),
            TypeKind::Enum { labels },
        ));
    }
    Ok(())
}

fn build_composite_types(client: &mut Client, schema: &mut Schema) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::COMPOSITE_TYPES_QUERY;
    let rows = query(client, SQL, &[])?;

    let mut current: Option<(String, Vec<CompositeAttr>)> = None;
    for row in &rows {
        let type_schema: String = row_value(row, "type_schema", SQL)?;
        let type_name: String = row_value(row, "type_name", SQL)?;
        let attr_name: String = row_value(row, "attr_name", SQL)?;
        let attr_type: String = row_value(row, "attr_type", SQL)?;
        let attr_collation: Option<String> = row_value(row, "attr_collation", SQL)?;

        let qualified = qualify(&type_schema, &type_name);
        if current.as_ref().is_none_or(|(name, _)| *name != qualified) {
            if let Some((name, attrs)) = current.take() {
                schema
                    .types
                    .push(CreateTypeStmt::new(name, TypeKind::Composite { attrs }));
            }
            current = Some((qualified, Vec::new()));
        }
        if let Some((_, attrs)) = &mut current {
            attrs.push(CompositeAttr {
                name: attr_name,
                data_type: attr_type,
                collation: attr_collation,
            });
        }
    }
    if let Some((name, attrs)) = current.take() {
        schema
            .types
            .push(CreateTypeStmt::new(name, TypeKind::Composite { attrs }));
    }
    Ok(())
}

fn build_range_types(client: &mut Client, schema: &mut Schema) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::RANGE_TYPES_QUERY;
    let rows = query(client, SQL, &[])?;
    for row in &rows {
        let type_schema: String = row_value(row, "type_schema", SQL)?;
        let type_name: String = row_value(row, "type_name", SQL)?;
        let subtype: String = row_value(row, "subtype", SQL)?;
        let mut def = RangeTypeDef::new(subtype);
        def.opclass = row_value(row, "subtype_opclass", SQL)?;
        def.collation = row_value(row, "collation_name", SQL)?;
        def.canonical = row_value(row, "canonical", SQL)?;
        def.subtype_diff = row_value(row, "subtype_diff", SQL)?;
        def.multirange_type_name = row_value(row, "multirange_type_name", SQL)?;
        schema.types.push(CreateTypeStmt::new(
            qualify(&type_schema, &type_name),
            TypeKind::Range(def),
        ));
    }
    Ok(())
}

fn build_routines(client: &mut Client, schema: &mut Schema) -> Result<(), IntrospectError> {
    const SQL: &str = export_queries::ROUTINES_QUERY;
    let rows = query(client, SQL, &[])?;
    for row in &rows {
        let routine_schema: String = row_value(row, "routine_schema", SQL)?;
        let routine_name: String = row_value(row, "routine_name", SQL)?;
        let routine_kind: String = row_value(row, "routine_kind", SQL)?;
        let qualified = qualify(&routine_schema, &routine_name);
        match routine_kind.as_str() {
            "p" => schema.procedures.push(qualified),
            _ => schema.functions.push(qualified),
        }
    }
    Ok(())
}

fn qualify(schema: &str, name: &str) -> String {
    if schema == "public" {
        name.to_string()
    } else {
        format!("{schema}.{name}")
    }
}

fn storage_from_char(storage: &str) -> Option<StorageType> {
    match storage {
        "p" => Some(StorageType::Plain),
        "e" => Some(StorageType::External),
        "x" => Some(StorageType::Extended),
        "m" => Some(StorageType::Main),
        _ => None,
    }
}

fn ref_action_from_char(action: Option<&str>) -> Option<RefAction> {
    match action {
        Some("r") => Some(RefAction::Restrict),
        Some("c") => Some(RefAction::Cascade),
        Some("n") => Some(RefAction::SetNull),
        Some("d") => Some(RefAction::SetDefault),
        // 'a' (NO ACTION) is the default and matches an unwritten clause.
        _ => None,
    }
}

/// Extracts the expression inside `CHECK (...)` from a constraint
/// definition by tracking paren depth, so inner parentheses and a trailing
/// `NO INHERIT` never truncate the expression. Quoted regions are opaque.
fn strip_check_wrapper(definition: &str) -> String {
    let Some(open) = definition.find('(') else {
        return definition.trim().to_string();
    };

    let mut depth = 0u32;
    let mut in_string = false;
    for (index, ch) in definition[open..].char_indices() {
        match ch {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return definition[open + 1..open + index].trim().to_string();
                }
            }
            _ => {}
        }
    }
    definition[open + 1..].trim().to_string()
}

fn nulls_distinct_from_definition(definition: &str) -> Option<bool> {
    if definition.to_ascii_uppercase().contains("NULLS NOT DISTINCT") {
        Some(false)
    } else {
        None
    }
}

/// Parses a `pg_get_partkeydef` rendering such as `RANGE (a, (a + b))`.
fn parse_partition_key(text: &str) -> Option<PartitionByClause> {
    let trimmed = text.trim();
    let upper = trimmed.to_ascii_uppercase();
    let (strategy, keyword_len) = if upper.starts_with("RANGE") {
        (PartitionStrategy::Range, "RANGE".len())
    } else if upper.starts_with("LIST") {
        (PartitionStrategy::List, "LIST".len())
    } else if upper.starts_with("HASH") {
        (PartitionStrategy::Hash, "HASH".len())
    } else {
        return None;
    };

    let (inner, _) = balanced_group(&trimmed[keyword_len..])?;
    let elements = split_top_level_commas(inner)
        .into_iter()
        .map(|part| {
            if part
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
            {
                PartitionElem::column(part)
            } else {
                PartitionElem::expression(part.trim_matches(['(', ')']).trim())
            }
        })
        .collect();

    Some(PartitionByClause { strategy, elements })
}

/// Rebuilds an exclusion constraint from its definition text, e.g.
/// `EXCLUDE USING gist (room WITH =, during WITH &&) WHERE (active)`.
fn exclude_from_definition(definition: &str) -> Option<TableConstraintKind> {
    let rest = definition.trim().strip_prefix("EXCLUDE")?.trim_start();

    let (index_method, rest) = match rest.strip_prefix("USING ") {
        Some(after) => {
            let end = after.find(['(', ' ']).unwrap_or(after.len());
            (Some(after[..end].trim().to_string()), after[end..].trim_start())
        }
        None => (None, rest),
    };

    let (inner, consumed) = balanced_group(rest)?;
    let mut elements = Vec::new();
    for part in split_top_level_commas(inner) {
        let (expr, operator) = split_with_operator(part)?;
        elements.push(ExcludeElement {
            expr: expr.to_string(),
            operator: operator.to_string(),
        });
    }

    let tail = rest[consumed..].trim_start();
    let where_clause = tail
        .to_ascii_uppercase()
        .find("WHERE")
        .and_then(|at| balanced_group(tail[at + "WHERE".len()..].trim_start()))
        .map(|(clause, _)| clause.to_string());

    Some(TableConstraintKind::Exclude {
        index_method,
        elements,
        index_params: None,
        where_clause,
    })
}

/// Inner text of the leading balanced paren group, plus the byte length of
/// the group including its parens.
fn balanced_group(text: &str) -> Option<(&str, usize)> {
    let leading = text.len() - text.trim_start().len();
    let rest = &text[leading..];
    if !rest.starts_with('(') {
        return None;
    }
    let mut depth = 0u32;
    let mut in_string = false;
    for (index, ch) in rest.char_indices() {
        match ch {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[1..index].trim(), leading + index + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut in_string = false;
    let mut start = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Splits `element WITH operator` on the last top-level ` WITH `.
fn split_with_operator(part: &str) -> Option<(&str, &str)> {
    let upper = part.to_ascii_uppercase();
    let at = upper.rfind(" WITH ")?;
    Some((part[..at].trim(), part[at + " WITH ".len()..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_wrapper_tracks_paren_depth() {
        assert_eq!(
            strip_check_wrapper("CHECK ((length(name) > 0))"),
            "(length(name) > 0)"
        );
        assert_eq!(
            strip_check_wrapper("CHECK (price > discount(0)) NO INHERIT"),
            "price > discount(0)"
        );
    }

    #[test]
    fn check_wrapper_ignores_parens_inside_strings() {
        assert_eq!(
            strip_check_wrapper("CHECK (name <> ':)')"),
            "name <> ':)'"
        );
    }

    #[test]
    fn exclusion_definitions_round_trip() {
        let Some(TableConstraintKind::Exclude {
            index_method,
            elements,
            where_clause,
            ..
        }) = exclude_from_definition("EXCLUDE USING gist (room WITH =, during WITH &&)")
        else {
            panic!("expected exclusion constraint");
        };
        assert_eq!(index_method.as_deref(), Some("gist"));
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].expr, "room");
        assert_eq!(elements[0].operator, "=");
        assert_eq!(elements[1].operator, "&&");
        assert_eq!(where_clause, None);
    }

    #[test]
    fn ref_actions_default_to_unwritten() {
        assert_eq!(ref_action_from_char(Some("a")), None);
        assert_eq!(ref_action_from_char(Some("c")), Some(RefAction::Cascade));
    }

    #[test]
    fn schema_qualification_hides_public() {
        assert_eq!(qualify("public", "users"), "users");
        assert_eq!(qualify("billing", "invoices"), "billing.invoices");
    }
}
