use schemadelta_core::{
    CompareOptions, DiffKind, Schema, Severity, compare_schemas, compare_tables,
    diff_type_severity,
};
use schemadelta_dialect_postgres::parse;

fn parse_clean(sql: &str) -> Schema {
    let (schema, errors) = parse(sql);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    schema
}

#[test]
fn identical_tables_compare_clean() {
    let schema = parse_clean(
        "CREATE TABLE t (id INT PRIMARY KEY, name VARCHAR(100) NOT NULL DEFAULT '');",
    );
    let diff = compare_tables(&schema.tables[0], &schema.tables[0], &CompareOptions::default());
    assert!(!diff.has_changes());
    assert_eq!(diff.column_add_count(), 0);
    assert_eq!(diff.column_remove_count(), 0);
    assert_eq!(diff.column_modify_count(), 0);
    assert_eq!(diff.constraint_add_count(), 0);
    assert!(diff.diffs.is_empty());
}

#[test]
fn comparison_is_reflexive_for_parsed_schemas() {
    let schema = parse_clean(
        "CREATE TABLE users (
            id INT PRIMARY KEY,
            username VARCHAR(50) UNIQUE,
            created TIMESTAMPTZ DEFAULT now() NOT NULL
        ) WITH (fillfactor = 80);
        CREATE TABLE orders (id INT, user_id INT REFERENCES users (id) ON DELETE CASCADE)
          PARTITION BY RANGE (id);
        CREATE TYPE mood AS ENUM ('sad', 'ok', 'happy');",
    );
    let diff = compare_schemas(&schema, &schema, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);
    assert_eq!(diff.summary(), Default::default());
}

#[test]
fn added_column_is_reported_with_its_type() {
    let source = parse_clean(
        "CREATE TABLE users (id INT PRIMARY KEY, username VARCHAR(50), age INT);",
    );
    let target = parse_clean(
        "CREATE TABLE users (id INT PRIMARY KEY, username VARCHAR(50), age INT,
                             email VARCHAR(100));",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.tables_modified(), 1);

    let table_diff = &diff.table_diffs[0];
    assert_eq!(table_diff.column_add_count(), 1);
    assert_eq!(table_diff.columns_added[0].name, "email");
    assert!(
        table_diff.columns_added[0]
            .new_type
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains("varchar"))
    );
}

#[test]
fn foreign_key_action_change_is_at_least_a_warning() {
    let source = parse_clean(
        "CREATE TABLE items (order_id INT REFERENCES orders (id) ON DELETE CASCADE);",
    );
    let target = parse_clean(
        "CREATE TABLE items (order_id INT REFERENCES orders (id) ON DELETE RESTRICT);",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.tables_modified(), 1);

    let table_diff = &diff.table_diffs[0];
    let constraint_changes = table_diff.constraint_remove_count()
        + table_diff.constraint_add_count()
        + table_diff.constraint_modify_count();
    assert!(constraint_changes > 0, "expected a constraint diff");
    assert!(
        table_diff
            .diffs
            .iter()
            .any(|record| record.severity >= Severity::Warning),
        "an FK action change must be at least WARNING"
    );
}

#[test]
fn schema_level_add_remove_modify() {
    let source = parse_clean(
        "CREATE TABLE users (id INT);
         CREATE TABLE products (id INT);",
    );
    let target = parse_clean(
        "CREATE TABLE users (id INT, email VARCHAR(100));
         CREATE TABLE employees (id INT);",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.tables_added(), 1);
    assert_eq!(diff.tables_removed(), 1);
    assert_eq!(diff.tables_modified(), 1);

    // Removed/modified carry source order, added comes after.
    let names: Vec<&str> = diff
        .table_diffs
        .iter()
        .map(|d| d.table_name.as_str())
        .collect();
    assert_eq!(names, vec!["users", "products", "employees"]);

    let removed = diff.table_diffs.iter().find(|d| d.is_removed()).expect("removed");
    assert!(removed.source_table.is_some());
    assert!(removed.target_table.is_none());
    let added = diff.table_diffs.iter().find(|d| d.is_added()).expect("added");
    assert!(added.target_table.is_some());
}

#[test]
fn every_record_severity_matches_its_kind() {
    let source = parse_clean(
        "CREATE TABLE a (id INT, gone TEXT, t INT);
         CREATE TABLE removed_table (id INT);",
    );
    let target = parse_clean(
        "CREATE TABLE a (id BIGINT NOT NULL DEFAULT 0, t INT, fresh TEXT) TABLESPACE fast;",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert!(diff.total_diffs() > 0);
    for record in diff.all_diffs() {
        assert_eq!(record.severity, diff_type_severity(record.kind));
    }
}

#[test]
fn table_diffs_are_exactly_one_state() {
    let source = parse_clean(
        "CREATE TABLE stays (id INT);
         CREATE TABLE goes (id INT);
         CREATE TABLE changes (id INT);",
    );
    let target = parse_clean(
        "CREATE TABLE stays (id INT);
         CREATE TABLE changes (id BIGINT);
         CREATE TABLE arrives (id INT);",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    for table_diff in &diff.table_diffs {
        let states = usize::from(table_diff.is_added())
            + usize::from(table_diff.is_removed())
            + usize::from(table_diff.is_modified());
        assert_eq!(states, 1, "table {} has {states} states", table_diff.table_name);
        if table_diff.is_modified() {
            let has_child = table_diff.column_add_count()
                + table_diff.column_remove_count()
                + table_diff.column_modify_count()
                + table_diff.constraint_add_count()
                + table_diff.constraint_remove_count()
                + table_diff.constraint_modify_count()
                > 0;
            assert!(has_child || table_diff.any_table_flag());
        }
    }
    // The unchanged table never appears.
    assert!(diff.table_diffs.iter().all(|d| d.table_name != "stays"));
}

#[test]
fn type_aliases_compare_equal_by_default() {
    let source = parse_clean("CREATE TABLE t (a INT4, b TIMESTAMPTZ, c VARCHAR(10));");
    let target = parse_clean(
        "CREATE TABLE t (a INTEGER, b TIMESTAMP WITH TIME ZONE, c CHARACTER VARYING(10));",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);

    let strict = CompareOptions {
        normalize_types: false,
        ..CompareOptions::default()
    };
    let diff = compare_schemas(&source, &target, &strict);
    assert_eq!(diff.tables_modified(), 1);
    assert!(
        diff.table_diffs[0]
            .diffs
            .iter()
            .all(|record| record.kind == DiffKind::ColumnTypeChanged)
    );
}

#[test]
fn whitespace_in_expressions_is_ignored_by_default() {
    let source = parse_clean("CREATE TABLE t (a INT DEFAULT 1 + 2, CHECK (a>=0));");
    let target = parse_clean("CREATE TABLE t (a INT DEFAULT 1+2, CHECK (a >= 0));");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);

    let strict = CompareOptions {
        ignore_whitespace: false,
        ..CompareOptions::default()
    };
    let diff = compare_schemas(&source, &target, &strict);
    assert!(diff.total_diffs() > 0);
}

#[test]
fn constraint_rename_alone_is_invisible_when_names_are_ignored() {
    let source = parse_clean("CREATE TABLE t (a INT, CONSTRAINT old_name CHECK (a > 0));");
    let target = parse_clean("CREATE TABLE t (a INT, CONSTRAINT new_name CHECK (a > 0));");

    let ignore_names = CompareOptions {
        ignore_constraint_names: true,
        ..CompareOptions::default()
    };
    let diff = compare_schemas(&source, &target, &ignore_names);
    assert_eq!(diff.total_diffs(), 0);

    // By name, the rename reads as remove + add.
    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    let table_diff = &diff.table_diffs[0];
    assert_eq!(table_diff.constraint_remove_count(), 1);
    assert_eq!(table_diff.constraint_add_count(), 1);
}

#[test]
fn unnamed_constraints_pair_by_fingerprint() {
    let source = parse_clean("CREATE TABLE t (a INT, CHECK (a > 0), CHECK (a < 100));");
    let target = parse_clean("CREATE TABLE t (a INT, CHECK (a < 100), CHECK (a > 0));");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn column_and_table_constraint_spellings_match() {
    let source = parse_clean("CREATE TABLE t (id INT PRIMARY KEY);");
    let target = parse_clean("CREATE TABLE t (id INT, PRIMARY KEY (id));");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn constraint_comparison_can_be_disabled() {
    let source = parse_clean("CREATE TABLE t (a INT, CHECK (a > 0));");
    let target = parse_clean("CREATE TABLE t (a INT);");

    let options = CompareOptions {
        compare_constraints: false,
        ..CompareOptions::default()
    };
    let diff = compare_schemas(&source, &target, &options);
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn tablespace_and_storage_param_toggles() {
    let source = parse_clean("CREATE TABLE t (a INT) WITH (fillfactor = 70) TABLESPACE fast;");
    let target = parse_clean("CREATE TABLE t (a INT) WITH (fillfactor = 90) TABLESPACE slow;");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    let kinds: Vec<DiffKind> = diff.all_diffs().map(|record| record.kind).collect();
    assert!(kinds.contains(&DiffKind::TablespaceChanged));
    assert!(kinds.contains(&DiffKind::StorageParamsChanged));

    let options = CompareOptions {
        compare_tablespaces: false,
        compare_storage_params: false,
        ..CompareOptions::default()
    };
    let diff = compare_schemas(&source, &target, &options);
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn storage_param_order_is_not_a_change() {
    let source = parse_clean("CREATE TABLE t (a INT) WITH (fillfactor = 70, autovacuum_enabled = off);");
    let target = parse_clean("CREATE TABLE t (a INT) WITH (autovacuum_enabled = off, fillfactor = 70);");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn nullability_change_is_a_warning() {
    let source = parse_clean("CREATE TABLE t (a INT NOT NULL);");
    let target = parse_clean("CREATE TABLE t (a INT);");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    let record = diff
        .all_diffs()
        .find(|record| record.kind == DiffKind::ColumnNullableChanged)
        .expect("nullability diff");
    assert_eq!(record.severity, Severity::Warning);
}

#[test]
fn table_level_not_null_counts_once_as_nullability() {
    let source = parse_clean("CREATE TABLE t (id INT);");
    let target = parse_clean("CREATE TABLE t (id INT, NOT NULL id);");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 1);
    let record = diff.all_diffs().next().expect("one record");
    assert_eq!(record.kind, DiffKind::ColumnNullableChanged);

    // Inline and table-level NOT NULL describe the same schema.
    let inline = parse_clean("CREATE TABLE t (id INT NOT NULL);");
    let diff = compare_schemas(&inline, &target, &CompareOptions::default());
    assert_eq!(diff.total_diffs(), 0);
}

#[test]
fn partition_bound_change_is_reported() {
    let source = parse_clean(
        "CREATE TABLE p (id INT) PARTITION BY RANGE (id);
         CREATE TABLE p1 PARTITION OF p FOR VALUES FROM (1) TO (10);",
    );
    let target = parse_clean(
        "CREATE TABLE p (id INT) PARTITION BY RANGE (id);
         CREATE TABLE p1 PARTITION OF p FOR VALUES FROM (1) TO (20);",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert_eq!(diff.tables_modified(), 1);
    assert!(
        diff.table_diffs[0]
            .diffs
            .iter()
            .any(|record| record.kind == DiffKind::PartitionChanged)
    );
}

#[test]
fn inherits_order_matters() {
    let source = parse_clean("CREATE TABLE t (a INT) INHERITS (x, y);");
    let target = parse_clean("CREATE TABLE t (a INT) INHERITS (y, x);");

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    assert!(
        diff.all_diffs()
            .any(|record| record.kind == DiffKind::InheritsChanged)
    );
}

#[test]
fn enum_types_diff_at_schema_level() {
    let source = parse_clean("CREATE TYPE mood AS ENUM ('sad', 'happy');");
    let target = parse_clean(
        "CREATE TYPE mood AS ENUM ('sad', 'ok', 'happy');
         CREATE TYPE priority AS ENUM ('low', 'high');",
    );

    let diff = compare_schemas(&source, &target, &CompareOptions::default());
    let kinds: Vec<DiffKind> = diff.object_diffs.iter().map(|record| record.kind).collect();
    assert_eq!(kinds, vec![DiffKind::TypeModified, DiffKind::TypeAdded]);
}

#[test]
fn antisymmetry_of_added_and_removed() {
    let source = parse_clean("CREATE TABLE a (id INT); CREATE TABLE b (id INT);");
    let target = parse_clean("CREATE TABLE b (id INT); CREATE TABLE c (id INT);");

    let options = CompareOptions::default();
    let forward = compare_schemas(&source, &target, &options);
    let backward = compare_schemas(&target, &source, &options);
    assert_eq!(forward.tables_added(), backward.tables_removed());
    assert_eq!(forward.tables_removed(), backward.tables_added());
}
