use schemadelta_core::{
    ColumnConstraintKind, ColumnDef, GeneratedStorage, IdentityWhen, LikeOption, MatchType,
    OnCommitAction, PartitionBoundSpec, PartitionKey, PartitionStrategy, Persistence, RangeBound,
    RefAction, StorageType, TableConstraintKind, TableElement, TableKind, TableStmt, TempScope,
    TypeKind, normalize_type_name,
};
use schemadelta_dialect_postgres::parse;

fn parse_one_table(sql: &str) -> TableStmt {
    let (schema, errors) = parse(sql);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    assert_eq!(schema.tables.len(), 1, "expected exactly one table");
    schema.tables.into_iter().next().expect("one table")
}

fn columns(table: &TableStmt) -> Vec<&ColumnDef> {
    table.columns().collect()
}

#[test]
fn minimal_create_table() {
    let table = parse_one_table("CREATE TABLE users (id INTEGER);");
    assert_eq!(table.name, "users");
    assert!(matches!(table.kind, TableKind::Regular { .. }));
    assert_eq!(table.persistence, Persistence::Normal);
    assert!(!table.if_not_exists);

    let columns = columns(&table);
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "id");
    assert_eq!(normalize_type_name(&columns[0].data_type), "integer");
    assert!(columns[0].constraints.is_empty());
}

#[test]
fn data_types_keep_modifiers_and_arrays() {
    let table = parse_one_table(
        "CREATE TABLE t (
            a VARCHAR(100),
            b NUMERIC(10, 2),
            c DOUBLE PRECISION,
            d CHARACTER VARYING,
            e TIMESTAMP(3) WITH TIME ZONE,
            f INT[],
            g TEXT[3][],
            h myschema.mytype
        );",
    );
    let columns = columns(&table);
    assert_eq!(columns[0].data_type, "VARCHAR(100)");
    assert_eq!(columns[1].data_type, "NUMERIC(10,2)");
    assert_eq!(columns[2].data_type, "DOUBLE precision");
    assert_eq!(normalize_type_name(&columns[2].data_type), "double precision");
    assert_eq!(normalize_type_name(&columns[3].data_type), "character varying");
    assert_eq!(
        normalize_type_name(&columns[4].data_type),
        "timestamp(3) with time zone"
    );
    assert_eq!(columns[5].data_type, "INT[]");
    assert_eq!(columns[6].data_type, "TEXT[3][]");
    assert_eq!(columns[7].data_type, "myschema.mytype");
}

#[test]
fn column_attributes_and_constraints() {
    let table = parse_one_table(
        "CREATE TABLE t (
            id INT PRIMARY KEY,
            name VARCHAR(100) NOT NULL DEFAULT '' COLLATE \"en_US\",
            body TEXT STORAGE EXTENDED COMPRESSION lz4,
            age INT CONSTRAINT age_positive CHECK (age >= 0) NO INHERIT,
            note TEXT NULL
        );",
    );
    let columns = columns(&table);

    assert!(matches!(
        columns[0].constraints[0].kind,
        ColumnConstraintKind::PrimaryKey { index_params: None }
    ));

    let name_column = columns[1];
    assert!(name_column.is_not_null());
    assert_eq!(name_column.default_expr(), Some("''"));
    assert_eq!(name_column.collation.as_deref(), Some("en_US"));

    assert_eq!(columns[2].storage, Some(StorageType::Extended));
    assert_eq!(columns[2].compression.as_deref(), Some("lz4"));

    let check = &columns[3].constraints[0];
    assert_eq!(check.name.as_deref(), Some("age_positive"));
    assert!(matches!(
        &check.kind,
        ColumnConstraintKind::Check { expr, no_inherit: true } if expr == "age >= 0"
    ));

    assert!(matches!(
        columns[4].constraints[0].kind,
        ColumnConstraintKind::Null
    ));
}

#[test]
fn default_expressions_stop_at_following_constraints() {
    let table = parse_one_table(
        "CREATE TABLE t (
            created TIMESTAMPTZ DEFAULT now() NOT NULL,
            label TEXT DEFAULT 'it''s' || ' fine',
            flag BOOLEAN DEFAULT NULL
        );",
    );
    let columns = columns(&table);
    assert_eq!(columns[0].default_expr(), Some("now()"));
    assert!(columns[0].is_not_null());
    assert_eq!(columns[1].default_expr(), Some("'it''s' || ' fine'"));
    assert_eq!(columns[2].default_expr(), Some("NULL"));
}

#[test]
fn generated_columns_and_identity() {
    let table = parse_one_table(
        "CREATE TABLE t (
            id BIGINT GENERATED ALWAYS AS IDENTITY (START WITH 10 INCREMENT BY 2),
            seq INT GENERATED BY DEFAULT AS IDENTITY,
            area NUMERIC GENERATED ALWAYS AS (width * height) STORED
        );",
    );
    let columns = columns(&table);

    let ColumnConstraintKind::GeneratedIdentity {
        when,
        sequence_options,
    } = &columns[0].constraints[0].kind
    else {
        panic!("expected identity constraint");
    };
    assert_eq!(*when, IdentityWhen::Always);
    assert_eq!(sequence_options.as_deref(), Some("START WITH 10 INCREMENT BY 2"));

    assert!(matches!(
        &columns[1].constraints[0].kind,
        ColumnConstraintKind::GeneratedIdentity {
            when: IdentityWhen::ByDefault,
            sequence_options: None,
        }
    ));

    assert!(matches!(
        &columns[2].constraints[0].kind,
        ColumnConstraintKind::GeneratedExpr { expr, storage: GeneratedStorage::Stored }
            if expr == "width * height"
    ));
}

#[test]
fn constraint_timing_is_tri_state() {
    let table = parse_one_table(
        "CREATE TABLE t (
            a INT UNIQUE DEFERRABLE INITIALLY DEFERRED,
            b INT UNIQUE NOT DEFERRABLE,
            c INT UNIQUE
        );",
    );
    let columns = columns(&table);
    let timing_a = columns[0].constraints[0].timing;
    assert_eq!(timing_a.deferrable, Some(true));
    assert_eq!(timing_a.initially_deferred, Some(true));

    let timing_b = columns[1].constraints[0].timing;
    assert_eq!(timing_b.deferrable, Some(false));
    assert_eq!(timing_b.initially_deferred, None);

    let timing_c = columns[2].constraints[0].timing;
    assert_eq!(timing_c.deferrable, None);
    assert_eq!(timing_c.enforced, None);
}

#[test]
fn column_references_with_actions() {
    let table = parse_one_table(
        "CREATE TABLE t (
            order_id INT REFERENCES orders (id) MATCH FULL ON DELETE CASCADE ON UPDATE RESTRICT
        );",
    );
    let column = table.columns().next().expect("one column");
    let ColumnConstraintKind::References {
        table: ref_table,
        column: ref_column,
        match_type,
        on_delete,
        on_update,
    } = &column.constraints[0].kind
    else {
        panic!("expected references constraint");
    };
    assert_eq!(ref_table, "orders");
    assert_eq!(ref_column.as_deref(), Some("id"));
    assert_eq!(*match_type, Some(MatchType::Full));
    assert_eq!(*on_delete, Some(RefAction::Cascade));
    assert_eq!(*on_update, Some(RefAction::Restrict));
}

#[test]
fn table_level_constraints() {
    let table = parse_one_table(
        "CREATE TABLE t (
            a INT,
            b INT,
            PRIMARY KEY (a, b),
            CONSTRAINT b_fk FOREIGN KEY (b) REFERENCES other (x) ON DELETE SET NULL (b),
            UNIQUE NULLS NOT DISTINCT (a) INCLUDE (b),
            CHECK (a < b),
            EXCLUDE USING gist (a WITH =, b WITH &&) WHERE (a > 0)
        );",
    );
    let constraints: Vec<_> = table.table_constraints().collect();
    assert_eq!(constraints.len(), 5);

    assert!(matches!(
        &constraints[0].kind,
        TableConstraintKind::PrimaryKey { columns, .. } if columns == &["a", "b"]
    ));

    let TableConstraintKind::ForeignKey {
        columns,
        ref_table,
        ref_columns,
        on_delete,
        on_delete_columns,
        ..
    } = &constraints[1].kind
    else {
        panic!("expected foreign key");
    };
    assert_eq!(constraints[1].name.as_deref(), Some("b_fk"));
    assert_eq!(columns, &["b"]);
    assert_eq!(ref_table, "other");
    assert_eq!(ref_columns, &["x"]);
    assert_eq!(*on_delete, Some(RefAction::SetNull));
    assert_eq!(on_delete_columns, &["b"]);

    let TableConstraintKind::Unique {
        columns,
        nulls_distinct,
        index_params,
    } = &constraints[2].kind
    else {
        panic!("expected unique constraint");
    };
    assert_eq!(columns, &["a"]);
    assert_eq!(*nulls_distinct, Some(false));
    assert_eq!(index_params.as_deref(), Some("INCLUDE (b)"));

    assert!(matches!(
        &constraints[3].kind,
        TableConstraintKind::Check { expr, no_inherit: false } if expr == "a < b"
    ));

    let TableConstraintKind::Exclude {
        index_method,
        elements,
        where_clause,
        ..
    } = &constraints[4].kind
    else {
        panic!("expected exclusion constraint");
    };
    assert_eq!(index_method.as_deref(), Some("gist"));
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].expr, "a");
    assert_eq!(elements[0].operator, "=");
    assert_eq!(elements[1].operator, "&&");
    assert_eq!(where_clause.as_deref(), Some("a > 0"));
}

#[test]
fn like_clause_options() {
    let table = parse_one_table(
        "CREATE TABLE copy (LIKE src INCLUDING DEFAULTS EXCLUDING INDEXES, extra INT);",
    );
    let TableElement::Like(like) = &table.elements()[0] else {
        panic!("expected LIKE clause");
    };
    assert_eq!(like.source_table, "src");
    assert_eq!(
        like.options,
        vec![(LikeOption::Defaults, true), (LikeOption::Indexes, false)]
    );
    assert!(matches!(&table.elements()[1], TableElement::Column(c) if c.name == "extra"));
}

#[test]
fn temp_tables_and_trailers() {
    let table = parse_one_table(
        "CREATE GLOBAL TEMPORARY TABLE IF NOT EXISTS session_data (
            key TEXT
        ) ON COMMIT DELETE ROWS;",
    );
    assert_eq!(table.persistence, Persistence::Temporary);
    assert_eq!(table.temp_scope, Some(TempScope::Global));
    assert!(table.if_not_exists);
    assert_eq!(table.on_commit, Some(OnCommitAction::DeleteRows));

    let table = parse_one_table(
        "CREATE UNLOGGED TABLE metrics (
            id INT
        ) INHERITS (base_metrics, audited) USING heap
          WITH (fillfactor = 70, autovacuum_enabled = off, toast.autovacuum_enabled = off)
          TABLESPACE fast_disk;",
    );
    assert_eq!(table.persistence, Persistence::Unlogged);
    assert_eq!(table.inherits(), &["base_metrics", "audited"]);
    assert_eq!(table.access_method.as_deref(), Some("heap"));
    assert_eq!(
        table.with_options,
        vec![
            ("fillfactor".to_string(), "70".to_string()),
            ("autovacuum_enabled".to_string(), "off".to_string()),
            ("toast.autovacuum_enabled".to_string(), "off".to_string()),
        ]
    );
    assert_eq!(table.tablespace.as_deref(), Some("fast_disk"));

    let table = parse_one_table("CREATE TABLE legacy (id INT) WITHOUT OIDS;");
    assert!(table.without_oids);
}

#[test]
fn partitioned_parent_and_children() {
    let (schema, errors) = parse(
        "CREATE TABLE events (id INT, at TIMESTAMPTZ, region TEXT)
           PARTITION BY RANGE (at);
         CREATE TABLE events_2024 PARTITION OF events
           FOR VALUES FROM ('2024-01-01') TO ('2025-01-01');
         CREATE TABLE events_old PARTITION OF events
           FOR VALUES FROM (MINVALUE) TO ('2024-01-01');
         CREATE TABLE events_regions PARTITION OF events
           FOR VALUES IN ('eu', 'us');
         CREATE TABLE events_hash PARTITION OF events
           FOR VALUES WITH (MODULUS 4, REMAINDER 1);
         CREATE TABLE events_default PARTITION OF events DEFAULT;",
    );
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    assert_eq!(schema.tables.len(), 6);

    let parent = &schema.tables[0];
    let partition_by = parent.partition_by.as_ref().expect("partition key");
    assert_eq!(partition_by.strategy, PartitionStrategy::Range);
    assert!(matches!(&partition_by.elements[0].key, PartitionKey::Column(c) if c == "at"));

    let TableKind::Partition { parent, bound, .. } = &schema.tables[1].kind else {
        panic!("expected partition");
    };
    assert_eq!(parent, "events");
    assert!(matches!(
        bound,
        PartitionBoundSpec::Range { from, to }
            if from == &[RangeBound::Expr("'2024-01-01'".to_string())]
                && to == &[RangeBound::Expr("'2025-01-01'".to_string())]
    ));

    let TableKind::Partition { bound, .. } = &schema.tables[2].kind else {
        panic!("expected partition");
    };
    assert!(matches!(
        bound,
        PartitionBoundSpec::Range { from, .. } if from == &[RangeBound::MinValue]
    ));

    let TableKind::Partition { bound, .. } = &schema.tables[3].kind else {
        panic!("expected partition");
    };
    assert!(matches!(
        bound,
        PartitionBoundSpec::In { exprs } if exprs == &["'eu'", "'us'"]
    ));

    let TableKind::Partition { bound, .. } = &schema.tables[4].kind else {
        panic!("expected partition");
    };
    assert_eq!(
        bound,
        &PartitionBoundSpec::Hash {
            modulus: 4,
            remainder: 1
        }
    );

    assert!(schema.tables[5].is_default_partition());
}

#[test]
fn partition_by_expression_keys() {
    let table = parse_one_table(
        "CREATE TABLE logs (at TIMESTAMPTZ, source TEXT)
           PARTITION BY LIST (lower(source));",
    );
    let partition_by = table.partition_by.as_ref().expect("partition key");
    assert_eq!(partition_by.strategy, PartitionStrategy::List);
    assert!(matches!(
        &partition_by.elements[0].key,
        PartitionKey::Expression(expr) if expr == "lower(source)"
    ));
}

#[test]
fn of_type_table_shape() {
    let table = parse_one_table("CREATE TABLE emp OF employee_type;");
    assert!(matches!(
        &table.kind,
        TableKind::OfType { type_name, .. } if type_name == "employee_type"
    ));
}

#[test]
fn quoted_identifiers_strip_quotes() {
    let table = parse_one_table("CREATE TABLE \"Order Items\" (\"Weird \"\"Name\"\"\" INT);");
    assert_eq!(table.name, "Order Items");
    assert_eq!(table.columns().next().expect("column").name, "Weird \"Name\"");
}

#[test]
fn create_type_enum() {
    let (schema, errors) = parse("CREATE TYPE mood AS ENUM ('sad', 'ok', 'happy');");
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    assert_eq!(schema.types.len(), 1);
    assert_eq!(schema.types[0].name, "mood");
    assert!(matches!(
        &schema.types[0].kind,
        TypeKind::Enum { labels } if labels == &["sad", "ok", "happy"]
    ));
}

#[test]
fn create_type_composite_and_range() {
    let (schema, errors) = parse(
        "CREATE TYPE address AS (street TEXT, city TEXT COLLATE \"C\");
         CREATE TYPE float_range AS RANGE (SUBTYPE = float8, SUBTYPE_DIFF = float8mi);",
    );
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");

    let TypeKind::Composite { attrs } = &schema.types[0].kind else {
        panic!("expected composite type");
    };
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[1].collation.as_deref(), Some("C"));

    let TypeKind::Range(range) = &schema.types[1].kind else {
        panic!("expected range type");
    };
    assert_eq!(range.subtype, "float8");
    assert_eq!(range.subtype_diff.as_deref(), Some("float8mi"));
}

#[test]
fn create_type_base() {
    let (schema, errors) = parse(
        "CREATE TYPE box3d (
            INPUT = box3d_in,
            OUTPUT = box3d_out,
            INTERNALLENGTH = 48,
            ALIGNMENT = double,
            STORAGE = plain,
            CATEGORY = 'U',
            DELIMITER = ';',
            PASSEDBYVALUE = false,
            COLLATABLE
        );",
    );
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");

    let TypeKind::Base(base) = &schema.types[0].kind else {
        panic!("expected base type");
    };
    assert_eq!(base.input, "box3d_in");
    assert_eq!(base.output, "box3d_out");
    assert_eq!(
        base.internal_length,
        Some(schemadelta_core::InternalLength::Bytes(48))
    );
    assert_eq!(base.category, Some('U'));
    assert_eq!(base.delimiter, Some(';'));
    assert!(!base.passed_by_value);
    assert!(base.collatable);
}

#[test]
fn base_type_requires_input_and_output() {
    let (schema, errors) = parse("CREATE TYPE broken (INPUT = broken_in);");
    assert!(schema.types.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("INPUT and OUTPUT"));
}

#[test]
fn bad_statement_discards_only_itself() {
    let (schema, errors) = parse(
        "CREATE TABLE good_one (id INT);
         CREATE TABLE broken (id INT oops oops oops);
         CREATE TABLE good_two (id INT);",
    );
    assert_eq!(schema.tables.len(), 2);
    assert_eq!(schema.tables[0].name, "good_one");
    assert_eq!(schema.tables[1].name, "good_two");
    // Panic mode: one error for the whole broken statement.
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
}

#[test]
fn unsupported_statements_resynchronize() {
    let (schema, errors) = parse(
        "CREATE INDEX idx_users ON users (id);
         CREATE TABLE users (id INT);
         ALTER TABLE users ADD COLUMN x INT;
         CREATE TYPE mood AS ENUM ('ok');",
    );
    assert_eq!(schema.tables.len(), 1);
    assert_eq!(schema.types.len(), 1);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("unsupported CREATE statement"));
    assert!(errors[1].message.contains("expected `CREATE`"));
}

#[test]
fn errors_carry_positions_in_insertion_order() {
    let (_, errors) = parse("CREATE TABLE a (id INT);\nCREATE oops;\nCREATE TABLE ok (id INT);");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
    assert!(errors[0].column > 1);
}

#[test]
fn missing_semicolon_between_statements_is_reported() {
    let (schema, errors) = parse("CREATE TABLE a (id INT) CREATE TABLE b (id INT);");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("expected `;`"));
    // Recovery resumes directly at the second CREATE, so both tables parse.
    assert_eq!(schema.tables.len(), 2);
}

#[test]
fn empty_and_semicolon_only_input() {
    let (schema, errors) = parse("  ;; -- nothing here\n;");
    assert!(schema.tables.is_empty());
    assert!(errors.is_empty());
}
