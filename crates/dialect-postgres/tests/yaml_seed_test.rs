use schemadelta_dialect_postgres::parse;
use schemadelta_testkit::{CaseResult, load_cases_from_str, run_diff_case};

const SEED_CASES: &str = r#"
same_schema:
  source: |
    CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(100) NOT NULL DEFAULT '');
  target: |
    CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(100) NOT NULL DEFAULT '');
  expect:
    total_diffs: 0

alias_spellings_match:
  source: |
    CREATE TABLE t (a INT4, b TIMESTAMPTZ);
  target: |
    CREATE TABLE t (a INTEGER, b TIMESTAMP WITH TIME ZONE);
  expect:
    total_diffs: 0

added_table_and_column:
  source: |
    CREATE TABLE users (id INT);
  target: |
    CREATE TABLE users (id INT, email VARCHAR(100));
    CREATE TABLE employees (id INT);
  expect:
    tables_added: 1
    tables_modified: 1
    kinds: [TABLE_ADDED, COLUMN_ADDED]

dropped_column_is_critical:
  source: |
    CREATE TABLE users (id INT, age INT);
  target: |
    CREATE TABLE users (id INT);
  expect:
    tables_modified: 1
    kinds: [COLUMN_REMOVED]

case_sensitive_names_split_tables:
  source: |
    CREATE TABLE "Users" (id INT);
  target: |
    CREATE TABLE users (id INT);
  case_sensitive: true
  expect:
    tables_added: 1
    tables_removed: 1
    kinds: [TABLE_REMOVED, TABLE_ADDED]

constraint_rename_ignored:
  source: |
    CREATE TABLE t (a INT, CONSTRAINT c_old CHECK (a > 0));
  target: |
    CREATE TABLE t (a INT, CONSTRAINT c_new CHECK (a  >  0));
  ignore_constraint_names: true
  expect:
    total_diffs: 0

filtered_tables_are_ignored:
  source: |
    CREATE TABLE keep (id INT);
    CREATE TABLE skip (id TEXT);
  target: |
    CREATE TABLE keep (id BIGINT);
  tables: [keep]
  expect:
    tables_modified: 1
    kinds: [COLUMN_TYPE_CHANGED]

broken_statement_is_counted:
  source: |
    CREATE SEQUENCE nope;
    CREATE TABLE t (id INT);
  target: |
    CREATE TABLE t (id INT);
  expect:
    parse_errors: 1
    total_diffs: 0
"#;

#[test]
fn yaml_seed_matrix_passes() {
    let cases = load_cases_from_str(SEED_CASES).expect("seed yaml must deserialize");
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for (name, case) in &cases {
        if let CaseResult::Failed(reason) = run_diff_case(parse, case) {
            failures.push(format!("{name}: {reason}"));
        }
    }
    assert!(failures.is_empty(), "failed cases:\n{}", failures.join("\n"));
}
