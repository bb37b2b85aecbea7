use std::collections::BTreeMap;

use serde::Deserialize;

use schemadelta_core::{CompareOptions, ParseError, Schema, compare_schemas};

/// One YAML-declared comparison case: two DDL scripts, option toggles, and
/// the expected outcome. Toggle fields are named for the non-default state
/// so an omitted field always means "default options".
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffCase {
    pub source: String,
    pub target: String,
    pub case_sensitive: bool,
    /// Disables type-alias normalization.
    pub exact_types: bool,
    /// Disables whitespace normalization in expressions.
    pub exact_whitespace: bool,
    pub ignore_constraint_names: bool,
    pub skip_tablespaces: bool,
    pub skip_storage_params: bool,
    pub skip_constraints: bool,
    /// Restricts comparison to these tables when non-empty.
    pub tables: Vec<String>,
    pub expect: Expectation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectation {
    pub tables_added: usize,
    pub tables_removed: usize,
    pub tables_modified: usize,
    /// When non-empty, the multiset of produced diff kinds must match
    /// exactly (order-insensitive).
    pub kinds: Vec<String>,
    pub total_diffs: Option<usize>,
    pub parse_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    Passed,
    Failed(String),
}

pub fn load_cases_from_str(yaml: &str) -> Result<BTreeMap<String, DiffCase>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

impl DiffCase {
    fn options(&self) -> CompareOptions {
        let options = CompareOptions {
            case_sensitive: self.case_sensitive,
            normalize_types: !self.exact_types,
            ignore_whitespace: !self.exact_whitespace,
            ignore_constraint_names: self.ignore_constraint_names,
            compare_tablespaces: !self.skip_tablespaces,
            compare_storage_params: !self.skip_storage_params,
            compare_constraints: !self.skip_constraints,
            table_filter: None,
        };
        if self.tables.is_empty() {
            options
        } else {
            options.with_table_names(self.tables.clone())
        }
    }
}

/// Runs one case through the given parse function (the dialect surface) and
/// the comparator, checking every stated expectation.
pub fn run_diff_case<P>(parse: P, case: &DiffCase) -> CaseResult
where
    P: Fn(&str) -> (Schema, Vec<ParseError>),
{
    let (source, source_errors) = parse(&case.source);
    let (target, target_errors) = parse(&case.target);

    let parse_errors = source_errors.len() + target_errors.len();
    if parse_errors != case.expect.parse_errors {
        return CaseResult::Failed(format!(
            "expected {} parse errors, got {} ({:?} / {:?})",
            case.expect.parse_errors, parse_errors, source_errors, target_errors
        ));
    }

    let options = case.options();
    let diff = compare_schemas(&source, &target, &options);

    let checks = [
        ("tables_added", case.expect.tables_added, diff.tables_added()),
        (
            "tables_removed",
            case.expect.tables_removed,
            diff.tables_removed(),
        ),
        (
            "tables_modified",
            case.expect.tables_modified,
            diff.tables_modified(),
        ),
    ];
    for (what, expected, actual) in checks {
        if expected != actual {
            return CaseResult::Failed(format!("expected {what} = {expected}, got {actual}"));
        }
    }

    if let Some(total) = case.expect.total_diffs
        && diff.total_diffs() != total
    {
        return CaseResult::Failed(format!(
            "expected {total} total diffs, got {}",
            diff.total_diffs()
        ));
    }

    if !case.expect.kinds.is_empty() {
        let mut expected: Vec<&str> = case.expect.kinds.iter().map(String::as_str).collect();
        let mut actual: Vec<&str> = diff.all_diffs().map(|record| record.kind.as_str()).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        if expected != actual {
            return CaseResult::Failed(format!(
                "expected kinds {expected:?}, got {actual:?}"
            ));
        }
    }

    CaseResult::Passed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cases_deserialize_with_defaults() {
        let yaml = r#"
add_column:
  source: "CREATE TABLE t (id integer);"
  target: "CREATE TABLE t (id integer, name text);"
  expect:
    tables_modified: 1
    kinds: [COLUMN_ADDED]
"#;
        let cases = load_cases_from_str(yaml).expect("yaml should deserialize");
        let case = &cases["add_column"];
        assert!(!case.case_sensitive);
        assert!(case.tables.is_empty());
        assert_eq!(case.expect.tables_modified, 1);
        assert_eq!(case.expect.kinds, vec!["COLUMN_ADDED".to_string()]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = r#"
bad_case:
  source: ""
  target: ""
  not_a_field: true
"#;
        assert!(load_cases_from_str(yaml).is_err());
    }

    #[test]
    fn runner_reports_count_mismatches() {
        let parse = |_sql: &str| (Schema::new(), Vec::new());
        let case = DiffCase {
            expect: Expectation {
                tables_added: 1,
                ..Expectation::default()
            },
            ..DiffCase::default()
        };
        let CaseResult::Failed(message) = run_diff_case(parse, &case) else {
            panic!("empty schemas cannot add a table");
        };
        assert!(message.contains("tables_added"));
    }
}
