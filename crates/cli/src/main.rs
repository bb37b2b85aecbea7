use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use schemadelta_core::{CompareOptions, ParseError, Schema, compare_schemas};

mod report;

/// Compares two PostgreSQL DDL schema files and reports the differences
/// classified by severity.
#[derive(Debug, Parser)]
#[command(name = "schemadelta", version, about)]
struct Cli {
    /// DDL file describing the current (source) schema.
    source: PathBuf,
    /// DDL file describing the desired (target) schema.
    target: PathBuf,
    /// Match identifiers case-sensitively.
    #[arg(long)]
    case_sensitive: bool,
    /// Compare data types exactly as spelled, without alias folding.
    #[arg(long)]
    exact_types: bool,
    /// Compare expressions byte-for-byte, including whitespace.
    #[arg(long)]
    exact_whitespace: bool,
    /// Match constraints by semantic content instead of by name.
    #[arg(long)]
    ignore_constraint_names: bool,
    /// Leave tablespace changes out of the report.
    #[arg(long)]
    skip_tablespaces: bool,
    /// Leave storage parameter changes out of the report.
    #[arg(long)]
    skip_storage_params: bool,
    /// Skip constraint comparison entirely.
    #[arg(long)]
    skip_constraints: bool,
    /// Only compare the named tables (repeatable).
    #[arg(long = "table", value_name = "NAME")]
    tables: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Cli {
    fn compare_options(&self) -> CompareOptions {
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

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("[schemadelta] {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let (source, source_errors) = load_schema(&cli.source)?;
    let (target, target_errors) = load_schema(&cli.target)?;

    let had_parse_errors = !source_errors.is_empty() || !target_errors.is_empty();
    report::print_parse_errors(&cli.source, &source_errors);
    report::print_parse_errors(&cli.target, &target_errors);

    let options = cli.compare_options();
    let diff = compare_schemas(&source, &target, &options);

    match cli.format {
        Format::Text => report::render_text(&diff)?,
        Format::Json => report::render_json(&diff)?,
    }

    if had_parse_errors {
        return Ok(2);
    }
    if diff.summary().critical > 0 {
        return Ok(1);
    }
    Ok(0)
}

fn load_schema(path: &PathBuf) -> anyhow::Result<(Schema, Vec<ParseError>)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("while reading schema file `{}`", path.display()))?;
    Ok(schemadelta_dialect_postgres::parse(&text))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_schema(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write schema");
        file
    }

    fn cli_for(source: &tempfile::NamedTempFile, target: &tempfile::NamedTempFile) -> Cli {
        Cli::parse_from([
            "schemadelta",
            source.path().to_str().expect("utf-8 path"),
            target.path().to_str().expect("utf-8 path"),
        ])
    }

    #[test]
    fn identical_schemas_exit_clean() {
        let schema = write_schema("CREATE TABLE users (id integer);");
        let cli = cli_for(&schema, &schema);
        assert_eq!(run(&cli).expect("run should succeed"), 0);
    }

    #[test]
    fn dropped_table_is_a_critical_exit() {
        let source = write_schema("CREATE TABLE users (id integer);");
        let target = write_schema("");
        let cli = cli_for(&source, &target);
        assert_eq!(run(&cli).expect("run should succeed"), 1);
    }

    #[test]
    fn parse_errors_exit_with_usage_code() {
        let source = write_schema("CREATE ELEPHANT;");
        let target = write_schema("");
        let cli = cli_for(&source, &target);
        assert_eq!(run(&cli).expect("run should succeed"), 2);
    }

    #[test]
    fn option_flags_map_onto_compare_options() {
        let cli = Cli::parse_from([
            "schemadelta",
            "a.sql",
            "b.sql",
            "--case-sensitive",
            "--exact-types",
            "--ignore-constraint-names",
            "--table",
            "users",
        ]);
        let options = cli.compare_options();
        assert!(options.case_sensitive);
        assert!(!options.normalize_types);
        assert!(options.ignore_whitespace);
        assert!(options.ignore_constraint_names);
        assert!(options.table_filter.is_some());
    }
}
