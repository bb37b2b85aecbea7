use std::io::{self, Write};
use std::path::Path;

use schemadelta_core::{ParseError, SchemaDiff, TableChange, TableDiff};

pub(crate) fn print_parse_errors(path: &Path, errors: &[ParseError]) {
    for error in errors {
        eprintln!("[parse] {}: {error}", path.display());
    }
}

pub(crate) fn render_text(diff: &SchemaDiff<'_>) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for table_diff in &diff.table_diffs {
        writeln!(
            out,
            "{} {}",
            change_marker(table_diff),
            table_diff.table_name
        )?;
        for record in &table_diff.diffs {
            write!(out, "    [{}] {} {}", record.severity, record.kind, record.element)?;
            if let (Some(old_value), Some(new_value)) = (&record.old_value, &record.new_value) {
                write!(out, ": {old_value} -> {new_value}")?;
            }
            if let Some(description) = &record.description {
                write!(out, " ({description})")?;
            }
            writeln!(out)?;
        }
    }

    for record in &diff.object_diffs {
        writeln!(out, "  [{}] {} {}", record.severity, record.kind, record.table)?;
    }

    let summary = diff.summary();
    writeln!(
        out,
        "{} added, {} removed, {} modified; {} diffs ({} critical, {} warnings, {} info)",
        summary.tables_added,
        summary.tables_removed,
        summary.tables_modified,
        summary.total_diffs,
        summary.critical,
        summary.warnings,
        summary.info
    )?;
    Ok(())
}

pub(crate) fn render_json(diff: &SchemaDiff<'_>) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let payload = serde_json::json!({
        "summary": diff.summary(),
        "tables": diff.table_diffs,
        "objects": diff.object_diffs,
    });
    serde_json::to_writer_pretty(&mut out, &payload)?;
    writeln!(out)?;
    Ok(())
}

fn change_marker(table_diff: &TableDiff<'_>) -> &'static str {
    match table_diff.change {
        TableChange::Added => "+",
        TableChange::Removed => "-",
        TableChange::Modified => "~",
        TableChange::Unchanged => "=",
    }
}
