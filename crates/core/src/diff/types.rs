use std::fmt;

use crate::ast::TableStmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Change classification, ordered from least to most disruptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DiffKind {
    TableAdded,
    TableRemoved,
    TableTypeChanged,
    TablespaceChanged,
    PartitionChanged,
    InheritsChanged,
    StorageParamsChanged,
    ColumnAdded,
    ColumnRemoved,
    ColumnTypeChanged,
    ColumnNullableChanged,
    ColumnDefaultChanged,
    ColumnCollationChanged,
    ColumnStorageChanged,
    ColumnCompressionChanged,
    ConstraintAdded,
    ConstraintRemoved,
    ConstraintModified,
    TypeAdded,
    TypeRemoved,
    TypeModified,
    FunctionAdded,
    FunctionRemoved,
    ProcedureAdded,
    ProcedureRemoved,
}

impl DiffKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TableAdded => "TABLE_ADDED",
            Self::TableRemoved => "TABLE_REMOVED",
            Self::TableTypeChanged => "TABLE_TYPE_CHANGED",
            Self::TablespaceChanged => "TABLESPACE_CHANGED",
            Self::PartitionChanged => "PARTITION_CHANGED",
            Self::InheritsChanged => "INHERITS_CHANGED",
            Self::StorageParamsChanged => "STORAGE_PARAMS_CHANGED",
            Self::ColumnAdded => "COLUMN_ADDED",
            Self::ColumnRemoved => "COLUMN_REMOVED",
            Self::ColumnTypeChanged => "COLUMN_TYPE_CHANGED",
            Self::ColumnNullableChanged => "COLUMN_NULLABLE_CHANGED",
            Self::ColumnDefaultChanged => "COLUMN_DEFAULT_CHANGED",
            Self::ColumnCollationChanged => "COLUMN_COLLATION_CHANGED",
            Self::ColumnStorageChanged => "COLUMN_STORAGE_CHANGED",
            Self::ColumnCompressionChanged => "COLUMN_COMPRESSION_CHANGED",
            Self::ConstraintAdded => "CONSTRAINT_ADDED",
            Self::ConstraintRemoved => "CONSTRAINT_REMOVED",
            Self::ConstraintModified => "CONSTRAINT_MODIFIED",
            Self::TypeAdded => "TYPE_ADDED",
            Self::TypeRemoved => "TYPE_REMOVED",
            Self::TypeModified => "TYPE_MODIFIED",
            Self::FunctionAdded => "FUNCTION_ADDED",
            Self::FunctionRemoved => "FUNCTION_REMOVED",
            Self::ProcedureAdded => "PROCEDURE_ADDED",
            Self::ProcedureRemoved => "PROCEDURE_REMOVED",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity is a fixed function of the change kind.
#[must_use]
pub const fn diff_type_severity(kind: DiffKind) -> Severity {
    match kind {
        DiffKind::TableRemoved | DiffKind::ColumnRemoved | DiffKind::ColumnTypeChanged => {
            Severity::Critical
        }
        DiffKind::TableAdded
        | DiffKind::ColumnAdded
        | DiffKind::ColumnNullableChanged
        | DiffKind::ConstraintRemoved
        | DiffKind::ConstraintModified
        | DiffKind::InheritsChanged
        | DiffKind::TableTypeChanged
        | DiffKind::TypeRemoved
        | DiffKind::TypeModified
        | DiffKind::FunctionRemoved
        | DiffKind::ProcedureRemoved => Severity::Warning,
        DiffKind::ColumnDefaultChanged
        | DiffKind::ColumnCollationChanged
        | DiffKind::ColumnStorageChanged
        | DiffKind::ColumnCompressionChanged
        | DiffKind::ConstraintAdded
        | DiffKind::TablespaceChanged
        | DiffKind::PartitionChanged
        | DiffKind::StorageParamsChanged
        | DiffKind::TypeAdded
        | DiffKind::FunctionAdded
        | DiffKind::ProcedureAdded => Severity::Info,
    }
}

/// One atomic difference record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diff {
    pub kind: DiffKind,
    pub severity: Severity,
    /// Owning table name, or the object name for schema-level records.
    pub table: String,
    /// Column, constraint, or other element the record points at.
    pub element: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
}

impl Diff {
    /// Builds a record with the severity derived from the kind.
    #[must_use]
    pub fn new(kind: DiffKind, table: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            kind,
            severity: diff_type_severity(kind),
            table: table.into(),
            element: element.into(),
            old_value: None,
            new_value: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_values(
        mut self,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        self.old_value = Some(old_value.into());
        self.new_value = Some(new_value.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ColumnDiff {
    pub name: String,
    pub type_changed: bool,
    pub nullable_changed: bool,
    pub default_changed: bool,
    pub collation_changed: bool,
    pub storage_changed: bool,
    pub compression_changed: bool,
    pub old_type: Option<String>,
    pub new_type: Option<String>,
}

impl ColumnDiff {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn any_changed(&self) -> bool {
        self.type_changed
            || self.nullable_changed
            || self.default_changed
            || self.collation_changed
            || self.storage_changed
            || self.compression_changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConstraintDiff {
    pub name: Option<String>,
    /// Constraint class label, e.g. `FOREIGN KEY` or `CHECK`.
    pub kind: String,
    pub old_definition: Option<String>,
    pub new_definition: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TableChange {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// Per-table difference report. A diff produced at schema level is exactly
/// one of added, removed, or modified; `compare_tables` on two matching
/// tables may also return `Unchanged`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TableDiff<'a> {
    pub table_name: String,
    pub change: TableChange,
    pub type_changed: bool,
    pub tablespace_changed: bool,
    pub partition_changed: bool,
    pub inherits_changed: bool,
    pub storage_params_changed: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub source_table: Option<&'a TableStmt>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub target_table: Option<&'a TableStmt>,
    pub columns_added: Vec<ColumnDiff>,
    pub columns_removed: Vec<ColumnDiff>,
    pub columns_modified: Vec<ColumnDiff>,
    pub constraints_added: Vec<ConstraintDiff>,
    pub constraints_removed: Vec<ConstraintDiff>,
    pub constraints_modified: Vec<ConstraintDiff>,
    pub diffs: Vec<Diff>,
}

impl<'a> TableDiff<'a> {
    #[must_use]
    pub fn unchanged(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            change: TableChange::Unchanged,
            type_changed: false,
            tablespace_changed: false,
            partition_changed: false,
            inherits_changed: false,
            storage_params_changed: false,
            source_table: None,
            target_table: None,
            columns_added: Vec::new(),
            columns_removed: Vec::new(),
            columns_modified: Vec::new(),
            constraints_added: Vec::new(),
            constraints_removed: Vec::new(),
            constraints_modified: Vec::new(),
            diffs: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_added(&self) -> bool {
        self.change == TableChange::Added
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.change == TableChange::Removed
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.change == TableChange::Modified
    }

    #[must_use]
    pub fn column_add_count(&self) -> usize {
        self.columns_added.len()
    }

    #[must_use]
    pub fn column_remove_count(&self) -> usize {
        self.columns_removed.len()
    }

    #[must_use]
    pub fn column_modify_count(&self) -> usize {
        self.columns_modified.len()
    }

    #[must_use]
    pub fn constraint_add_count(&self) -> usize {
        self.constraints_added.len()
    }

    #[must_use]
    pub fn constraint_remove_count(&self) -> usize {
        self.constraints_removed.len()
    }

    #[must_use]
    pub fn constraint_modify_count(&self) -> usize {
        self.constraints_modified.len()
    }

    #[must_use]
    pub fn any_table_flag(&self) -> bool {
        self.type_changed
            || self.tablespace_changed
            || self.partition_changed
            || self.inherits_changed
            || self.storage_params_changed
    }

    /// True when the diff carries any change at all.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.change != TableChange::Unchanged
    }
}

/// Whole-schema difference report.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SchemaDiff<'a> {
    /// Added, removed, and modified tables; unchanged tables do not appear.
    /// Source order first (removed/modified), then target-only order (added).
    pub table_diffs: Vec<TableDiff<'a>>,
    /// Schema-level records for user-defined types, functions, and
    /// procedures.
    pub object_diffs: Vec<Diff>,
}

impl<'a> SchemaDiff<'a> {
    #[must_use]
    pub fn tables_added(&self) -> usize {
        self.table_diffs.iter().filter(|d| d.is_added()).count()
    }

    #[must_use]
    pub fn tables_removed(&self) -> usize {
        self.table_diffs.iter().filter(|d| d.is_removed()).count()
    }

    #[must_use]
    pub fn tables_modified(&self) -> usize {
        self.table_diffs.iter().filter(|d| d.is_modified()).count()
    }

    pub fn all_diffs(&self) -> impl Iterator<Item = &Diff> {
        self.table_diffs
            .iter()
            .flat_map(|table_diff| table_diff.diffs.iter())
            .chain(self.object_diffs.iter())
    }

    #[must_use]
    pub fn total_diffs(&self) -> usize {
        self.all_diffs().count()
    }

    #[must_use]
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.all_diffs()
            .filter(|diff| diff.severity == severity)
            .count()
    }

    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            tables_added: self.tables_added(),
            tables_removed: self.tables_removed(),
            tables_modified: self.tables_modified(),
            total_diffs: self.total_diffs(),
            critical: self.severity_count(Severity::Critical),
            warnings: self.severity_count(Severity::Warning),
            info: self.severity_count(Severity::Info),
        }
    }
}

/// Aggregate counts, precomputed for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DiffSummary {
    pub tables_added: usize,
    pub tables_removed: usize,
    pub tables_modified: usize,
    pub total_diffs: usize,
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_a_function_of_kind() {
        assert_eq!(diff_type_severity(DiffKind::TableRemoved), Severity::Critical);
        assert_eq!(diff_type_severity(DiffKind::ColumnTypeChanged), Severity::Critical);
        assert_eq!(diff_type_severity(DiffKind::TableAdded), Severity::Warning);
        assert_eq!(diff_type_severity(DiffKind::ConstraintRemoved), Severity::Warning);
        assert_eq!(diff_type_severity(DiffKind::ConstraintAdded), Severity::Info);
        assert_eq!(diff_type_severity(DiffKind::TablespaceChanged), Severity::Info);
    }

    #[test]
    fn diff_builder_assigns_matching_severity() {
        let diff = Diff::new(DiffKind::ColumnRemoved, "users", "age");
        assert_eq!(diff.severity, diff_type_severity(diff.kind));
        assert_eq!(diff.severity, Severity::Critical);
    }

    #[test]
    fn severity_orders_info_below_critical() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }
}
