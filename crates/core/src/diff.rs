mod compare;
mod equivalence;
mod fingerprint;
mod options;
mod table;
mod types;

pub use compare::{compare_schemas, compare_tables};
pub use equivalence::{data_types_equal, expressions_equal, names_equal, normalize_type_name};
pub use options::{CompareOptions, TableFilter, should_compare_table};
pub use types::{
    ColumnDiff, ConstraintDiff, Diff, DiffKind, DiffSummary, SchemaDiff, Severity, TableChange,
    TableDiff, diff_type_severity,
};
