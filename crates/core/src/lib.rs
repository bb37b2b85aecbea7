mod ast;
mod diff;
mod error;

pub use ast::{
    BaseTypeDef, ColumnConstraint, ColumnConstraintKind, ColumnDef, CompositeAttr,
    ConstraintTiming, CreateTypeStmt, ExcludeElement, GeneratedStorage, IdentityWhen,
    InternalLength, LikeClause, LikeOption, MatchType, OnCommitAction, PartitionBoundSpec,
    PartitionByClause, PartitionElem, PartitionKey, PartitionStrategy, Persistence, RangeBound,
    RangeTypeDef, RefAction, Schema, StorageType, TableConstraint, TableConstraintKind,
    TableElement, TableKind, TableStmt, TempScope, TypeKind,
};
pub use diff::{
    ColumnDiff, CompareOptions, ConstraintDiff, Diff, DiffKind, DiffSummary, SchemaDiff, Severity,
    TableChange, TableDiff, TableFilter, compare_schemas, compare_tables, data_types_equal,
    diff_type_severity, expressions_equal, names_equal, normalize_type_name, should_compare_table,
};
pub use error::ParseError;
