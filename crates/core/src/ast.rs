mod column;
mod constraint;
mod create_type;
mod schema;
mod table;

pub use column::{
    ColumnConstraint, ColumnConstraintKind, ColumnDef, GeneratedStorage, IdentityWhen, StorageType,
};
pub use constraint::{
    ConstraintTiming, ExcludeElement, MatchType, RefAction, TableConstraint, TableConstraintKind,
};
pub use create_type::{
    BaseTypeDef, CompositeAttr, CreateTypeStmt, InternalLength, RangeTypeDef, TypeKind,
};
pub use schema::Schema;
pub use table::{
    LikeClause, LikeOption, OnCommitAction, PartitionBoundSpec, PartitionByClause, PartitionElem,
    PartitionKey, PartitionStrategy, Persistence, RangeBound, TableElement, TableKind, TableStmt,
    TempScope,
};
