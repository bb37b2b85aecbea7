use super::{ColumnDef, TableConstraint};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A CREATE TABLE statement in any of its three shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStmt {
    /// Table name as written, schema-qualified where the source qualified it.
    pub name: String,
    pub persistence: Persistence,
    pub temp_scope: Option<TempScope>,
    pub if_not_exists: bool,
    pub kind: TableKind,
    pub partition_by: Option<PartitionByClause>,
    pub access_method: Option<String>,
    /// Storage parameters from the WITH clause, in declaration order.
    pub with_options: Vec<(String, String)>,
    pub without_oids: bool,
    pub on_commit: Option<OnCommitAction>,
    pub tablespace: Option<String>,
}

impl TableStmt {
    /// A plain `CREATE TABLE name (...)` with every option absent.
    #[must_use]
    pub fn regular(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            TableKind::Regular {
                elements: Vec::new(),
                inherits: Vec::new(),
            },
        )
    }

    /// A `CREATE TABLE name OF type` statement.
    #[must_use]
    pub fn of_type(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            TableKind::OfType {
                type_name: type_name.into(),
                elements: Vec::new(),
            },
        )
    }

    /// A `CREATE TABLE name PARTITION OF parent` statement. The bound starts
    /// out as `Default` and is replaced once the bound spec is known.
    #[must_use]
    pub fn partition_of(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            TableKind::Partition {
                parent: parent.into(),
                elements: Vec::new(),
                bound: PartitionBoundSpec::Default,
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            persistence: Persistence::Normal,
            temp_scope: None,
            if_not_exists: false,
            kind,
            partition_by: None,
            access_method: None,
            with_options: Vec::new(),
            without_oids: false,
            on_commit: None,
            tablespace: None,
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[TableElement] {
        match &self.kind {
            TableKind::Regular { elements, .. }
            | TableKind::OfType { elements, .. }
            | TableKind::Partition { elements, .. } => elements,
        }
    }

    pub fn elements_mut(&mut self) -> &mut Vec<TableElement> {
        match &mut self.kind {
            TableKind::Regular { elements, .. }
            | TableKind::OfType { elements, .. }
            | TableKind::Partition { elements, .. } => elements,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.elements().iter().filter_map(|element| match element {
            TableElement::Column(column) => Some(column),
            _ => None,
        })
    }

    pub fn table_constraints(&self) -> impl Iterator<Item = &TableConstraint> {
        self.elements().iter().filter_map(|element| match element {
            TableElement::Constraint(constraint) => Some(constraint),
            _ => None,
        })
    }

    #[must_use]
    pub fn inherits(&self) -> &[String] {
        match &self.kind {
            TableKind::Regular { inherits, .. } => inherits,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_default_partition(&self) -> bool {
        matches!(
            &self.kind,
            TableKind::Partition {
                bound: PartitionBoundSpec::Default,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableKind {
    Regular {
        elements: Vec<TableElement>,
        inherits: Vec<String>,
    },
    OfType {
        type_name: String,
        elements: Vec<TableElement>,
    },
    Partition {
        parent: String,
        elements: Vec<TableElement>,
        bound: PartitionBoundSpec,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Persistence {
    #[default]
    Normal,
    Temporary,
    Unlogged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TempScope {
    Global,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum OnCommitAction {
    PreserveRows,
    DeleteRows,
    Drop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDef),
    Constraint(TableConstraint),
    Like(LikeClause),
}

/// `LIKE source_table [INCLUDING ... | EXCLUDING ...]*`
#[derive(Debug, Clone, PartialEq)]
pub struct LikeClause {
    pub source_table: String,
    /// `(option, including)` entries in source order; `including == false`
    /// means the option was EXCLUDING.
    pub options: Vec<(LikeOption, bool)>,
}

impl LikeClause {
    #[must_use]
    pub fn new(source_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOption {
    Comments,
    Compression,
    Constraints,
    Defaults,
    Generated,
    Identity,
    Indexes,
    Statistics,
    Storage,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionByClause {
    pub strategy: PartitionStrategy,
    pub elements: Vec<PartitionElem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum PartitionStrategy {
    Range,
    List,
    Hash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionElem {
    pub key: PartitionKey,
    pub collation: Option<String>,
    pub opclass: Option<String>,
}

impl PartitionElem {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            key: PartitionKey::Column(name.into()),
            collation: None,
            opclass: None,
        }
    }

    #[must_use]
    pub fn expression(expr: impl Into<String>) -> Self {
        Self {
            key: PartitionKey::Expression(expr.into()),
            collation: None,
            opclass: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionKey {
    Column(String),
    /// Expression text captured verbatim from the source.
    Expression(String),
}

impl PartitionKey {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Column(name) => name,
            Self::Expression(expr) => expr,
        }
    }
}

/// `FOR VALUES ...` bound of a partition child, or DEFAULT.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionBoundSpec {
    In {
        exprs: Vec<String>,
    },
    Range {
        from: Vec<RangeBound>,
        to: Vec<RangeBound>,
    },
    Hash {
        modulus: i64,
        remainder: i64,
    },
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    MinValue,
    MaxValue,
    Expr(String),
}
