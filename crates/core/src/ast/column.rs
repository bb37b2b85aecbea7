use super::{ConstraintTiming, MatchType, RefAction};

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Raw data-type text including any length/precision modifier and array
    /// brackets, e.g. `character varying(100)` or `integer[]`. Comparison is
    /// textual after normalization.
    pub data_type: String,
    pub storage: Option<StorageType>,
    pub compression: Option<String>,
    pub collation: Option<String>,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            storage: None,
            compression: None,
            collation: None,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|constraint| matches!(constraint.kind, ColumnConstraintKind::NotNull))
    }

    #[must_use]
    pub fn default_expr(&self) -> Option<&str> {
        self.constraints.iter().find_map(|constraint| {
            if let ColumnConstraintKind::Default { expr } = &constraint.kind {
                Some(expr.as_str())
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum StorageType {
    Plain,
    External,
    Extended,
    Main,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConstraint {
    pub name: Option<String>,
    pub kind: ColumnConstraintKind,
    pub timing: ConstraintTiming,
}

impl ColumnConstraint {
    /// An unnamed constraint with unspecified timing flags.
    #[must_use]
    pub fn new(kind: ColumnConstraintKind) -> Self {
        Self {
            name: None,
            kind,
            timing: ConstraintTiming::default(),
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, kind: ColumnConstraintKind) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            timing: ConstraintTiming::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraintKind {
    NotNull,
    Null,
    Check {
        expr: String,
        no_inherit: bool,
    },
    Default {
        expr: String,
    },
    /// `GENERATED ALWAYS AS (expr) [STORED | VIRTUAL]`
    GeneratedExpr {
        expr: String,
        storage: GeneratedStorage,
    },
    /// `GENERATED {ALWAYS | BY DEFAULT} AS IDENTITY [(options)]`
    GeneratedIdentity {
        when: IdentityWhen,
        /// Sequence options captured verbatim, parentheses stripped.
        sequence_options: Option<String>,
    },
    Unique {
        /// `NULLS DISTINCT` = `Some(true)`, `NULLS NOT DISTINCT` =
        /// `Some(false)`, unspecified = `None`.
        nulls_distinct: Option<bool>,
        index_params: Option<String>,
    },
    PrimaryKey {
        index_params: Option<String>,
    },
    References {
        table: String,
        column: Option<String>,
        match_type: Option<MatchType>,
        on_delete: Option<RefAction>,
        on_update: Option<RefAction>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedStorage {
    Stored,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityWhen {
    Always,
    ByDefault,
}
