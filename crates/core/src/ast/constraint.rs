/// Timing flags shared by column and table constraints. Each flag is
/// tri-state: `None` means the clause was not written, which SQL treats
/// differently from an explicit `NOT DEFERRABLE` / `NOT ENFORCED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstraintTiming {
    pub deferrable: Option<bool>,
    pub initially_deferred: Option<bool>,
    pub enforced: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<String>,
    pub kind: TableConstraintKind,
    pub timing: ConstraintTiming,
}

impl TableConstraint {
    #[must_use]
    pub fn new(kind: TableConstraintKind) -> Self {
        Self {
            name: None,
            kind,
            timing: ConstraintTiming::default(),
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, kind: TableConstraintKind) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            timing: ConstraintTiming::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintKind {
    Check {
        expr: String,
        no_inherit: bool,
    },
    NotNull {
        column: String,
        no_inherit: bool,
    },
    Unique {
        columns: Vec<String>,
        nulls_distinct: Option<bool>,
        index_params: Option<String>,
    },
    PrimaryKey {
        columns: Vec<String>,
        index_params: Option<String>,
    },
    Exclude {
        index_method: Option<String>,
        elements: Vec<ExcludeElement>,
        index_params: Option<String>,
        where_clause: Option<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        match_type: Option<MatchType>,
        on_delete: Option<RefAction>,
        on_update: Option<RefAction>,
        /// Column subset of a `ON DELETE SET NULL (cols)` action; empty means
        /// the action applies to every referencing column.
        on_delete_columns: Vec<String>,
        on_update_columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludeElement {
    /// Column name or expression text.
    pub expr: String,
    pub operator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Full,
    Partial,
    Simple,
}

impl MatchType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
            Self::Simple => "SIMPLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl RefAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}
