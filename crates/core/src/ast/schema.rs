use super::{CreateTypeStmt, TableStmt};

/// A parsed or introspected schema. Statement order follows input order for
/// parsed schemas and catalog order for introspected ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<TableStmt>,
    pub types: Vec<CreateTypeStmt>,
    /// Function names. Bodies are outside the comparable surface, so the
    /// introspector records names only and the comparator reports membership
    /// changes.
    pub functions: Vec<String>,
    /// Procedure names, same contract as `functions`.
    pub procedures: Vec<String>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.types.is_empty()
            && self.functions.is_empty()
            && self.procedures.is_empty()
    }
}
