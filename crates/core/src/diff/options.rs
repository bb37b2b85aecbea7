use std::{fmt, sync::Arc};

/// Predicate deciding whether a table participates in comparison.
pub type TableFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Knobs controlling comparison semantics. The defaults fold identifier
/// case, normalize type aliases, and ignore whitespace inside expressions,
/// which matches how the introspected and parsed forms of the same schema
/// line up.
#[derive(Clone)]
pub struct CompareOptions {
    /// Identifier equality is case-sensitive instead of ASCII case-folded.
    pub case_sensitive: bool,
    /// Pass data types through the alias map (`int4` = `integer`, ...)
    /// before comparison.
    pub normalize_types: bool,
    /// Collapse whitespace runs in expression text before comparison.
    pub ignore_whitespace: bool,
    /// Match constraints by semantic fingerprint instead of by name.
    pub ignore_constraint_names: bool,
    pub compare_tablespaces: bool,
    pub compare_storage_params: bool,
    pub compare_constraints: bool,
    /// Tables outside the filter are skipped entirely.
    pub table_filter: Option<TableFilter>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            normalize_types: true,
            ignore_whitespace: true,
            ignore_constraint_names: false,
            compare_tablespaces: true,
            compare_storage_params: true,
            compare_constraints: true,
            table_filter: None,
        }
    }
}

impl fmt::Debug for CompareOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareOptions")
            .field("case_sensitive", &self.case_sensitive)
            .field("normalize_types", &self.normalize_types)
            .field("ignore_whitespace", &self.ignore_whitespace)
            .field("ignore_constraint_names", &self.ignore_constraint_names)
            .field("compare_tablespaces", &self.compare_tablespaces)
            .field("compare_storage_params", &self.compare_storage_params)
            .field("compare_constraints", &self.compare_constraints)
            .field("table_filter", &self.table_filter.as_ref().map(|_| ".."))
            .finish()
    }
}

impl CompareOptions {
    /// Restricts comparison to the named tables (matched under the current
    /// case rule).
    #[must_use]
    pub fn with_table_names(mut self, names: Vec<String>) -> Self {
        let case_sensitive = self.case_sensitive;
        self.table_filter = Some(Arc::new(move |candidate: &str| {
            names.iter().any(|name| {
                if case_sensitive {
                    name == candidate
                } else {
                    name.eq_ignore_ascii_case(candidate)
                }
            })
        }));
        self
    }
}

#[must_use]
pub fn should_compare_table(name: &str, options: &CompareOptions) -> bool {
    match &options.table_filter {
        Some(filter) => filter(name),
        None => true,
    }
}
