/// A CREATE TYPE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTypeStmt {
    pub name: String,
    pub if_not_exists: bool,
    pub kind: TypeKind,
}

impl CreateTypeStmt {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            if_not_exists: false,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Enum { labels: Vec<String> },
    Composite { attrs: Vec<CompositeAttr> },
    Range(RangeTypeDef),
    Base(BaseTypeDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAttr {
    pub name: String,
    pub data_type: String,
    pub collation: Option<String>,
}

/// `CREATE TYPE name AS RANGE (SUBTYPE = ..., ...)`. Only SUBTYPE is
/// required; the rest default to absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTypeDef {
    pub subtype: String,
    pub opclass: Option<String>,
    pub collation: Option<String>,
    pub canonical: Option<String>,
    pub subtype_diff: Option<String>,
    pub multirange_type_name: Option<String>,
}

impl RangeTypeDef {
    #[must_use]
    pub fn new(subtype: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            opclass: None,
            collation: None,
            canonical: None,
            subtype_diff: None,
            multirange_type_name: None,
        }
    }
}

/// `CREATE TYPE name (INPUT = ..., OUTPUT = ..., ...)`. INPUT and OUTPUT are
/// required; everything else defaults to the catalog defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTypeDef {
    pub input: String,
    pub output: String,
    pub receive: Option<String>,
    pub send: Option<String>,
    pub typmod_in: Option<String>,
    pub typmod_out: Option<String>,
    pub analyze: Option<String>,
    pub internal_length: Option<InternalLength>,
    pub passed_by_value: bool,
    pub alignment: Option<String>,
    pub storage: Option<String>,
    pub like_type: Option<String>,
    pub category: Option<char>,
    pub preferred: bool,
    pub default: Option<String>,
    pub element: Option<String>,
    pub delimiter: Option<char>,
    pub collatable: bool,
}

impl BaseTypeDef {
    #[must_use]
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            receive: None,
            send: None,
            typmod_in: None,
            typmod_out: None,
            analyze: None,
            internal_length: None,
            passed_by_value: false,
            alignment: None,
            storage: None,
            like_type: None,
            category: None,
            preferred: false,
            default: None,
            element: None,
            delimiter: None,
            collatable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalLength {
    Variable,
    Bytes(i64),
}
