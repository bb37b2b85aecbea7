use std::fmt;

/// Every reserved word the lexer recognizes. Anything shaped like an
/// identifier that matches this table case-insensitively becomes the keyword
/// token instead of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Alter,
    Table,
    Temporary,
    Temp,
    Unlogged,
    If,
    Not,
    Exists,
    Of,
    Partition,
    For,
    Values,
    In,
    From,
    To,
    With,
    Modulus,
    Remainder,
    Default,
    Constraint,
    Check,
    Unique,
    Primary,
    Key,
    References,
    Foreign,
    Null,
    Generated,
    Always,
    As,
    Identity,
    By,
    Stored,
    Virtual,
    Exclude,
    Match,
    Full,
    Partial,
    Simple,
    Deferrable,
    Initially,
    Deferred,
    Immediate,
    Enforced,
    Cascade,
    Restrict,
    Action,
    Set,
    No,
    On,
    Delete,
    Update,
    Commit,
    Preserve,
    Drop,
    Rows,
    Collate,
    Storage,
    Plain,
    External,
    Extended,
    Main,
    Compression,
    Inherits,
    Like,
    Including,
    Excluding,
    Using,
    Where,
    Tablespace,
    Without,
    Oids,
    Global,
    Local,
    Range,
    List,
    Hash,
    Minvalue,
    Maxvalue,
    Nulls,
    Distinct,
    First,
    Last,
    Asc,
    Desc,
    Include,
    Overlaps,
    Period,
    Comments,
    Constraints,
    Defaults,
    Indexes,
    Statistics,
    All,
    Type,
    Enum,
    Subtype,
    Canonical,
    Input,
    Output,
    Receive,
    Send,
    TypmodIn,
    TypmodOut,
    Analyze,
    Internallength,
    Passedbyvalue,
    Alignment,
    Preferred,
    Delimiter,
    Element,
    Collatable,
    Variable,
}

impl Keyword {
    /// Case-insensitive lookup. The table is fixed at compile time; the
    /// uppercased lexeme dispatches through a single match.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        let upper = ident.to_ascii_uppercase();
        let keyword = match upper.as_str() {
            "CREATE" => Keyword::Create,
            "ALTER" => Keyword::Alter,
            "TABLE" => Keyword::Table,
            "TEMPORARY" => Keyword::Temporary,
            "TEMP" => Keyword::Temp,
            "UNLOGGED" => Keyword::Unlogged,
            "IF" => Keyword::If,
            "NOT" => Keyword::Not,
            "EXISTS" => Keyword::Exists,
            "OF" => Keyword::Of,
            "PARTITION" => Keyword::Partition,
            "FOR" => Keyword::For,
            "VALUES" => Keyword::Values,
            "IN" => Keyword::In,
            "FROM" => Keyword::From,
            "TO" => Keyword::To,
            "WITH" => Keyword::With,
            "MODULUS" => Keyword::Modulus,
            "REMAINDER" => Keyword::Remainder,
            "DEFAULT" => Keyword::Default,
            "CONSTRAINT" => Keyword::Constraint,
            "CHECK" => Keyword::Check,
            "UNIQUE" => Keyword::Unique,
            "PRIMARY" => Keyword::Primary,
            "KEY" => Keyword::Key,
            "REFERENCES" => Keyword::References,
            "FOREIGN" => Keyword::Foreign,
            "NULL" => Keyword::Null,
            "GENERATED" => Keyword::Generated,
            "ALWAYS" => Keyword::Always,
            "AS" => Keyword::As,
            "IDENTITY" => Keyword::Identity,
            "BY" => Keyword::By,
            "STORED" => Keyword::Stored,
            "VIRTUAL" => Keyword::Virtual,
            "EXCLUDE" => Keyword::Exclude,
            "MATCH" => Keyword::Match,
            "FULL" => Keyword::Full,
            "PARTIAL" => Keyword::Partial,
            "SIMPLE" => Keyword::Simple,
            "DEFERRABLE" => Keyword::Deferrable,
            "INITIALLY" => Keyword::Initially,
            "DEFERRED" => Keyword::Deferred,
            "IMMEDIATE" => Keyword::Immediate,
            "ENFORCED" => Keyword::Enforced,
            "CASCADE" => Keyword::Cascade,
            "RESTRICT" => Keyword::Restrict,
            "ACTION" => Keyword::Action,
            "SET" => Keyword::Set,
            "NO" => Keyword::No,
            "ON" => Keyword::On,
            "DELETE" => Keyword::Delete,
            "UPDATE" => Keyword::Update,
            "COMMIT" => Keyword::Commit,
            "PRESERVE" => Keyword::Preserve,
            "DROP" => Keyword::Drop,
            "ROWS" => Keyword::Rows,
            "COLLATE" => Keyword::Collate,
            "STORAGE" => Keyword::Storage,
            "PLAIN" => Keyword::Plain,
            "EXTERNAL" => Keyword::External,
            "EXTENDED" => Keyword::Extended,
            "MAIN" => Keyword::Main,
            "COMPRESSION" => Keyword::Compression,
            "INHERITS" => Keyword::Inherits,
            "LIKE" => Keyword::Like,
            "INCLUDING" => Keyword::Including,
            "EXCLUDING" => Keyword::Excluding,
            "USING" => Keyword::Using,
            "WHERE" => Keyword::Where,
            "TABLESPACE" => Keyword::Tablespace,
            "WITHOUT" => Keyword::Without,
            "OIDS" => Keyword::Oids,
            "GLOBAL" => Keyword::Global,
            "LOCAL" => Keyword::Local,
            "RANGE" => Keyword::Range,
            "LIST" => Keyword::List,
            "HASH" => Keyword::Hash,
            "MINVALUE" => Keyword::Minvalue,
            "MAXVALUE" => Keyword::Maxvalue,
            "NULLS" => Keyword::Nulls,
            "DISTINCT" => Keyword::Distinct,
            "FIRST" => Keyword::First,
            "LAST" => Keyword::Last,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "INCLUDE" => Keyword::Include,
            "OVERLAPS" => Keyword::Overlaps,
            "PERIOD" => Keyword::Period,
            "COMMENTS" => Keyword::Comments,
            "CONSTRAINTS" => Keyword::Constraints,
            "DEFAULTS" => Keyword::Defaults,
            "INDEXES" => Keyword::Indexes,
            "STATISTICS" => Keyword::Statistics,
            "ALL" => Keyword::All,
            "TYPE" => Keyword::Type,
            "ENUM" => Keyword::Enum,
            "SUBTYPE" => Keyword::Subtype,
            "CANONICAL" => Keyword::Canonical,
            "INPUT" => Keyword::Input,
            "OUTPUT" => Keyword::Output,
            "RECEIVE" => Keyword::Receive,
            "SEND" => Keyword::Send,
            "TYPMOD_IN" => Keyword::TypmodIn,
            "TYPMOD_OUT" => Keyword::TypmodOut,
            "ANALYZE" => Keyword::Analyze,
            "INTERNALLENGTH" => Keyword::Internallength,
            "PASSEDBYVALUE" => Keyword::Passedbyvalue,
            "ALIGNMENT" => Keyword::Alignment,
            "PREFERRED" => Keyword::Preferred,
            "DELIMITER" => Keyword::Delimiter,
            "ELEMENT" => Keyword::Element,
            "COLLATABLE" => Keyword::Collatable,
            "VARIABLE" => Keyword::Variable,
            _ => return None,
        };
        Some(keyword)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Table => "TABLE",
            Self::Temporary => "TEMPORARY",
            Self::Temp => "TEMP",
            Self::Unlogged => "UNLOGGED",
            Self::If => "IF",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
            Self::Of => "OF",
            Self::Partition => "PARTITION",
            Self::For => "FOR",
            Self::Values => "VALUES",
            Self::In => "IN",
            Self::From => "FROM",
            Self::To => "TO",
            Self::With => "WITH",
            Self::Modulus => "MODULUS",
            Self::Remainder => "REMAINDER",
            Self::Default => "DEFAULT",
            Self::Constraint => "CONSTRAINT",
            Self::Check => "CHECK",
            Self::Unique => "UNIQUE",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::References => "REFERENCES",
            Self::Foreign => "FOREIGN",
            Self::Null => "NULL",
            Self::Generated => "GENERATED",
            Self::Always => "ALWAYS",
            Self::As => "AS",
            Self::Identity => "IDENTITY",
            Self::By => "BY",
            Self::Stored => "STORED",
            Self::Virtual => "VIRTUAL",
            Self::Exclude => "EXCLUDE",
            Self::Match => "MATCH",
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
            Self::Simple => "SIMPLE",
            Self::Deferrable => "DEFERRABLE",
            Self::Initially => "INITIALLY",
            Self::Deferred => "DEFERRED",
            Self::Immediate => "IMMEDIATE",
            Self::Enforced => "ENFORCED",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::Action => "ACTION",
            Self::Set => "SET",
            Self::No => "NO",
            Self::On => "ON",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
            Self::Commit => "COMMIT",
            Self::Preserve => "PRESERVE",
            Self::Drop => "DROP",
            Self::Rows => "ROWS",
            Self::Collate => "COLLATE",
            Self::Storage => "STORAGE",
            Self::Plain => "PLAIN",
            Self::External => "EXTERNAL",
            Self::Extended => "EXTENDED",
            Self::Main => "MAIN",
            Self::Compression => "COMPRESSION",
            Self::Inherits => "INHERITS",
            Self::Like => "LIKE",
            Self::Including => "INCLUDING",
            Self::Excluding => "EXCLUDING",
            Self::Using => "USING",
            Self::Where => "WHERE",
            Self::Tablespace => "TABLESPACE",
            Self::Without => "WITHOUT",
            Self::Oids => "OIDS",
            Self::Global => "GLOBAL",
            Self::Local => "LOCAL",
            Self::Range => "RANGE",
            Self::List => "LIST",
            Self::Hash => "HASH",
            Self::Minvalue => "MINVALUE",
            Self::Maxvalue => "MAXVALUE",
            Self::Nulls => "NULLS",
            Self::Distinct => "DISTINCT",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Include => "INCLUDE",
            Self::Overlaps => "OVERLAPS",
            Self::Period => "PERIOD",
            Self::Comments => "COMMENTS",
            Self::Constraints => "CONSTRAINTS",
            Self::Defaults => "DEFAULTS",
            Self::Indexes => "INDEXES",
            Self::Statistics => "STATISTICS",
            Self::All => "ALL",
            Self::Type => "TYPE",
            Self::Enum => "ENUM",
            Self::Subtype => "SUBTYPE",
            Self::Canonical => "CANONICAL",
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::Receive => "RECEIVE",
            Self::Send => "SEND",
            Self::TypmodIn => "TYPMOD_IN",
            Self::TypmodOut => "TYPMOD_OUT",
            Self::Analyze => "ANALYZE",
            Self::Internallength => "INTERNALLENGTH",
            Self::Passedbyvalue => "PASSEDBYVALUE",
            Self::Alignment => "ALIGNMENT",
            Self::Preferred => "PREFERRED",
            Self::Delimiter => "DELIMITER",
            Self::Element => "ELEMENT",
            Self::Collatable => "COLLATABLE",
            Self::Variable => "VARIABLE",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full keyword table, used by tests that sweep every entry.
pub const ALL_KEYWORDS: &[Keyword] = &[
    Keyword::Create,
    Keyword::Alter,
    Keyword::Table,
    Keyword::Temporary,
    Keyword::Temp,
    Keyword::Unlogged,
    Keyword::If,
    Keyword::Not,
    Keyword::Exists,
    Keyword::Of,
    Keyword::Partition,
    Keyword::For,
    Keyword::Values,
    Keyword::In,
    Keyword::From,
    Keyword::To,
    Keyword::With,
    Keyword::Modulus,
    Keyword::Remainder,
    Keyword::Default,
    Keyword::Constraint,
    Keyword::Check,
    Keyword::Unique,
    Keyword::Primary,
    Keyword::Key,
    Keyword::References,
    Keyword::Foreign,
    Keyword::Null,
    Keyword::Generated,
    Keyword::Always,
    Keyword::As,
    Keyword::Identity,
    Keyword::By,
    Keyword::Stored,
    Keyword::Virtual,
    Keyword::Exclude,
    Keyword::Match,
    Keyword::Full,
    Keyword::Partial,
    Keyword::Simple,
    Keyword::Deferrable,
    Keyword::Initially,
    Keyword::Deferred,
    Keyword::Immediate,
    Keyword::Enforced,
    Keyword::Cascade,
    Keyword::Restrict,
    Keyword::Action,
    Keyword::Set,
    Keyword::No,
    Keyword::On,
    Keyword::Delete,
    Keyword::Update,
    Keyword::Commit,
    Keyword::Preserve,
    Keyword::Drop,
    Keyword::Rows,
    Keyword::Collate,
    Keyword::Storage,
    Keyword::Plain,
    Keyword::External,
    Keyword::Extended,
    Keyword::Main,
    Keyword::Compression,
    Keyword::Inherits,
    Keyword::Like,
    Keyword::Including,
    Keyword::Excluding,
    Keyword::Using,
    Keyword::Where,
    Keyword::Tablespace,
    Keyword::Without,
    Keyword::Oids,
    Keyword::Global,
    Keyword::Local,
    Keyword::Range,
    Keyword::List,
    Keyword::Hash,
    Keyword::Minvalue,
    Keyword::Maxvalue,
    Keyword::Nulls,
    Keyword::Distinct,
    Keyword::First,
    Keyword::Last,
    Keyword::Asc,
    Keyword::Desc,
    Keyword::Include,
    Keyword::Overlaps,
    Keyword::Period,
    Keyword::Comments,
    Keyword::Constraints,
    Keyword::Defaults,
    Keyword::Indexes,
    Keyword::Statistics,
    Keyword::All,
    Keyword::Type,
    Keyword::Enum,
    Keyword::Subtype,
    Keyword::Canonical,
    Keyword::Input,
    Keyword::Output,
    Keyword::Receive,
    Keyword::Send,
    Keyword::TypmodIn,
    Keyword::TypmodOut,
    Keyword::Analyze,
    Keyword::Internallength,
    Keyword::Passedbyvalue,
    Keyword::Alignment,
    Keyword::Preferred,
    Keyword::Delimiter,
    Keyword::Element,
    Keyword::Collatable,
    Keyword::Variable,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        for keyword in ALL_KEYWORDS {
            let upper = keyword.as_str();
            let lower = upper.to_ascii_lowercase();
            assert_eq!(Keyword::from_ident(upper), Some(*keyword));
            assert_eq!(Keyword::from_ident(&lower), Some(*keyword));
        }
        assert_eq!(Keyword::from_ident("CrEaTe"), Some(Keyword::Create));
    }

    #[test]
    fn plain_identifiers_miss_the_table() {
        assert_eq!(Keyword::from_ident("users"), None);
        assert_eq!(Keyword::from_ident("integer"), None);
        assert_eq!(Keyword::from_ident("_private"), None);
    }

    #[test]
    fn round_trips_through_as_str() {
        for keyword in ALL_KEYWORDS {
            assert_eq!(Keyword::from_ident(keyword.as_str()), Some(*keyword));
        }
    }
}
