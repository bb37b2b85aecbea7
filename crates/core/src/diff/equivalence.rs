use super::options::CompareOptions;

/// Identifier equality under the configured case rule.
#[must_use]
pub fn names_equal(a: &str, b: &str, options: &CompareOptions) -> bool {
    if options.case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// Canonicalizes a raw data-type spelling: case-folds, collapses spacing,
/// and rewrites dialect aliases onto their canonical names while keeping
/// any length/precision modifier and array suffix character-exact. The
/// modifier keeps its dialect position (`timestamp(3) with time zone`,
/// `character varying(100)`).
#[must_use]
pub fn normalize_type_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let array_at = trimmed.find('[').unwrap_or(trimmed.len());
    let (base_part, array_part) = trimmed.split_at(array_at);
    let (base_words, modifier) = extract_modifier(base_part);

    let base = collapse_whitespace(&base_words).to_ascii_lowercase();
    let mut canonical = if base.contains('.') {
        base
    } else {
        alias_to_canonical(&base)
            .map(str::to_string)
            .unwrap_or(base)
    };

    if let Some(modifier) = modifier {
        // Time zone spellings carry the modifier on the first word.
        let zone_at = canonical
            .find(" with time zone")
            .or_else(|| canonical.find(" without time zone"));
        match zone_at {
            Some(at) => canonical.insert_str(at, &modifier),
            None => canonical.push_str(&modifier),
        }
    }

    let arrays: String = array_part.chars().filter(|ch| !ch.is_whitespace()).collect();
    canonical.push_str(&arrays);
    canonical
}

/// Removes the `( ... )` modifier group from a type spelling, returning the
/// remaining words and the whitespace-stripped modifier.
fn extract_modifier(base: &str) -> (String, Option<String>) {
    let Some(open) = base.find('(') else {
        return (base.to_string(), None);
    };
    let Some(close_offset) = base[open..].find(')') else {
        return (base.to_string(), None);
    };
    let close = open + close_offset;

    let modifier: String = base[open..=close]
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    let mut words = base[..open].trim_end().to_string();
    let rest = base[close + 1..].trim_start();
    if !rest.is_empty() {
        words.push(' ');
        words.push_str(rest);
    }
    (words, Some(modifier))
}

fn alias_to_canonical(base: &str) -> Option<&'static str> {
    let canonical = match base {
        "bool" | "boolean" => "boolean",
        "int2" | "smallint" => "smallint",
        "int" | "int4" | "integer" => "integer",
        "int8" | "bigint" => "bigint",
        "float4" | "real" => "real",
        "float8" | "double precision" => "double precision",
        "decimal" | "numeric" => "numeric",
        "varchar" | "character varying" => "character varying",
        "bpchar" | "char" | "character" => "character",
        "time" | "time without time zone" => "time without time zone",
        "timetz" | "time with time zone" => "time with time zone",
        "timestamp" | "timestamp without time zone" => "timestamp without time zone",
        "timestamptz" | "timestamp with time zone" => "timestamp with time zone",
        _ => return None,
    };
    Some(canonical)
}

/// Data-type equality. Types are always case-folded; the alias map is only
/// consulted under `normalize_types`.
#[must_use]
pub fn data_types_equal(a: &str, b: &str, options: &CompareOptions) -> bool {
    if options.normalize_types {
        normalize_type_name(a) == normalize_type_name(b)
    } else {
        collapse_whitespace(a).to_ascii_lowercase() == collapse_whitespace(b).to_ascii_lowercase()
    }
}

/// Expression equality is textual; under `ignore_whitespace` both sides are
/// whitespace-normalized first.
#[must_use]
pub fn expressions_equal(a: &str, b: &str, options: &CompareOptions) -> bool {
    if options.ignore_whitespace {
        collapse_whitespace(a) == collapse_whitespace(b)
    } else {
        a == b
    }
}

/// Whitespace normalization for expression and type text. Outside quotes a
/// whitespace run survives only between two identifier characters, and then
/// as a single space, so `a  >=  0` and `a>=0` normalize identically while
/// `not null` keeps its word boundary. Quoted regions (with `''` / `""` and
/// `\'` escapes) pass through untouched.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut pending_space = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() && !in_single_quote && !in_double_quote {
            pending_space = true;
            continue;
        }

        if pending_space {
            if is_word_char(ch) && output.chars().next_back().is_some_and(is_word_char) {
                output.push(' ');
            }
            pending_space = false;
        }

        output.push(ch);

        if in_single_quote && ch == '\\' {
            if let Some(escaped) = chars.next() {
                output.push(escaped);
            }
            continue;
        }

        if ch == '\'' && !in_double_quote {
            if in_single_quote {
                if chars.peek() == Some(&'\'') {
                    output.push('\'');
                    chars.next();
                } else {
                    in_single_quote = false;
                }
            } else {
                in_single_quote = true;
            }
        } else if ch == '"' && !in_single_quote {
            if in_double_quote {
                if chars.peek() == Some(&'"') {
                    output.push('"');
                    chars.next();
                } else {
                    in_double_quote = false;
                }
            } else {
                in_double_quote = true;
            }
        }
    }

    output
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_aliases_normalize_both_ways() {
        let options = CompareOptions::default();
        assert!(data_types_equal("int4", "integer", &options));
        assert!(data_types_equal("integer", "int4", &options));
        assert!(data_types_equal("int8", "bigint", &options));
        assert!(data_types_equal("bool", "BOOLEAN", &options));
    }

    #[test]
    fn varchar_alias_keeps_length_exact() {
        let options = CompareOptions::default();
        assert!(data_types_equal(
            "varchar(100)",
            "character varying(100)",
            &options
        ));
        assert!(!data_types_equal(
            "varchar(100)",
            "character varying(101)",
            &options
        ));
    }

    #[test]
    fn timestamptz_normalizes_to_long_form() {
        assert_eq!(
            normalize_type_name("TIMESTAMPTZ"),
            "timestamp with time zone"
        );
        assert_eq!(
            normalize_type_name("timestamp   with  time zone"),
            "timestamp with time zone"
        );
        assert_eq!(
            normalize_type_name("timestamp(3) with time zone"),
            "timestamp(3) with time zone"
        );
        assert_eq!(
            normalize_type_name("TIMESTAMPTZ(3)"),
            "timestamp(3) with time zone"
        );
    }

    #[test]
    fn array_suffix_survives_normalization() {
        assert_eq!(normalize_type_name("INT4 [ ]"), "integer[]");
        assert_eq!(normalize_type_name("numeric(10, 2)"), "numeric(10,2)");
    }

    #[test]
    fn disabled_normalization_still_case_folds() {
        let options = CompareOptions {
            normalize_types: false,
            ..CompareOptions::default()
        };
        assert!(data_types_equal("TEXT", "text", &options));
        assert!(!data_types_equal("int4", "integer", &options));
    }

    #[test]
    fn operator_spacing_is_ignored() {
        let options = CompareOptions::default();
        assert!(expressions_equal("a>=0", "a  >=  0", &options));
        assert!(expressions_equal("(price * 2)", "( price*2 )", &options));
    }

    #[test]
    fn word_boundaries_survive_normalization() {
        assert_eq!(collapse_whitespace("x IS   NOT NULL"), "x IS NOT NULL");
        assert_ne!(collapse_whitespace("xISNOTNULL"), "x IS NOT NULL");
    }

    #[test]
    fn quoted_content_is_untouched() {
        let options = CompareOptions::default();
        assert!(!expressions_equal("'a  b'", "'a b'", &options));
        assert!(expressions_equal("name <> 'it''s'", "name<>'it''s'", &options));
    }

    #[test]
    fn exact_comparison_when_whitespace_matters() {
        let options = CompareOptions {
            ignore_whitespace: false,
            ..CompareOptions::default()
        };
        assert!(!expressions_equal("a >= 0", "a>=0", &options));
    }

    #[test]
    fn name_equality_follows_case_rule() {
        let folded = CompareOptions::default();
        assert!(names_equal("Users", "users", &folded));

        let sensitive = CompareOptions {
            case_sensitive: true,
            ..CompareOptions::default()
        };
        assert!(!names_equal("Users", "users", &sensitive));
    }
}
