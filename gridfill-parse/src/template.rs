//! Prompt template resolution

use gridfill_core::CellValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Matches `{name}` and `{name:default}` tokens. Names may contain letters,
/// digits, underscores, dashes, and interior spaces; the default part may
/// contain anything except braces.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z0-9_\- ]+)(?::([^{}]*))?\}").expect("token pattern is valid")
});

/// Substitute column references inside a template string.
///
/// Token grammar:
/// - `{name}` - the row's value for `name`, or empty string if absent
/// - `{name:default}` - the row's value, or the literal default if the
///   value is absent or empty
///
/// Whitespace around names is ignored. Unmatched braces and tokens with a
/// blank name pass through literally. Substitution is single-pass and purely
/// textual - substituted values are never re-scanned for tokens.
///
/// A doubled brace such as `{{name}}` is not special syntax: the inner
/// `{name}` resolves and the outer braces pass through.
pub fn resolve_template(template: &str, values: &HashMap<String, CellValue>) -> String {
    TOKEN_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps[1].trim();
            if name.is_empty() {
                // `{ }` and friends are not tokens
                return caps[0].to_string();
            }
            let value = values.get(name);
            match caps.get(2) {
                Some(default) => match value {
                    Some(v) if !v.is_empty() => v.as_display_string(),
                    _ => default.as_str().to_string(),
                },
                None => value.map(CellValue::as_display_string).unwrap_or_default(),
            }
        })
        .into_owned()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> HashMap<String, CellValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_substitutes_value_verbatim() {
        let values = row(&[("name", CellValue::text("Alice"))]);
        assert_eq!(
            resolve_template("Summarize: {name}", &values),
            "Summarize: Alice"
        );
    }

    #[test]
    fn test_absent_column_resolves_empty() {
        let values = row(&[]);
        assert_eq!(resolve_template("Hello {name}!", &values), "Hello !");
    }

    #[test]
    fn test_default_used_when_absent() {
        let values = row(&[]);
        assert_eq!(
            resolve_template("{region:EU} pricing", &values),
            "EU pricing"
        );
    }

    #[test]
    fn test_default_used_when_empty() {
        let values = row(&[("region", CellValue::text("  "))]);
        assert_eq!(resolve_template("{region:EU}", &values), "EU");
    }

    #[test]
    fn test_default_ignored_when_value_present() {
        let values = row(&[("region", CellValue::text("APAC"))]);
        assert_eq!(resolve_template("{region:EU}", &values), "APAC");
    }

    #[test]
    fn test_whitespace_around_name_ignored() {
        let values = row(&[("name", CellValue::text("Bob"))]);
        assert_eq!(resolve_template("{ name }", &values), "Bob");
    }

    #[test]
    fn test_unmatched_braces_pass_through() {
        let values = row(&[("name", CellValue::text("Bob"))]);
        assert_eq!(resolve_template("open { only", &values), "open { only");
        assert_eq!(resolve_template("close } only", &values), "close } only");
        // Characters outside the name grammar keep the braces literal.
        assert_eq!(resolve_template("{not!a.token}", &values), "{not!a.token}");
        assert_eq!(resolve_template("empty {} braces", &values), "empty {} braces");
    }

    #[test]
    fn test_number_and_bool_render() {
        let values = row(&[
            ("count", CellValue::Number(3.0)),
            ("active", CellValue::Bool(true)),
        ]);
        assert_eq!(
            resolve_template("{count} items, active={active}", &values),
            "3 items, active=true"
        );
    }

    #[test]
    fn test_no_recursive_resolution() {
        // A substituted value containing a token is not re-scanned.
        let values = row(&[
            ("a", CellValue::text("{b}")),
            ("b", CellValue::text("deep")),
        ]);
        assert_eq!(resolve_template("{a}", &values), "{b}");
    }

    #[test]
    fn test_double_brace_resolves_inner_token() {
        let values = row(&[("name", CellValue::text("Alice"))]);
        assert_eq!(resolve_template("{{name}}", &values), "{Alice}");
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
