//! Cell value scalar type

use serde::{Deserialize, Serialize};

/// A scalar cell value as stored in the row table.
///
/// The backend stores everything as loosely-typed scalars; this enum keeps
/// the distinction so replace policies and serialization stay faithful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Free text
    Text(String),
    /// Numeric value (the backend does not distinguish int/float)
    Number(f64),
    /// Boolean flag
    Bool(bool),
    /// No value
    Empty,
}

impl CellValue {
    /// Whether this cell counts as empty for the `FillEmptyOnly` replace
    /// policy. Whitespace-only text counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value the way it is substituted into prompt templates and
    /// written back to the backend. `Empty` renders as the empty string.
    pub fn as_display_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Whole numbers render without a trailing ".0"
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Convenience constructor for text cells.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_display_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Text cells are empty exactly when their trimmed text is empty.
        #[test]
        fn prop_text_emptiness_matches_trimmed(text in ".{0,40}") {
            let cell = CellValue::text(text.clone());
            prop_assert_eq!(cell.is_empty(), text.trim().is_empty());
        }

        /// Display renders text cells verbatim.
        #[test]
        fn prop_text_displays_verbatim(text in ".{0,40}") {
            let cell = CellValue::text(text.clone());
            prop_assert_eq!(cell.to_string(), text);
        }

        /// Numbers and booleans are never empty, whatever their value.
        #[test]
        fn prop_scalars_never_empty(n in proptest::num::f64::NORMAL, b in any::<bool>()) {
            prop_assert!(!CellValue::Number(n).is_empty());
            prop_assert!(!CellValue::Bool(b).is_empty());
        }
    }
}
