//! Prompt configuration and extraction tag configuration

use serde::{Deserialize, Serialize};

// ============================================================================
// REPLACE POLICY
// ============================================================================

/// Policy controlling which cells a column prompt may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacePolicy {
    /// Every row's cell is rewritten on each run
    ReplaceAll,
    /// Only currently-empty cells are filled
    FillEmptyOnly,
}

impl ReplacePolicy {
    /// Convert to the backend string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::ReplaceAll => "replace_all",
            Self::FillEmptyOnly => "fill_empty_only",
        }
    }

    /// Parse from the backend string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ReplacePolicyParseError> {
        match s {
            "replace_all" => Ok(Self::ReplaceAll),
            "fill_empty_only" => Ok(Self::FillEmptyOnly),
            _ => Err(ReplacePolicyParseError(s.to_string())),
        }
    }
}

impl Default for ReplacePolicy {
    fn default() -> Self {
        Self::FillEmptyOnly
    }
}

/// Error parsing ReplacePolicy from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacePolicyParseError(pub String);

impl std::fmt::Display for ReplacePolicyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid replace policy: {}", self.0)
    }
}

impl std::error::Error for ReplacePolicyParseError {}

// ============================================================================
// COLUMN PROMPT CONFIG
// ============================================================================

/// Per-column prompt definition.
///
/// One config per data column. Created as an inactive placeholder when a
/// column is added, edited by the user afterwards. A config whose column has
/// vanished from the schema is treated as inactive during planning rather
/// than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPromptConfig {
    /// Target column name
    pub column: String,
    /// Prompt template text with `{column}` references
    pub template: String,
    /// Which cells the prompt may overwrite
    pub replace: ReplacePolicy,
    /// Whether this prompt participates in batch runs
    pub active: bool,
    /// Whether the completion call should attach web search
    pub web_search: bool,
}

impl ColumnPromptConfig {
    /// Placeholder template text seeded for newly-added columns.
    pub const LOCKED_TEMPLATE: &'static str = "LOCKED";

    /// Create an inactive placeholder config for a newly-added column.
    pub fn placeholder(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            template: Self::LOCKED_TEMPLATE.to_string(),
            replace: ReplacePolicy::FillEmptyOnly,
            active: false,
            web_search: false,
        }
    }
}

/// Ensure every data column has a prompt config, seeding placeholders for
/// columns that gained none yet. Existing configs are left untouched; configs
/// for vanished columns are retained (they plan as inactive).
pub fn ensure_configs_for_columns(configs: &mut Vec<ColumnPromptConfig>, columns: &[String]) {
    for column in columns {
        if !configs.iter().any(|c| &c.column == column) {
            configs.push(ColumnPromptConfig::placeholder(column.clone()));
        }
    }
}

// ============================================================================
// TAG SET
// ============================================================================

/// Default extraction tag names, in display order.
pub const DEFAULT_TAGS: [&str; 4] = ["sources", "reasoning", "annotations", "answer"];

/// The tag whose content becomes the cell value when present.
pub const ANSWER_TAG: &str = "answer";

/// Global set of extraction tag names.
///
/// Ordered, case-insensitively de-duplicated. Not per-column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn empty() -> Self {
        Self { tags: Vec::new() }
    }

    /// Create a tag set from names, dropping case-insensitive duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::empty();
        for name in names {
            set.add(name);
        }
        set
    }

    /// Add a tag name; case-insensitive duplicates are ignored.
    /// Returns whether the name was added.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.tags.push(trimmed.to_string());
        true
    }

    /// Whether a tag name is present (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Tag names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.tags
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagSet {
    /// The default extraction tags: sources, reasoning, annotations, answer.
    fn default() -> Self {
        Self::from_names(DEFAULT_TAGS)
    }
}

// ============================================================================
// TESTS
// ============================================================================
