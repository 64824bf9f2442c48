//! Spreadsheet id extraction from share URLs

use once_cell::sync::Lazy;
use regex::Regex;

/// URL shapes the id can be recovered from, tried in order.
static ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Standard sharing URL: https://docs.google.com/spreadsheets/d/SHEET_ID/edit...
        r"https://docs\.google\.com/spreadsheets/d/([A-Za-z0-9_-]+)",
        // Any path containing the /spreadsheets/d/ segment
        r"/spreadsheets/d/([A-Za-z0-9_-]+)",
        // A bare id on its own
        r"^([A-Za-z0-9_-]{20,})$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("id pattern is valid"))
    .collect()
});

/// Extract a spreadsheet id from a share URL, or pass a bare id through.
///
/// Whitespace is trimmed first. Inputs matching none of the known URL
/// shapes come back as-is - the caller decides whether to treat them as an
/// id or reject them.
pub fn extract_sheet_id(url_or_id: &str) -> String {
    let trimmed = url_or_id.trim();

    // Already a bare id (no slashes, plausible length)
    if !trimmed.contains('/') && trimmed.len() > 20 {
        return trimmed.to_string();
    }

    for pattern in ID_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            return caps[1].to_string();
        }
    }

    trimmed.to_string()
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
