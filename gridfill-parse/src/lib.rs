//! Gridfill Parse - Template Resolution and Tag Extraction
//!
//! Pure string functions: substituting `{column}` references into prompt
//! templates, and scraping tagged sections out of LLM responses with a
//! deliberately tolerant matcher. Nothing in this crate performs IO or
//! returns an error - malformed input degrades instead of failing.

pub mod tags;
pub mod template;

pub use tags::{extract_tags, fallback_answer, validate_response, ResponseValidation};
pub use template::resolve_template;
