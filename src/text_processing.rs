//! # Text Processing Module
//!
//! This module normalizes raw OCR text before it is matched against the
//! ingredient dictionaries.
//!
//! ## Normalization steps
//!
//! 1. Lowercase the input
//! 2. Replace every character that is not alphanumeric, whitespace, `,`, `.`, `-`,
//!    `(` or `)` with a space
//! 3. Collapse whitespace runs to a single space and trim
//! 4. Apply the OCR correction table as literal substring replacements, in table order
//!
//! Corrections run last, on text that is already clean, so a misread split by
//! a tab or a stray symbol is still found. [`validate_corrections`] only
//! accepts tables whose output contains no misread and no character the
//! earlier steps would change, which makes a single pass idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::dictionaries::default_ocr_corrections;
use crate::errors::ScanError;

lazy_static! {
    static ref NON_SEMANTIC_CHARS: Regex = Regex::new(r"[^\p{Alphabetic}\p{N}\s,.()\-]")
        .expect("Non-semantic character pattern should be valid");
    static ref WHITESPACE_RUNS: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Lowercases, corrects and cleans OCR text
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    corrections: Vec<(String, String)>,
}

impl TextNormalizer {
    /// Create a normalizer with the built-in OCR correction table
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::text_processing::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::new();
    /// assert_eq!(
    ///     normalizer.normalize("INGREDIENTS: Water, C0RN Syrop!"),
    ///     "ingredients water, corn syrup"
    /// );
    /// ```
    pub fn new() -> Self {
        Self {
            corrections: default_ocr_corrections(),
        }
    }

    /// Create a normalizer with a custom correction table
    ///
    /// Corrections are applied in the given order. See [`validate_corrections`]
    /// for the tables that are accepted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::text_processing::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::with_corrections(vec![
    ///     ("0live".to_string(), "olive".to_string()),
    /// ])?;
    /// assert_eq!(normalizer.normalize("0live oil"), "olive oil");
    /// # Ok::<(), ingredient_checker::errors::ScanError>(())
    /// ```
    pub fn with_corrections(corrections: Vec<(String, String)>) -> Result<Self, ScanError> {
        validate_corrections(&corrections)?;
        debug!(corrections = corrections.len(), "Creating TextNormalizer with custom corrections");
        Ok(Self { corrections })
    }

    pub fn corrections(&self) -> &[(String, String)] {
        &self.corrections
    }

    /// Normalize text for matching. Never fails; blank input yields `""`.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let lowered = text.to_lowercase();
        let stripped = NON_SEMANTIC_CHARS.replace_all(&lowered, " ");
        let mut normalized = WHITESPACE_RUNS.replace_all(&stripped, " ").trim().to_string();

        for (misread, replacement) in &self.corrections {
            if normalized.contains(misread.as_str()) {
                normalized = normalized.replace(misread.as_str(), replacement);
            }
        }

        trace!("Normalized text: '{}' -> '{}'", text, normalized);
        normalized
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check an OCR correction table
///
/// Both sides of every correction must be non-empty and already normalized
/// (lowercase, only semantic characters, single inner spaces). A replacement
/// may not contain any misread, and it may not complete a misread of its own
/// entry or an earlier one together with the text around it: `("ab", "a")`
/// turns `"abb"` into `"ab"`, which a second pass would rewrite again.
/// Later entries are exempt because they still run over the replaced text.
pub fn validate_corrections(corrections: &[(String, String)]) -> Result<(), ScanError> {
    for (index, (misread, replacement)) in corrections.iter().enumerate() {
        if misread.is_empty() || replacement.is_empty() {
            return Err(ScanError::Configuration(format!(
                "OCR correction {misread:?} -> {replacement:?} has an empty side"
            )));
        }
        if !is_normalized(misread) || !is_normalized(replacement) {
            return Err(ScanError::Configuration(format!(
                "OCR correction {misread:?} -> {replacement:?} must be lowercase and contain only letters, digits, single spaces, ',', '.', '-', '(' or ')'"
            )));
        }

        for (position, (other, _)) in corrections.iter().enumerate() {
            if replacement.contains(other.as_str()) {
                return Err(ScanError::Configuration(format!(
                    "OCR correction {misread:?} -> {replacement:?} reintroduces misread {other:?}"
                )));
            }
            if position <= index && completes_misread(replacement, other) {
                return Err(ScanError::Configuration(format!(
                    "OCR correction {misread:?} -> {replacement:?} can form misread {other:?} with adjacent text"
                )));
            }
        }
    }
    Ok(())
}

fn is_normalized(term: &str) -> bool {
    term.to_lowercase() == term
        && !NON_SEMANTIC_CHARS.is_match(term)
        && WHITESPACE_RUNS.replace_all(term, " ").trim() == term
}

/// Whether `replacement` plus surrounding text can spell `misread`
fn completes_misread(replacement: &str, misread: &str) -> bool {
    if misread.contains(replacement) {
        return true;
    }
    misread.char_indices().skip(1).any(|(split, _)| {
        replacement.ends_with(&misread[..split]) || replacement.starts_with(&misread[split..])
    })
}
