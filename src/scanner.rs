//! # Scan Orchestrator Module
//!
//! Ties extraction, matching, quality assessment and rating together. A scan
//! never fails from the caller's point of view: extraction and scoring errors
//! are logged and replaced with [`ScanResult::fallback`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::errors::ScanError;
use crate::matcher::{CategoryMatches, IngredientMatcher};
use crate::ocr::TextExtractor;
use crate::quality::{self, Confidence, TextQuality};
use crate::rating::{RatingEngine, Verdict};

/// Extracted text kept in a [`ScanDocument`]
pub const MAX_DOCUMENT_TEXT_CHARS: usize = 300;

/// Extractor name reported by [`IngredientScanner::scan_text`]
pub const TEXT_INPUT_EXTRACTOR: &str = "text";

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub rating: Verdict,
    pub matches: CategoryMatches,
    pub confidence: Confidence,
    pub quality: TextQuality,
    pub extracted_text: String,
    /// Length of `extracted_text` in characters
    pub extracted_text_length: usize,
    pub risk_score: u32,
    pub danger_terms: Vec<String>,
    pub extractor: String,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    /// Harmless result returned when a scan cannot complete
    pub fn fallback(extractor: &str) -> Self {
        Self {
            rating: Verdict::TryAgain,
            matches: CategoryMatches::fallback(),
            confidence: Confidence::Low,
            quality: TextQuality::Poor,
            extracted_text: String::new(),
            extracted_text_length: 0,
            risk_score: 0,
            danger_terms: Vec::new(),
            extractor: extractor.to_string(),
            scanned_at: Utc::now(),
        }
    }

    /// Flatten into the JSON-facing document
    pub fn to_document(&self) -> ScanDocument {
        let sorted = |terms: &BTreeSet<String>| -> Vec<String> { terms.iter().cloned().collect() };

        ScanDocument {
            rating: self.rating,
            trans_fat: sorted(&self.matches.trans_fat),
            excitotoxins: sorted(&self.matches.excitotoxins),
            corn: sorted(&self.matches.corn),
            sugar: sorted(&self.matches.sugar),
            gmo: sorted(&self.matches.gmo),
            safe_ingredients: sorted(&self.matches.safe_ingredients),
            chemical_additives: sorted(&self.matches.chemical_additives),
            all_detected: sorted(&self.matches.all_detected),
            confidence: self.confidence,
            quality: self.quality,
            extracted_text: truncate_text(&self.extracted_text, MAX_DOCUMENT_TEXT_CHARS),
            extracted_text_length: self.extracted_text_length,
            risk_score: self.risk_score,
            danger_terms: self.danger_terms.clone(),
            extractor: self.extractor.clone(),
            scanned_at: self.scanned_at,
        }
    }
}

/// JSON-compatible view of a [`ScanResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDocument {
    pub rating: Verdict,
    pub trans_fat: Vec<String>,
    pub excitotoxins: Vec<String>,
    pub corn: Vec<String>,
    pub sugar: Vec<String>,
    pub gmo: Vec<String>,
    pub safe_ingredients: Vec<String>,
    pub chemical_additives: Vec<String>,
    pub all_detected: Vec<String>,
    pub confidence: Confidence,
    pub quality: TextQuality,
    pub extracted_text: String,
    pub extracted_text_length: usize,
    pub risk_score: u32,
    pub danger_terms: Vec<String>,
    pub extractor: String,
    pub scanned_at: DateTime<Utc>,
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Extracts, matches and rates ingredient labels
pub struct IngredientScanner {
    extractor: Box<dyn TextExtractor>,
    matcher: IngredientMatcher,
    engine: RatingEngine,
}

impl IngredientScanner {
    /// Build a scanner; an invalid configuration is rejected here
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::config::EngineConfig;
    /// use ingredient_checker::dictionaries::DictionarySet;
    /// use ingredient_checker::rating::Verdict;
    /// use ingredient_checker::scanner::IngredientScanner;
    /// use ingredient_checker::synthetic::SyntheticExtractor;
    ///
    /// let extractor = Box::new(SyntheticExtractor::with_seed(&DictionarySet::default(), 1));
    /// let scanner = IngredientScanner::new(EngineConfig::default(), extractor)?;
    ///
    /// let result = scanner.scan_text("organic wheat flour, water, sea salt, yeast, olive oil");
    /// assert_eq!(result.rating, Verdict::Safe);
    /// # Ok::<(), ingredient_checker::errors::ScanError>(())
    /// ```
    pub fn new(config: EngineConfig, extractor: Box<dyn TextExtractor>) -> Result<Self, ScanError> {
        config.validate()?;
        let matcher = IngredientMatcher::from_config(&config)?;
        let engine = RatingEngine::new(config.scoring)?;

        info!(extractor = extractor.name(), "Created IngredientScanner");
        Ok(Self {
            extractor,
            matcher,
            engine,
        })
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn matcher(&self) -> &IngredientMatcher {
        &self.matcher
    }

    pub fn engine(&self) -> &RatingEngine {
        &self.engine
    }

    /// Extract text from an image and rate it
    pub fn scan(&self, image_path: &Path) -> ScanResult {
        let start_time = Instant::now();
        let extractor = self.extractor.name();
        info!(image = %image_path.display(), extractor, "Starting ingredient scan");

        let text = match self.extractor.extract_text(image_path) {
            Ok(text) => text,
            Err(e) => {
                let err = ScanError::from(e);
                error!(image = %image_path.display(), error = %err, "Scan failed, returning default result");
                return ScanResult::fallback(extractor);
            }
        };

        let result = self.analyze_or_fallback(&text, extractor);
        info!(
            image = %image_path.display(),
            verdict = %result.rating,
            duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Ingredient scan completed"
        );
        result
    }

    /// Rate text that was extracted elsewhere
    pub fn scan_text(&self, text: &str) -> ScanResult {
        self.analyze_or_fallback(text, TEXT_INPUT_EXTRACTOR)
    }

    fn analyze_or_fallback(&self, text: &str, extractor: &str) -> ScanResult {
        match self.analyze(text, extractor) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Rating failed, returning default result");
                ScanResult::fallback(extractor)
            }
        }
    }

    fn analyze(&self, text: &str, extractor: &str) -> Result<ScanResult, ScanError> {
        let quality = quality::assess(text);
        let matches = self.matcher.match_categories(text);
        let outcome = self.engine.evaluate(&matches, quality)?;
        let confidence = Confidence::derive(quality, matches.all_detected.len());

        Ok(ScanResult {
            rating: outcome.verdict,
            confidence,
            quality,
            extracted_text: text.to_string(),
            extracted_text_length: text.chars().count(),
            risk_score: outcome.score,
            danger_terms: outcome.danger_terms.into_iter().collect(),
            extractor: extractor.to_string(),
            scanned_at: Utc::now(),
            matches,
        })
    }
}
