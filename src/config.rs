//! # Configuration Module
//!
//! - [`EngineConfig`]: every matching and scoring knob (dictionaries, OCR
//!   corrections, synonyms, partial-match rules, weights, thresholds, top-tier
//!   danger subsets and the rule table). Loaded from JSON; missing fields fall
//!   back to the built-in values.
//! - [`AppConfig`]: process settings read from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dictionaries::{
    default_ocr_corrections, default_synonyms, validate_term, DictionarySet,
    EXCITOTOXIN_TOP5_DANGER, GMO_DANGER_MARKERS, TRANS_FAT_TOP5_DANGER,
};
use crate::errors::ScanError;
use crate::matcher::{default_partial_rules, PartialMatchRule};
use crate::observability::LogFormat;
use crate::ocr_config::{ExtractionMode, OcrConfig};
use crate::rating::RatingRule;
use crate::text_processing::validate_corrections;

pub const DEFAULT_DANGER_THRESHOLD: u32 = 8;
pub const DEFAULT_CAUTION_THRESHOLD: u32 = 1;
pub const DEFAULT_MAX_CONCURRENT_SCANS: usize = 4;

/// Score contribution of one matched term per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub trans_fat: u32,
    pub excitotoxin: u32,
    pub corn: u32,
    pub sugar: u32,
    pub gmo: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trans_fat: 3,
            excitotoxin: 3,
            corn: 2,
            sugar: 1,
            gmo: 2,
        }
    }
}

/// Rating engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Scores at or above this rate as danger
    pub danger_threshold: u32,
    /// Scores at or above this (and below danger) rate as caution
    pub caution_threshold: u32,
    pub trans_fat_top5: BTreeSet<String>,
    pub excitotoxin_top5: BTreeSet<String>,
    /// A matched GMO term containing any of these forces danger
    pub gmo_danger_markers: Vec<String>,
    /// Custom rule table; `None` derives the default table from the thresholds
    pub rules: Option<Vec<RatingRule>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            danger_threshold: DEFAULT_DANGER_THRESHOLD,
            caution_threshold: DEFAULT_CAUTION_THRESHOLD,
            trans_fat_top5: owned_terms(TRANS_FAT_TOP5_DANGER),
            excitotoxin_top5: owned_terms(EXCITOTOXIN_TOP5_DANGER),
            gmo_danger_markers: owned_terms(GMO_DANGER_MARKERS),
            rules: None,
        }
    }
}

fn owned_terms<C: FromIterator<String>>(terms: &[&str]) -> C {
    terms.iter().map(|term| term.to_string()).collect()
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.caution_threshold == 0 {
            return Err(ScanError::Configuration(
                "caution threshold must be at least 1".to_string(),
            ));
        }
        if self.caution_threshold > self.danger_threshold {
            return Err(ScanError::Configuration(format!(
                "caution threshold {} exceeds danger threshold {}",
                self.caution_threshold, self.danger_threshold
            )));
        }

        for term in self
            .trans_fat_top5
            .iter()
            .chain(&self.excitotoxin_top5)
            .chain(&self.gmo_danger_markers)
        {
            validate_term(term).map_err(|reason| {
                ScanError::Configuration(format!("danger term {term:?} {reason}"))
            })?;
        }

        if matches!(&self.rules, Some(rules) if rules.is_empty()) {
            return Err(ScanError::Configuration("rating rule table is empty".to_string()));
        }
        Ok(())
    }
}

/// Complete matching and scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dictionaries: DictionarySet,
    /// Ordered (misread, replacement) pairs
    pub ocr_corrections: Vec<(String, String)>,
    /// Canonical term to alternate forms
    pub synonyms: BTreeMap<String, Vec<String>>,
    pub partial_matches: Vec<PartialMatchRule>,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionaries: DictionarySet::default(),
            ocr_corrections: default_ocr_corrections(),
            synonyms: default_synonyms(),
            partial_matches: default_partial_rules(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_json_str(r#"{"scoring": {"danger_threshold": 12}}"#)?;
    /// assert_eq!(config.scoring.danger_threshold, 12);
    /// assert_eq!(config.scoring.weights.trans_fat, 3);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).context("Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        info!("Loading engine configuration from: {}", path.display());
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine configuration {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid engine configuration {}", path.display()))
    }

    /// Check every table; any error here is fatal at startup
    pub fn validate(&self) -> Result<(), ScanError> {
        self.dictionaries.validate()?;
        validate_corrections(&self.ocr_corrections)?;
        self.scoring.validate()?;

        let trans_fat = self.dictionaries.trans_fat.risk_terms();
        if let Some(term) = self.scoring.trans_fat_top5.iter().find(|t| !trans_fat.contains(*t)) {
            return Err(ScanError::Configuration(format!(
                "trans fat danger term {term:?} is not a trans fat risk term; overriding the trans_fat dictionary replaces all of its tiers, so list {term:?} again or override scoring.trans_fat_top5"
            )));
        }
        let excitotoxin = self.dictionaries.excitotoxin.risk_terms();
        if let Some(term) = self
            .scoring
            .excitotoxin_top5
            .iter()
            .find(|t| !excitotoxin.contains(*t))
        {
            return Err(ScanError::Configuration(format!(
                "excitotoxin danger term {term:?} is not an excitotoxin risk term; overriding the excitotoxin dictionary replaces all of its tiers, so list {term:?} again or override scoring.excitotoxin_top5"
            )));
        }

        for (canonical, forms) in &self.synonyms {
            for form in std::iter::once(canonical).chain(forms) {
                validate_term(form).map_err(|reason| {
                    ScanError::Configuration(format!("synonym {form:?} of {canonical:?} {reason}"))
                })?;
            }
        }

        for rule in &self.partial_matches {
            if rule.term_prefix.trim().is_empty() || rule.fragments.iter().all(|f| f.trim().is_empty()) {
                return Err(ScanError::Configuration(format!(
                    "partial match rule {:?} needs a prefix and at least one fragment",
                    rule.term_prefix
                )));
            }
        }

        Ok(())
    }
}

/// Process settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `INGREDIENT_CONFIG`: JSON engine configuration; built-ins when unset
    pub engine_config_path: Option<PathBuf>,
    /// `EXTRACTION_MODE`: ocr, synthetic or auto
    pub extraction_mode: ExtractionMode,
    /// `OCR_LANGUAGES` overrides the Tesseract languages
    pub ocr: OcrConfig,
    /// `SYNTHETIC_SEED` makes synthetic ingredient lists reproducible
    pub synthetic_seed: Option<u64>,
    /// `MAX_CONCURRENT_SCANS`
    pub max_concurrent_scans: usize,
    /// `LOG_FORMAT`: pretty or json
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through a key lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let extraction_mode = match value("EXTRACTION_MODE") {
            Some(mode) => mode.parse().context("Invalid EXTRACTION_MODE")?,
            None => ExtractionMode::default(),
        };

        let mut ocr = OcrConfig::default();
        if let Some(languages) = value("OCR_LANGUAGES") {
            ocr.languages = languages;
        }

        let synthetic_seed = value("SYNTHETIC_SEED")
            .map(|seed| seed.parse::<u64>())
            .transpose()
            .context("SYNTHETIC_SEED must be an unsigned integer")?;

        let max_concurrent_scans = value("MAX_CONCURRENT_SCANS")
            .map(|n| n.parse::<usize>())
            .transpose()
            .context("MAX_CONCURRENT_SCANS must be a positive integer")?
            .unwrap_or(DEFAULT_MAX_CONCURRENT_SCANS);
        if max_concurrent_scans == 0 {
            anyhow::bail!("MAX_CONCURRENT_SCANS must be a positive integer");
        }

        let log_format = match value("LOG_FORMAT") {
            Some(format) => format.parse().context("Invalid LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            engine_config_path: value("INGREDIENT_CONFIG").map(PathBuf::from),
            extraction_mode,
            ocr,
            synthetic_seed,
            max_concurrent_scans,
            log_format,
        })
    }

    /// Engine configuration from `engine_config_path`, or the built-ins
    pub fn load_engine_config(&self) -> Result<EngineConfig> {
        match &self.engine_config_path {
            Some(path) => EngineConfig::from_json_file(path),
            None => Ok(EngineConfig::default()),
        }
    }
}
