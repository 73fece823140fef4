//! # Ingredient Checker
//!
//! Rates food-label ingredient lists. Text extracted from a label image (by
//! OCR or the synthetic generator) is normalized, matched against curated
//! ingredient dictionaries and scored into one of four verdicts:
//! `TRY_AGAIN`, `DANGER`, `CAUTION` or `SAFE`.
//!
//! ```rust
//! use ingredient_checker::config::EngineConfig;
//! use ingredient_checker::rating::Verdict;
//! use ingredient_checker::scanner::IngredientScanner;
//! use ingredient_checker::synthetic::SyntheticExtractor;
//!
//! let config = EngineConfig::default();
//! let extractor = Box::new(SyntheticExtractor::new(&config.dictionaries));
//! let scanner = IngredientScanner::new(config, extractor)?;
//!
//! let result = scanner.scan_text("water, sugar, high fructose corn syrup, citric acid, natural flavors");
//! assert_eq!(result.rating, Verdict::Danger);
//! assert!(result.matches.gmo.contains("high fructose corn syrup"));
//! # Ok::<(), ingredient_checker::errors::ScanError>(())
//! ```

pub mod config;
pub mod dictionaries;
pub mod errors;
pub mod matcher;
pub mod observability;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod quality;
pub mod rating;
pub mod scanner;
pub mod synthetic;
pub mod text_processing;

pub use config::{AppConfig, EngineConfig};
pub use errors::ScanError;
pub use ocr_errors::OcrError;
pub use rating::Verdict;
pub use scanner::{IngredientScanner, ScanDocument, ScanResult};
