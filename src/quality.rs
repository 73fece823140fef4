//! # Text Quality Module
//!
//! Grades how usable extracted text is, and derives the confidence signal that
//! accompanies every verdict.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Trimmed texts shorter than this are unusable
pub const MIN_TEXT_LENGTH: usize = 5;
/// Fewer words than this grades as poor
pub const MIN_WORD_COUNT: usize = 2;
/// Word count needed for a good grade
pub const GOOD_WORD_COUNT: usize = 5;
/// Character length needed for a good grade
pub const GOOD_TEXT_LENGTH: usize = 25;
/// Detected ingredients needed for high confidence
pub const HIGH_CONFIDENCE_MATCHES: usize = 3;

lazy_static! {
    static ref WORD_PATTERN: Regex =
        Regex::new(r"\p{Alphabetic}{2,}").expect("Word pattern should be valid");
}

/// Usability grade of extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextQuality {
    VeryPoor,
    Poor,
    Medium,
    Good,
}

impl TextQuality {
    pub fn label(&self) -> &'static str {
        match self {
            TextQuality::VeryPoor => "very_poor",
            TextQuality::Poor => "poor",
            TextQuality::Medium => "medium",
            TextQuality::Good => "good",
        }
    }
}

impl fmt::Display for TextQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How far a verdict can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryLow,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Derive confidence from text quality and the number of detected ingredients
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::quality::{Confidence, TextQuality};
    ///
    /// assert_eq!(Confidence::derive(TextQuality::Good, 4), Confidence::High);
    /// assert_eq!(Confidence::derive(TextQuality::Medium, 4), Confidence::Medium);
    /// assert_eq!(Confidence::derive(TextQuality::VeryPoor, 10), Confidence::VeryLow);
    /// ```
    pub fn derive(quality: TextQuality, detected: usize) -> Self {
        match quality {
            TextQuality::VeryPoor => Confidence::VeryLow,
            TextQuality::Poor => Confidence::Low,
            TextQuality::Good if detected >= HIGH_CONFIDENCE_MATCHES => Confidence::High,
            _ if detected >= 1 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::VeryLow => "very_low",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count runs of two or more alphabetic characters
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

/// Grade extracted text by length and word count
///
/// # Examples
///
/// ```rust
/// use ingredient_checker::quality::{assess, TextQuality};
///
/// assert_eq!(assess(""), TextQuality::VeryPoor);
/// assert_eq!(assess("12345 6"), TextQuality::Poor);
/// assert_eq!(assess("water, salt"), TextQuality::Medium);
/// assert_eq!(assess("water, sugar, salt, yeast, wheat flour"), TextQuality::Good);
/// ```
pub fn assess(text: &str) -> TextQuality {
    if text.trim().chars().count() < MIN_TEXT_LENGTH {
        return TextQuality::VeryPoor;
    }

    let words = word_count(text);
    let length = text.chars().count();

    let quality = if words < MIN_WORD_COUNT {
        TextQuality::Poor
    } else if words >= GOOD_WORD_COUNT && length >= GOOD_TEXT_LENGTH {
        TextQuality::Good
    } else {
        TextQuality::Medium
    };

    trace!(words, length, quality = %quality, "Assessed text quality");
    quality
}
