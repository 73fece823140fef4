//! # Scan Error Types
//!
//! Failure taxonomy of the scanning core:
//!
//! - [`ScanError::Extraction`]: the text extractor failed for one image.
//! - [`ScanError::Configuration`]: dictionaries, tables or rules are malformed.
//!   Raised while building the scanner and fatal at startup.
//! - [`ScanError::Scoring`]: the rating engine could not produce a verdict.
//!
//! Extraction and scoring failures are recovered by the scanner, which answers
//! with the default [`ScanResult`](crate::scanner::ScanResult).

use crate::ocr_errors::OcrError;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// Text extraction failed
    Extraction(OcrError),
    /// Invalid dictionary, table, rule or threshold configuration
    Configuration(String),
    /// No verdict could be computed for a match set
    Scoring(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Extraction(err) => write!(f, "Extraction failure: {err}"),
            ScanError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            ScanError::Scoring(msg) => write!(f, "Scoring failure: {msg}"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Extraction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OcrError> for ScanError {
    fn from(err: OcrError) -> Self {
        ScanError::Extraction(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_extraction_error_keeps_source() {
        let err: ScanError = OcrError::Extraction("tesseract crashed".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Extraction failure: Extraction error: tesseract crashed"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_configuration_error_has_no_source() {
        let err = ScanError::Configuration("empty rule table".to_string());
        assert_eq!(err.to_string(), "Configuration error: empty rule table");
        assert!(err.source().is_none());
    }
}
