//! # OCR Error Types Module
//!
//! This module defines the error types raised at the text extraction boundary.
//! Extraction errors never reach the caller of a scan: the scanner turns them
//! into a harmless default result.

/// Custom error types for text extraction
#[derive(Debug, Clone, PartialEq)]
pub enum OcrError {
    /// File validation errors (missing file, size limits, unsupported format)
    Validation(String),
    /// OCR engine initialization errors
    Initialization(String),
    /// Image loading errors
    ImageLoad(String),
    /// Text extraction errors
    Extraction(String),
    /// The OCR backend is not compiled in or cannot be reached
    Unavailable(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
            OcrError::ImageLoad(msg) => write!(f, "Image load error: {msg}"),
            OcrError::Extraction(msg) => write!(f, "Extraction error: {msg}"),
            OcrError::Unavailable(msg) => write!(f, "OCR backend unavailable: {msg}"),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<std::io::Error> for OcrError {
    fn from(err: std::io::Error) -> Self {
        OcrError::ImageLoad(err.to_string())
    }
}
