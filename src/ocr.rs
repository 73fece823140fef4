//! # Text Extraction Module
//!
//! The boundary between label images and the matching core. A
//! [`TextExtractor`] turns an image into raw text; the scanner treats it as a
//! single blocking call.
//!
//! - [`TesseractExtractor`] runs Tesseract OCR (cargo feature `tesseract`)
//! - [`SyntheticExtractor`](crate::synthetic::SyntheticExtractor) generates a
//!   plausible ingredient list when no OCR backend is available
//!
//! [`build_extractor`] selects one from an [`ExtractionMode`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::dictionaries::DictionarySet;
use crate::ocr_config::{ExtractionMode, OcrConfig};
use crate::ocr_errors::OcrError;
use crate::synthetic::SyntheticExtractor;

/// Source of raw label text
pub trait TextExtractor: Send + Sync {
    /// Short name reported in scan results
    fn name(&self) -> &'static str;

    /// Extract raw text from the image at `image_path`
    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Trim lines and drop empty ones
pub fn clean_extracted_text(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Detect the image format from the file's leading bytes
pub fn detect_image_format(image_path: &Path, config: &OcrConfig) -> Result<image::ImageFormat, OcrError> {
    let file = File::open(image_path).map_err(|e| {
        OcrError::Validation(format!("Could not open image file {}: {e}", image_path.display()))
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = vec![0; config.buffer_size];
    let bytes_read = reader.read(&mut buffer)?;
    if bytes_read < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "Could not read enough bytes to determine image format for {} (read {bytes_read} bytes, need at least {})",
            image_path.display(),
            config.min_format_bytes
        )));
    }
    buffer.truncate(bytes_read);

    debug!("Read {} bytes from file {} for format detection", bytes_read, image_path.display());
    image::guess_format(&buffer).map_err(|e| {
        OcrError::Validation(format!(
            "Could not determine image format for {}: {e}",
            image_path.display()
        ))
    })
}

/// Whether the file is an image format Tesseract reads (PNG, JPEG, BMP, TIFF)
pub fn is_supported_image_format(image_path: &Path, config: &OcrConfig) -> bool {
    match detect_image_format(image_path, config) {
        Ok(format) => {
            let supported = config.format_limits.limit_for(format).is_some();
            if supported {
                debug!("Detected supported image format: {:?} for file: {}", format, image_path.display());
            } else {
                info!("Detected unsupported image format: {:?} for file: {}", format, image_path.display());
            }
            supported
        }
        Err(e) => {
            info!("Image format check failed: {}", e);
            false
        }
    }
}

/// Check existence, general size limit, format and format-specific size limit
pub fn validate_image_path(image_path: &Path, config: &OcrConfig) -> Result<image::ImageFormat, OcrError> {
    let metadata = std::fs::metadata(image_path).map_err(|_| {
        OcrError::Validation(format!("Image file does not exist: {}", image_path.display()))
    })?;
    if !metadata.is_file() {
        return Err(OcrError::Validation(format!(
            "Image path is not a file: {}",
            image_path.display()
        )));
    }

    let size = metadata.len();
    if size > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "Image file too large: {size} bytes (maximum {} bytes)",
            config.max_file_size
        )));
    }

    let format = detect_image_format(image_path, config)?;
    let limit = config.format_limits.limit_for(format).ok_or_else(|| {
        OcrError::Validation(format!("Unsupported image format {format:?}"))
    })?;
    if size > limit {
        return Err(OcrError::Validation(format!(
            "{format:?} image too large: {size} bytes (maximum {limit} bytes)"
        )));
    }

    Ok(format)
}

/// Tesseract-backed extractor
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    config: OcrConfig,
}

impl TesseractExtractor {
    /// Create the extractor, checking that Tesseract loads the configured languages
    #[cfg(feature = "tesseract")]
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        leptess::LepTess::new(None, &config.languages).map_err(|e| {
            OcrError::Initialization(format!("Failed to initialize Tesseract OCR: {e}"))
        })?;
        info!("Tesseract OCR initialized for languages: {}", config.languages);
        Ok(Self { config })
    }

    /// Tesseract support is not compiled in
    #[cfg(not(feature = "tesseract"))]
    pub fn new(_config: OcrConfig) -> Result<Self, OcrError> {
        Err(OcrError::Unavailable(
            "built without the `tesseract` feature".to_string(),
        ))
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    #[cfg(feature = "tesseract")]
    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError> {
        let mut tess = leptess::LepTess::new(None, &self.config.languages).map_err(|e| {
            OcrError::Initialization(format!("Failed to initialize Tesseract OCR: {e}"))
        })?;

        let path = image_path.to_string_lossy().into_owned();
        tess.set_image(path.as_str())
            .map_err(|e| OcrError::ImageLoad(format!("Failed to load image for OCR: {e}")))?;

        tess.get_utf8_text()
            .map_err(|e| OcrError::Extraction(format!("Failed to extract text from image: {e}")))
    }

    #[cfg(not(feature = "tesseract"))]
    fn run_ocr(&self, _image_path: &Path) -> Result<String, OcrError> {
        Err(OcrError::Unavailable(
            "built without the `tesseract` feature".to_string(),
        ))
    }
}

impl TextExtractor for TesseractExtractor {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        info!("Starting OCR text extraction from image: {}", image_path.display());

        let format = validate_image_path(image_path, &self.config)?;
        debug!(format = ?format, "Image validated for OCR");

        let cleaned_text = clean_extracted_text(&self.run_ocr(image_path)?);
        info!(
            "OCR extraction completed. Extracted {} characters of text",
            cleaned_text.chars().count()
        );
        Ok(cleaned_text)
    }
}

/// Build the extractor for `mode`
///
/// `Auto` degrades to the synthetic generator when Tesseract cannot be
/// initialized; `Ocr` reports that as an error instead.
pub fn build_extractor(
    mode: ExtractionMode,
    config: &OcrConfig,
    dictionaries: &DictionarySet,
    synthetic_seed: Option<u64>,
) -> Result<Box<dyn TextExtractor>, OcrError> {
    let synthetic = || -> Box<dyn TextExtractor> {
        match synthetic_seed {
            Some(seed) => Box::new(SyntheticExtractor::with_seed(dictionaries, seed)),
            None => Box::new(SyntheticExtractor::new(dictionaries)),
        }
    };

    match mode {
        ExtractionMode::Ocr => Ok(Box::new(TesseractExtractor::new(config.clone())?)),
        ExtractionMode::Synthetic => {
            info!("Using synthetic ingredient lists instead of OCR");
            Ok(synthetic())
        }
        ExtractionMode::Auto => match TesseractExtractor::new(config.clone()) {
            Ok(extractor) => Ok(Box::new(extractor)),
            Err(e) => {
                warn!(error = %e, "OCR backend unavailable, falling back to synthetic ingredient lists");
                Ok(synthetic())
            }
        },
    }
}
