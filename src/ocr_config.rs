//! Text extractor selection and image limits applied before OCR.

use std::str::FromStr;

use crate::errors::ScanError;

pub const DEFAULT_LANGUAGES: &str = "eng+fra";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Which text extractor the scanner uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Tesseract OCR; startup fails when the backend is unavailable
    Ocr,
    /// Randomly generated ingredient lists, for demos and degraded operation
    Synthetic,
    /// Tesseract when it can be initialized, synthetic otherwise
    #[default]
    Auto,
}

impl FromStr for ExtractionMode {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ocr" | "tesseract" => Ok(ExtractionMode::Ocr),
            "synthetic" => Ok(ExtractionMode::Synthetic),
            "auto" => Ok(ExtractionMode::Auto),
            other => Err(ScanError::Configuration(format!(
                "unknown extraction mode {other:?} (expected ocr, synthetic or auto)"
            ))),
        }
    }
}

/// Per-format upper bounds on image file size, in bytes
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSizeLimits {
    pub png_max: u64,
    pub jpeg_max: u64,
    pub bmp_max: u64,
    pub tiff_max: u64,
}

impl Default for FormatSizeLimits {
    fn default() -> Self {
        Self {
            png_max: 15 * 1024 * 1024,  // 15MB for PNG
            jpeg_max: 10 * 1024 * 1024, // 10MB for JPEG
            bmp_max: 5 * 1024 * 1024,   // 5MB for BMP
            tiff_max: 20 * 1024 * 1024, // 20MB for TIFF
        }
    }
}

impl FormatSizeLimits {
    /// Size limit for a supported format, `None` for unsupported formats
    pub fn limit_for(&self, format: image::ImageFormat) -> Option<u64> {
        match format {
            image::ImageFormat::Png => Some(self.png_max),
            image::ImageFormat::Jpeg => Some(self.jpeg_max),
            image::ImageFormat::Bmp => Some(self.bmp_max),
            image::ImageFormat::Tiff => Some(self.tiff_max),
            _ => None,
        }
    }
}

/// Tesseract languages and image validation limits
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// Tesseract language string, `+`-separated
    pub languages: String,
    /// Leading bytes read to sniff the image format
    pub buffer_size: usize,
    /// Files shorter than this cannot be identified
    pub min_format_bytes: usize,
    /// Applies to every format, before the per-format limit
    pub max_file_size: u64,
    pub format_limits: FormatSizeLimits,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            format_limits: FormatSizeLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_mode_parsing() {
        assert_eq!("ocr".parse::<ExtractionMode>().unwrap(), ExtractionMode::Ocr);
        assert_eq!("Tesseract".parse::<ExtractionMode>().unwrap(), ExtractionMode::Ocr);
        assert_eq!(" SYNTHETIC ".parse::<ExtractionMode>().unwrap(), ExtractionMode::Synthetic);
        assert_eq!("auto".parse::<ExtractionMode>().unwrap(), ExtractionMode::Auto);
        assert!("cloud".parse::<ExtractionMode>().is_err());
        assert_eq!(ExtractionMode::default(), ExtractionMode::Auto);
    }

    #[test]
    fn test_format_limits() {
        let limits = FormatSizeLimits::default();
        assert_eq!(limits.limit_for(image::ImageFormat::Png), Some(15 * 1024 * 1024));
        assert_eq!(limits.limit_for(image::ImageFormat::Bmp), Some(5 * 1024 * 1024));
        assert_eq!(limits.limit_for(image::ImageFormat::Gif), None);
    }
}
