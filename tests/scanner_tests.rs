//! # Scanner Tests Module
//!
//! End-to-end scans over fixed label texts, extraction failures and the JSON
//! document produced for each scan.

#[cfg(test)]
mod tests {
    use ingredient_checker::config::EngineConfig;
    use ingredient_checker::dictionaries::DictionarySet;
    use ingredient_checker::ocr::TextExtractor;
    use ingredient_checker::ocr_errors::OcrError;
    use ingredient_checker::quality::{Confidence, TextQuality};
    use ingredient_checker::rating::Verdict;
    use ingredient_checker::scanner::{IngredientScanner, ScanResult, MAX_DOCUMENT_TEXT_CHARS};
    use ingredient_checker::synthetic::SyntheticExtractor;
    use std::path::Path;
    use std::sync::Arc;

    /// Returns the same text for every image
    struct StaticText(String);

    impl TextExtractor for StaticText {
        fn name(&self) -> &'static str {
            "static"
        }

        fn extract_text(&self, _image_path: &Path) -> Result<String, OcrError> {
            Ok(self.0.clone())
        }
    }

    /// Fails every extraction like a broken OCR backend
    struct BrokenBackend;

    impl TextExtractor for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn extract_text(&self, _image_path: &Path) -> Result<String, OcrError> {
            Err(OcrError::Extraction("engine crashed".to_string()))
        }
    }

    fn scanner_with(extractor: Box<dyn TextExtractor>) -> IngredientScanner {
        IngredientScanner::new(EngineConfig::default(), extractor).unwrap()
    }

    fn scan_label(text: &str) -> ScanResult {
        scanner_with(Box::new(StaticText(text.to_string()))).scan(Path::new("label.jpg"))
    }

    #[test]
    fn test_hydrogenated_oil_label_is_danger() {
        let result = scan_label("water, corn syrup, partially hydrogenated soybean oil, salt");

        assert_eq!(result.rating, Verdict::Danger);
        assert!(result
            .matches
            .trans_fat
            .contains("partially hydrogenated soybean oil"));
        assert!(result.matches.corn.contains("corn syrup"));
        assert!(result.matches.safe_ingredients.contains("water"));
        assert_eq!(result.extractor, "static");
    }

    #[test]
    fn test_whole_food_label_is_safe() {
        let result = scan_label("organic wheat flour, water, sea salt, yeast, olive oil");

        assert_eq!(result.rating, Verdict::Safe);
        assert_eq!(result.quality, TextQuality::Good);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.risk_score, 0);
        assert!(result.matches.trans_fat.is_empty());
        assert!(result.matches.sugar.is_empty());
        assert!(result.matches.safe_ingredients.contains("olive oil"));
    }

    #[test]
    fn test_empty_label_is_try_again() {
        let result = scan_label("");

        assert_eq!(result.rating, Verdict::TryAgain);
        assert_eq!(result.quality, TextQuality::VeryPoor);
        assert_eq!(result.confidence, Confidence::VeryLow);
        assert!(result.matches.all_detected.is_empty());
    }

    #[test]
    fn test_hfcs_label_is_danger() {
        let result =
            scan_label("water, sugar, high fructose corn syrup, citric acid, natural flavors");

        assert_eq!(result.rating, Verdict::Danger);
        assert!(result.matches.gmo.contains("high fructose corn syrup"));
        assert!(result
            .danger_terms
            .contains(&"high fructose corn syrup".to_string()));
        assert!(result.matches.sugar.contains("sugar"));
        assert!(result.matches.excitotoxins.contains("natural flavors"));
    }

    #[test]
    fn test_extraction_failure_returns_default_result() {
        let result = scanner_with(Box::new(BrokenBackend)).scan(Path::new("label.png"));

        assert_eq!(result.rating, Verdict::TryAgain);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.quality, TextQuality::Poor);
        assert_eq!(result.extractor, "broken");

        let safe: Vec<&str> = result
            .matches
            .safe_ingredients
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(safe, vec!["salt", "water"]);
        assert_eq!(result.matches.all_detected, result.matches.safe_ingredients);
        assert!(result.matches.trans_fat.is_empty());
    }

    #[test]
    fn test_invalid_configuration_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.scoring.caution_threshold = 20;

        let result = IngredientScanner::new(config, Box::new(BrokenBackend));
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_text_matches_scan() {
        let label = "water, sugar, cocoa, soy lecithin, vanilla";
        let scanner = scanner_with(Box::new(StaticText(label.to_string())));

        let from_image = scanner.scan(Path::new("label.png"));
        let from_text = scanner.scan_text(label);
        assert_eq!(from_image.rating, from_text.rating);
        assert_eq!(from_image.matches, from_text.matches);
        assert_eq!(from_text.extractor, "text");
    }

    #[test]
    fn test_document_serialization() {
        let result = scan_label("water, sugar, high fructose corn syrup, citric acid, natural flavors");
        let document = serde_json::to_value(result.to_document()).unwrap();

        assert_eq!(document["rating"], "DANGER");
        assert_eq!(document["quality"], "good");
        assert_eq!(document["confidence"], "high");
        assert_eq!(document["extractor"], "static");
        assert_eq!(document["gmo"][0], "high fructose corn syrup");
        assert!(document["all_detected"].as_array().unwrap().len() >= 5);
    }

    #[test]
    fn test_document_truncates_long_text() {
        let label = "water, salt, ".repeat(40);
        let result = scan_label(&label);
        let document = result.to_document();

        assert_eq!(result.extracted_text_length, label.chars().count());
        assert_eq!(document.extracted_text_length, label.chars().count());
        assert!(document.extracted_text.ends_with("..."));
        assert_eq!(
            document.extracted_text.chars().count(),
            MAX_DOCUMENT_TEXT_CHARS + 3
        );

        let short = scan_label("water, salt").to_document();
        assert_eq!(short.extracted_text, "water, salt");
    }

    #[test]
    fn test_scanner_shared_across_threads() {
        let dictionaries = DictionarySet::default();
        let scanner = Arc::new(scanner_with(Box::new(SyntheticExtractor::with_seed(
            &dictionaries,
            11,
        ))));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let scanner = Arc::clone(&scanner);
                std::thread::spawn(move || scanner.scan(Path::new(&format!("label-{i}.png"))))
            })
            .collect();

        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.extractor, "synthetic");
            assert_ne!(result.quality, TextQuality::VeryPoor);
            assert!(!result.matches.all_detected.is_empty());
        }
    }
}
