//! # Matching Tests Module
//!
//! Normalizer and matcher behaviour over realistic label text, including OCR
//! misreads, synonyms, truncated compounds and dictionary growth.

#[cfg(test)]
mod tests {
    use ingredient_checker::config::EngineConfig;
    use ingredient_checker::dictionaries::{Category, RiskTier};
    use ingredient_checker::matcher::{contains_whole_word, IngredientMatcher};
    use ingredient_checker::text_processing::TextNormalizer;

    fn create_matcher() -> IngredientMatcher {
        IngredientMatcher::from_config(&EngineConfig::default()).unwrap()
    }

    const LABELS: &[&str] = &[
        "",
        "   ",
        "INGRED1ENTS: Water, Partially Hydrogenaled Soybean 0il, Salt.",
        "Sugar; C0RN SYROP (45%), natural flavors & colours*",
        "organic wheat flour, water, sea salt, yeast, olive oil",
        "Contains: monosodlum glutamale [E621], aspartarne!!",
        "eau, sel, huile d'olive, farine de blé",
    ];

    #[test]
    fn test_normalizer_is_idempotent() {
        let normalizer = TextNormalizer::new();

        for label in LABELS {
            let once = normalizer.normalize(label);
            assert_eq!(normalizer.normalize(&once), once, "label: {label:?}");
        }
    }

    #[test]
    fn test_normalizer_repairs_ocr_misreads() {
        let normalizer = TextNormalizer::new();
        let normalized =
            normalizer.normalize("INGRED1ENTS: Water, Partially Hydrogenaled Soybean 0il, Salt.");

        assert_eq!(
            normalized,
            "ingredients water, partially hydrogenated soybean oil, salt."
        );
    }

    #[test]
    fn test_misread_label_still_matches() {
        let matches = create_matcher()
            .match_categories("INGRED1ENTS: Water, Partially Hydrogenaled Soybean 0il, Salt.");

        assert!(matches.trans_fat.contains("partially hydrogenated soybean oil"));
        assert!(matches.gmo.contains("soybean oil"));
        assert!(matches.safe_ingredients.contains("water"));
        assert!(matches.safe_ingredients.contains("salt"));
    }

    #[test]
    fn test_synonyms_imply_canonical_terms() {
        let matches = create_matcher().match_categories("Contains: E621 and HFCS");

        assert!(matches.excitotoxins.contains("monosodium glutamate"));
        assert!(matches.excitotoxins.contains("msg"));
        assert!(matches.gmo.contains("high fructose corn syrup"));
        assert!(matches.sugar.contains("high fructose corn syrup"));
    }

    #[test]
    fn test_whole_word_matching() {
        let matches = create_matcher().match_categories("cornstarch, saltines");

        assert!(matches.corn.contains("cornstarch"));
        assert!(!matches.corn.contains("corn"));
        assert!(!matches.safe_ingredients.contains("salt"));

        assert!(contains_whole_word("water, salt", "salt"));
        assert!(!contains_whole_word("unsalted butter", "salt"));
        assert!(contains_whole_word("sea salt", "sea salt"));
    }

    #[test]
    fn test_match_terms_subset() {
        let matcher = create_matcher();
        let found = matcher.match_terms(
            "Water, Sugar, Cocoa Butter",
            ["sugar", "cocoa", "milk", "butter"],
        );

        let found: Vec<&str> = found.iter().map(String::as_str).collect();
        assert_eq!(found, vec!["butter", "cocoa", "sugar"]);
    }

    #[test]
    fn test_all_detected_is_union_of_rated_categories() {
        let matcher = create_matcher();

        for label in LABELS {
            let matches = matcher.match_categories(label);
            let union: std::collections::BTreeSet<String> = Category::RATED
                .into_iter()
                .flat_map(|category| matches.get(category).clone())
                .collect();

            assert_eq!(matches.all_detected, union, "label: {label:?}");
        }
    }

    #[test]
    fn test_matcher_is_monotone_over_dictionary_supersets() {
        let base_config = EngineConfig::default();
        let mut extended_config = base_config.clone();
        extended_config
            .dictionaries
            .sugar
            .moderate_risk
            .insert("coconut nectar".to_string());
        extended_config
            .dictionaries
            .safe
            .safe
            .insert("spirulina".to_string());

        let base = IngredientMatcher::from_config(&base_config).unwrap();
        let extended = IngredientMatcher::from_config(&extended_config).unwrap();

        let label = "water, coconut nectar, spirulina, sugar, salt";
        let before = base.match_categories(label);
        let after = extended.match_categories(label);

        for category in Category::ALL {
            assert!(
                before.get(category).is_subset(after.get(category)),
                "category {category} shrank"
            );
        }
        assert!(after.sugar.contains("coconut nectar"));
        assert!(after.safe_ingredients.contains("spirulina"));
        assert!(!before.safe_ingredients.contains("spirulina"));
    }

    #[test]
    fn test_safe_matches_include_other_categories_safe_tiers() {
        let config = EngineConfig::default();
        assert_eq!(
            config.dictionaries.gmo.tier_of("usda organic"),
            Some(RiskTier::Safe)
        );

        let matches = create_matcher().match_categories("USDA Organic oats, stevia");
        assert!(matches.safe_ingredients.contains("usda organic"));
        assert!(matches.safe_ingredients.contains("stevia"));
        assert!(matches.gmo.is_empty());
        assert!(matches.sugar.is_empty());
    }

    #[test]
    fn test_chemical_additives_are_informational() {
        let matches = create_matcher().match_categories("water, sodium benzoate, red 40");

        assert!(matches.chemical_additives.contains("sodium benzoate"));
        assert!(matches.chemical_additives.contains("red 40"));
        assert!(!matches.all_detected.contains("sodium benzoate"));
    }
}
