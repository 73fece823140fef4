//! # Rating Tests Module
//!
//! Rule table behaviour across thresholds, text quality and custom tables.

#[cfg(test)]
mod tests {
    use ingredient_checker::config::ScoringConfig;
    use ingredient_checker::dictionaries::{Category, EXCITOTOXIN_TOP5_DANGER, TRANS_FAT_TOP5_DANGER};
    use ingredient_checker::errors::ScanError;
    use ingredient_checker::matcher::CategoryMatches;
    use ingredient_checker::quality::TextQuality;
    use ingredient_checker::rating::{RatingEngine, RatingRule, RulePredicate, Verdict};

    const RATED_QUALITIES: [TextQuality; 3] =
        [TextQuality::Poor, TextQuality::Medium, TextQuality::Good];

    fn lenient_engine() -> RatingEngine {
        RatingEngine::new(ScoringConfig {
            danger_threshold: 1_000,
            caution_threshold: 999,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_trans_fat_top5_alone_is_danger_regardless_of_thresholds() {
        let engine = lenient_engine();

        for term in TRANS_FAT_TOP5_DANGER {
            let matches = CategoryMatches::default().with(Category::TransFat, &[*term]);
            for quality in RATED_QUALITIES {
                let outcome = engine.evaluate(&matches, quality).unwrap();
                assert_eq!(outcome.verdict, Verdict::Danger, "term {term} at {quality}");
                assert_eq!(outcome.score, 3);
                assert!(outcome.danger_terms.contains(*term));
            }
        }
    }

    #[test]
    fn test_excitotoxin_top5_alone_is_danger() {
        let engine = lenient_engine();

        for term in EXCITOTOXIN_TOP5_DANGER {
            let matches = CategoryMatches::default().with(Category::Excitotoxin, &[*term]);
            assert_eq!(engine.rate(&matches, TextQuality::Good).unwrap(), Verdict::Danger);
        }
    }

    #[test]
    fn test_gmo_marker_is_danger() {
        let engine = lenient_engine();

        let matches = CategoryMatches::default().with(Category::Gmo, &["genetically modified"]);
        assert_eq!(engine.rate(&matches, TextQuality::Medium).unwrap(), Verdict::Danger);

        let matches = CategoryMatches::default().with(Category::Gmo, &["soy lecithin"]);
        assert_eq!(engine.rate(&matches, TextQuality::Medium).unwrap(), Verdict::Safe);
    }

    #[test]
    fn test_very_poor_quality_forces_try_again() {
        let engine = RatingEngine::new(ScoringConfig::default()).unwrap();
        let matches = CategoryMatches::default()
            .with(Category::TransFat, &["shortening", "partially hydrogenated oil"])
            .with(Category::Excitotoxin, &["msg"])
            .with(Category::Sugar, &["sugar", "dextrose"]);

        let outcome = engine.evaluate(&matches, TextQuality::VeryPoor).unwrap();
        assert_eq!(outcome.verdict, Verdict::TryAgain);
        assert_eq!(outcome.rule_priority, 1);
    }

    #[test]
    fn test_poor_quality_is_still_rated() {
        let engine = RatingEngine::new(ScoringConfig::default()).unwrap();
        let matches = CategoryMatches::default().with(Category::Sugar, &["sugar"]);

        assert_eq!(engine.rate(&matches, TextQuality::Poor).unwrap(), Verdict::Caution);
    }

    #[test]
    fn test_threshold_boundaries() {
        let engine = RatingEngine::new(ScoringConfig::default()).unwrap();

        // 2 + 2 + 2 + 1 = 7, one below the danger threshold
        let below = CategoryMatches::default()
            .with(Category::Corn, &["dextrose", "corn"])
            .with(Category::Gmo, &["soy"])
            .with(Category::Sugar, &["honey"]);
        assert_eq!(engine.score(&below).unwrap(), 7);
        assert_eq!(engine.rate(&below, TextQuality::Good).unwrap(), Verdict::Caution);

        let at = below.clone().with(Category::Sugar, &["molasses"]);
        assert_eq!(engine.score(&at).unwrap(), 8);
        assert_eq!(engine.rate(&at, TextQuality::Good).unwrap(), Verdict::Danger);
    }

    #[test]
    fn test_safe_only_and_empty_matches() {
        let engine = RatingEngine::new(ScoringConfig::default()).unwrap();

        let safe = CategoryMatches::default().with(Category::Safe, &["water", "olive oil"]);
        let outcome = engine.evaluate(&safe, TextQuality::Good).unwrap();
        assert_eq!(outcome.verdict, Verdict::Safe);
        assert_eq!(outcome.score, 0);
        assert!(outcome.danger_terms.is_empty());

        let empty = CategoryMatches::default();
        assert_eq!(engine.rate(&empty, TextQuality::Good).unwrap(), Verdict::TryAgain);
    }

    #[test]
    fn test_rate_is_pure() {
        let engine = RatingEngine::new(ScoringConfig::default()).unwrap();
        let matches = CategoryMatches::default()
            .with(Category::Corn, &["citric acid"])
            .with(Category::Safe, &["water"]);

        let first = engine.evaluate(&matches, TextQuality::Medium).unwrap();
        for _ in 0..3 {
            assert_eq!(engine.evaluate(&matches.clone(), TextQuality::Medium).unwrap(), first);
        }
    }

    #[test]
    fn test_custom_rule_table() {
        let scoring = ScoringConfig {
            rules: Some(vec![
                RatingRule::new(10, RulePredicate::VeryPoorQuality, Verdict::TryAgain),
                RatingRule::new(20, RulePredicate::ScoreAtLeast(1), Verdict::Danger),
                RatingRule::new(30, RulePredicate::Always, Verdict::Safe),
            ]),
            ..Default::default()
        };
        let engine = RatingEngine::new(scoring).unwrap();

        let sugar = CategoryMatches::default().with(Category::Sugar, &["sugar"]);
        assert_eq!(engine.rate(&sugar, TextQuality::Good).unwrap(), Verdict::Danger);
        assert_eq!(
            engine.rate(&CategoryMatches::default(), TextQuality::Good).unwrap(),
            Verdict::Safe
        );
    }

    #[test]
    fn test_empty_rule_table_rejected() {
        let scoring = ScoringConfig {
            rules: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(
            RatingEngine::new(scoring),
            Err(ScanError::Configuration(_))
        ));
    }
}
