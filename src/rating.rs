//! # Rating Engine Module
//!
//! Reduces categorized matches to a single [`Verdict`] with an ordered rule
//! table. Rules are evaluated by ascending priority and the first rule whose
//! predicate holds decides the verdict.
//!
//! ## Default rule table
//!
//! | priority | predicate                        | verdict     |
//! |----------|----------------------------------|-------------|
//! | 1        | text quality is very poor        | `TRY_AGAIN` |
//! | 2        | any top-tier danger term matched | `DANGER`    |
//! | 3        | score >= danger threshold        | `DANGER`    |
//! | 4        | score >= caution threshold       | `CAUTION`   |
//! | 5        | any ingredient detected          | `SAFE`      |
//! | 6        | always                           | `TRY_AGAIN` |
//!
//! The score is the weighted sum of match counts per category, see
//! [`ScoringWeights`](crate::config::ScoringWeights). Risk tiers do not
//! change the score; a flat count of moderate or low hits is never a separate
//! danger path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::dictionaries::Category;
use crate::errors::ScanError;
use crate::matcher::CategoryMatches;
use crate::quality::TextQuality;

/// Human-facing safety rating of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    TryAgain,
    Danger,
    Caution,
    Safe,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::TryAgain => "TRY_AGAIN",
            Verdict::Danger => "DANGER",
            Verdict::Caution => "CAUTION",
            Verdict::Safe => "SAFE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Condition checked by a rating rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RulePredicate {
    VeryPoorQuality,
    TopTierDanger,
    ScoreAtLeast(u32),
    AnyDetected,
    Always,
}

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRule {
    pub priority: u32,
    pub predicate: RulePredicate,
    pub verdict: Verdict,
}

impl RatingRule {
    pub fn new(priority: u32, predicate: RulePredicate, verdict: Verdict) -> Self {
        Self {
            priority,
            predicate,
            verdict,
        }
    }
}

/// Rule table derived from the scoring thresholds
pub fn default_rules(scoring: &ScoringConfig) -> Vec<RatingRule> {
    vec![
        RatingRule::new(1, RulePredicate::VeryPoorQuality, Verdict::TryAgain),
        RatingRule::new(2, RulePredicate::TopTierDanger, Verdict::Danger),
        RatingRule::new(
            3,
            RulePredicate::ScoreAtLeast(scoring.danger_threshold),
            Verdict::Danger,
        ),
        RatingRule::new(
            4,
            RulePredicate::ScoreAtLeast(scoring.caution_threshold),
            Verdict::Caution,
        ),
        RatingRule::new(5, RulePredicate::AnyDetected, Verdict::Safe),
        RatingRule::new(6, RulePredicate::Always, Verdict::TryAgain),
    ]
}

/// Verdict together with the facts that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOutcome {
    pub verdict: Verdict,
    pub score: u32,
    pub danger_terms: BTreeSet<String>,
    /// Priority of the rule that decided the verdict
    pub rule_priority: u32,
}

/// Applies the rule table to match sets
#[derive(Debug, Clone)]
pub struct RatingEngine {
    scoring: ScoringConfig,
    rules: Vec<RatingRule>,
}

impl RatingEngine {
    /// Create an engine from scoring configuration
    ///
    /// Uses `scoring.rules` when present, the default table otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::config::ScoringConfig;
    /// use ingredient_checker::dictionaries::Category;
    /// use ingredient_checker::matcher::CategoryMatches;
    /// use ingredient_checker::quality::TextQuality;
    /// use ingredient_checker::rating::{RatingEngine, Verdict};
    ///
    /// let engine = RatingEngine::new(ScoringConfig::default())?;
    /// let matches = CategoryMatches::default().with(Category::Sugar, &["sugar"]);
    ///
    /// assert_eq!(engine.rate(&matches, TextQuality::Good)?, Verdict::Caution);
    /// # Ok::<(), ingredient_checker::errors::ScanError>(())
    /// ```
    pub fn new(scoring: ScoringConfig) -> Result<Self, ScanError> {
        scoring.validate()?;
        let mut rules = scoring
            .rules
            .clone()
            .unwrap_or_else(|| default_rules(&scoring));
        rules.sort_by_key(|rule| rule.priority);

        debug!(rules = rules.len(), "Created RatingEngine");
        Ok(Self { scoring, rules })
    }

    pub fn rules(&self) -> &[RatingRule] {
        &self.rules
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Matched terms that force a danger verdict on their own
    pub fn top_tier_hits(&self, matches: &CategoryMatches) -> BTreeSet<String> {
        let trans_fat = matches
            .trans_fat
            .iter()
            .filter(|term| self.scoring.trans_fat_top5.contains(*term));
        let excitotoxins = matches
            .excitotoxins
            .iter()
            .filter(|term| self.scoring.excitotoxin_top5.contains(*term));
        let gmo = matches.gmo.iter().filter(|term| {
            self.scoring
                .gmo_danger_markers
                .iter()
                .any(|marker| term.contains(marker.as_str()))
        });

        trans_fat.chain(excitotoxins).chain(gmo).cloned().collect()
    }

    /// Weighted sum of match counts. Overflow is a scoring failure.
    pub fn score(&self, matches: &CategoryMatches) -> Result<u32, ScanError> {
        let weights = &self.scoring.weights;
        [
            (Category::TransFat, weights.trans_fat),
            (Category::Excitotoxin, weights.excitotoxin),
            (Category::Corn, weights.corn),
            (Category::Sugar, weights.sugar),
            (Category::Gmo, weights.gmo),
        ]
        .into_iter()
        .try_fold(0u32, |total, (category, weight)| {
            u32::try_from(matches.get(category).len())
                .ok()
                .and_then(|count| count.checked_mul(weight))
                .and_then(|weighted| total.checked_add(weighted))
                .ok_or_else(|| ScanError::Scoring(format!("{category} score overflowed")))
        })
    }

    /// Rate a match set
    pub fn rate(&self, matches: &CategoryMatches, quality: TextQuality) -> Result<Verdict, ScanError> {
        self.evaluate(matches, quality).map(|outcome| outcome.verdict)
    }

    /// Rate a match set and report score, danger terms and the deciding rule
    pub fn evaluate(
        &self,
        matches: &CategoryMatches,
        quality: TextQuality,
    ) -> Result<RatingOutcome, ScanError> {
        let score = self.score(matches)?;
        let danger_terms = self.top_tier_hits(matches);

        let rule = self
            .rules
            .iter()
            .find(|rule| match &rule.predicate {
                RulePredicate::VeryPoorQuality => quality == TextQuality::VeryPoor,
                RulePredicate::TopTierDanger => !danger_terms.is_empty(),
                RulePredicate::ScoreAtLeast(threshold) => score >= *threshold,
                RulePredicate::AnyDetected => !matches.all_detected.is_empty(),
                RulePredicate::Always => true,
            })
            .ok_or_else(|| {
                ScanError::Scoring(format!(
                    "no rating rule applies (score {score}, quality {quality})"
                ))
            })?;

        info!(
            verdict = %rule.verdict,
            score,
            danger_terms = danger_terms.len(),
            rule = rule.priority,
            quality = %quality,
            "Rated ingredient matches"
        );

        Ok(RatingOutcome {
            verdict: rule.verdict,
            score,
            danger_terms,
            rule_priority: rule.priority,
        })
    }
}
