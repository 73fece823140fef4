//! # Ingredient Matcher Module
//!
//! Finds dictionary terms in normalized label text.
//!
//! A term is present when any of the following holds:
//!
//! - the normalized term occurs as a whole word (not adjacent to another
//!   alphanumeric character)
//! - any member of a synonym group containing the term occurs as a whole word
//! - the term falls under a partial-match rule and one of the rule's fragments
//!   occurs anywhere in the text
//!
//! Partial-match rules exist for compounds that OCR frequently truncates, such
//! as "partially hydrogenated ..." or "high fructose corn syrup".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::dictionaries::{validate_term, Category, DictionarySet};
use crate::errors::ScanError;
use crate::text_processing::TextNormalizer;

/// Substring-level matching for terms starting with `term_prefix`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialMatchRule {
    /// Candidate terms starting with this prefix use fragment matching
    pub term_prefix: String,
    /// Any of these substrings marks the term as present
    pub fragments: Vec<String>,
}

impl PartialMatchRule {
    pub fn new(term_prefix: &str, fragments: &[&str]) -> Self {
        Self {
            term_prefix: term_prefix.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Built-in partial-match rules
pub fn default_partial_rules() -> Vec<PartialMatchRule> {
    vec![
        PartialMatchRule::new("partially hydrogenated", &["partial", "hydrogenated"]),
        PartialMatchRule::new("monosodium glutamate", &["monosodium", "glutamate", "msg"]),
        PartialMatchRule::new(
            "high fructose corn syrup",
            &["high fructose", "corn syrup", "hfcs"],
        ),
        PartialMatchRule::new("natural flavor", &["natural", "flavor"]),
    ]
}

/// Matched terms per category
///
/// `all_detected` is the union of the six rated categories and is kept in
/// sync by [`CategoryMatches::insert`]. `chemical_additives` is informational
/// and stays out of `all_detected`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatches {
    pub trans_fat: BTreeSet<String>,
    pub excitotoxins: BTreeSet<String>,
    pub corn: BTreeSet<String>,
    pub sugar: BTreeSet<String>,
    pub gmo: BTreeSet<String>,
    pub safe_ingredients: BTreeSet<String>,
    pub chemical_additives: BTreeSet<String>,
    pub all_detected: BTreeSet<String>,
}

impl CategoryMatches {
    /// Record a matched term under `category`
    pub fn insert(&mut self, category: Category, term: impl Into<String>) {
        let term = term.into();
        if Category::RATED.contains(&category) {
            self.all_detected.insert(term.clone());
        }
        self.category_mut(category).insert(term);
    }

    /// Builder form of [`CategoryMatches::insert`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::dictionaries::Category;
    /// use ingredient_checker::matcher::CategoryMatches;
    ///
    /// let matches = CategoryMatches::default()
    ///     .with(Category::Sugar, &["sugar", "dextrose"])
    ///     .with(Category::Safe, &["water"]);
    ///
    /// assert_eq!(matches.all_detected.len(), 3);
    /// ```
    pub fn with(mut self, category: Category, terms: &[&str]) -> Self {
        for term in terms {
            self.insert(category, *term);
        }
        self
    }

    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::TransFat => &self.trans_fat,
            Category::Excitotoxin => &self.excitotoxins,
            Category::Corn => &self.corn,
            Category::Sugar => &self.sugar,
            Category::Gmo => &self.gmo,
            Category::Chemstuffs => &self.chemical_additives,
            Category::Safe => &self.safe_ingredients,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::TransFat => &mut self.trans_fat,
            Category::Excitotoxin => &mut self.excitotoxins,
            Category::Corn => &mut self.corn,
            Category::Sugar => &mut self.sugar,
            Category::Gmo => &mut self.gmo,
            Category::Chemstuffs => &mut self.chemical_additives,
            Category::Safe => &mut self.safe_ingredients,
        }
    }

    /// Match set reported when a scan fails
    pub fn fallback() -> Self {
        Self::default().with(Category::Safe, &["water", "salt"])
    }

    pub fn is_empty(&self) -> bool {
        self.all_detected.is_empty()
    }
}

/// Dictionary term with its normalized form
#[derive(Debug, Clone)]
struct CandidateTerm {
    term: String,
    normalized: String,
}

/// Matches normalized text against the category dictionaries
#[derive(Debug, Clone)]
pub struct IngredientMatcher {
    normalizer: TextNormalizer,
    synonym_groups: Vec<Vec<String>>,
    group_index: HashMap<String, Vec<usize>>,
    partial_rules: Vec<PartialMatchRule>,
    candidates: HashMap<Category, Vec<CandidateTerm>>,
}

impl IngredientMatcher {
    /// Build a matcher from an engine configuration
    ///
    /// Dictionaries, synonyms, corrections and partial rules are validated and
    /// pre-normalized once; malformed data is a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_checker::config::EngineConfig;
    /// use ingredient_checker::matcher::IngredientMatcher;
    ///
    /// let matcher = IngredientMatcher::from_config(&EngineConfig::default())?;
    /// let matches = matcher.match_categories("Water, Sugar, Yeast Extract");
    ///
    /// assert!(matches.sugar.contains("sugar"));
    /// assert!(matches.excitotoxins.contains("yeast extract"));
    /// assert!(matches.safe_ingredients.contains("water"));
    /// # Ok::<(), ingredient_checker::errors::ScanError>(())
    /// ```
    pub fn from_config(config: &EngineConfig) -> Result<Self, ScanError> {
        config.dictionaries.validate()?;
        let normalizer = TextNormalizer::with_corrections(config.ocr_corrections.clone())?;

        let (synonym_groups, group_index) = build_synonym_groups(&normalizer, &config.synonyms)?;
        let partial_rules = normalize_partial_rules(&normalizer, &config.partial_matches)?;
        let candidates = build_candidates(&normalizer, &config.dictionaries);

        info!(
            synonym_groups = synonym_groups.len(),
            partial_rules = partial_rules.len(),
            "Created IngredientMatcher"
        );

        Ok(Self {
            normalizer,
            synonym_groups,
            group_index,
            partial_rules,
            candidates,
        })
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Return the subset of `terms` present in `text`
    ///
    /// The text is normalized first; passing already normalized text is fine.
    pub fn match_terms<'a, I>(&self, text: &str, terms: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized_text = self.normalizer.normalize(text);
        terms
            .into_iter()
            .filter(|term| {
                let normalized_term = self.normalizer.normalize(term);
                self.is_present(&normalized_text, &normalized_term)
            })
            .map(str::to_string)
            .collect()
    }

    /// Match every category against `text`
    ///
    /// Safe matches that are also trans fat or excitotoxin matches are dropped
    /// from the safe set.
    pub fn match_categories(&self, text: &str) -> CategoryMatches {
        let normalized_text = self.normalizer.normalize(text);
        debug!(
            text_length = normalized_text.len(),
            "Matching normalized text against ingredient dictionaries"
        );

        let mut matched: BTreeMap<Category, BTreeSet<String>> = Category::ALL
            .into_iter()
            .map(|category| (category, self.match_category(&normalized_text, category)))
            .collect();

        let risky: BTreeSet<String> = [Category::TransFat, Category::Excitotoxin]
            .iter()
            .filter_map(|category| matched.get(category))
            .flatten()
            .cloned()
            .collect();
        if let Some(safe) = matched.get_mut(&Category::Safe) {
            safe.retain(|term| !risky.contains(term));
        }

        let mut matches = CategoryMatches::default();
        for (category, terms) in matched {
            for term in terms {
                matches.insert(category, term);
            }
        }

        info!(
            detected = matches.all_detected.len(),
            trans_fat = matches.trans_fat.len(),
            excitotoxins = matches.excitotoxins.len(),
            corn = matches.corn.len(),
            sugar = matches.sugar.len(),
            gmo = matches.gmo.len(),
            safe = matches.safe_ingredients.len(),
            "Ingredient matching completed"
        );
        matches
    }

    fn match_category(&self, normalized_text: &str, category: Category) -> BTreeSet<String> {
        self.candidates
            .get(&category)
            .into_iter()
            .flatten()
            .filter(|candidate| self.is_present(normalized_text, &candidate.normalized))
            .map(|candidate| candidate.term.clone())
            .collect()
    }

    fn is_present(&self, normalized_text: &str, normalized_term: &str) -> bool {
        if normalized_term.is_empty() || normalized_text.is_empty() {
            return false;
        }

        if contains_whole_word(normalized_text, normalized_term) {
            trace!("Whole-word match for '{}'", normalized_term);
            return true;
        }

        let synonym_hit = self
            .group_index
            .get(normalized_term)
            .into_iter()
            .flatten()
            .flat_map(|group| &self.synonym_groups[*group])
            .find(|form| contains_whole_word(normalized_text, form));
        if let Some(form) = synonym_hit {
            trace!("Synonym '{}' matched term '{}'", form, normalized_term);
            return true;
        }

        let partial_hit = self
            .partial_rules
            .iter()
            .filter(|rule| normalized_term.starts_with(rule.term_prefix.as_str()))
            .flat_map(|rule| &rule.fragments)
            .find(|fragment| normalized_text.contains(fragment.as_str()));
        if let Some(fragment) = partial_hit {
            trace!("Fragment '{}' matched term '{}'", fragment, normalized_term);
            return true;
        }

        false
    }
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
            .expect("Built-in ingredient configuration should be valid")
    }
}

/// Whether `needle` occurs in `haystack` without alphanumeric neighbours
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();

        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric) {
            return true;
        }

        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

fn build_synonym_groups(
    normalizer: &TextNormalizer,
    synonyms: &BTreeMap<String, Vec<String>>,
) -> Result<(Vec<Vec<String>>, HashMap<String, Vec<usize>>), ScanError> {
    let mut groups = Vec::with_capacity(synonyms.len());
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();

    for (canonical, forms) in synonyms {
        let mut group = Vec::with_capacity(forms.len() + 1);
        for form in std::iter::once(canonical).chain(forms) {
            validate_term(form).map_err(|reason| {
                ScanError::Configuration(format!("synonym {form:?} of {canonical:?} {reason}"))
            })?;
            let normalized = normalizer.normalize(form);
            if !group.contains(&normalized) {
                group.push(normalized);
            }
        }

        let group_id = groups.len();
        for form in &group {
            index.entry(form.clone()).or_default().push(group_id);
        }
        groups.push(group);
    }

    Ok((groups, index))
}

fn normalize_partial_rules(
    normalizer: &TextNormalizer,
    rules: &[PartialMatchRule],
) -> Result<Vec<PartialMatchRule>, ScanError> {
    rules
        .iter()
        .map(|rule| {
            let term_prefix = normalizer.normalize(&rule.term_prefix);
            let fragments: Vec<String> = rule
                .fragments
                .iter()
                .map(|fragment| normalizer.normalize(fragment))
                .filter(|fragment| !fragment.is_empty())
                .collect();

            if term_prefix.is_empty() || fragments.is_empty() {
                return Err(ScanError::Configuration(format!(
                    "partial match rule {:?} needs a prefix and at least one fragment",
                    rule.term_prefix
                )));
            }
            Ok(PartialMatchRule {
                term_prefix,
                fragments,
            })
        })
        .collect()
}

fn build_candidates(
    normalizer: &TextNormalizer,
    dictionaries: &DictionarySet,
) -> HashMap<Category, Vec<CandidateTerm>> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let terms = dictionaries
                .candidate_terms(category)
                .into_iter()
                .map(|term| CandidateTerm {
                    normalized: normalizer.normalize(&term),
                    term,
                })
                .collect();
            (category, terms)
        })
        .collect()
}
