//! # Ingredient Dictionaries Module
//!
//! Curated ingredient keyword lists grouped by category and risk tier, plus the
//! synonym table, the OCR correction table and the top-tier danger subsets used
//! by the rating engine.
//!
//! ## Categories
//!
//! - **trans_fat**: hydrogenated oils and shortenings
//! - **excitotoxin**: glutamates, hydrolyzed proteins, aspartame and friends
//! - **corn**: corn-derived sweeteners, starches and acids
//! - **sugar**: added sugars and syrups
//! - **gmo**: ingredients commonly sourced from genetically modified crops
//! - **chemstuffs**: synthetic preservatives, dyes and processing aids
//! - **safe**: whole-food ingredients
//!
//! Every category is split into `high_risk`, `moderate_risk`, `low_risk` and
//! `safe` tiers. A term may appear in several categories, but never in both a
//! risk tier and the safe tier of the same category.
//!
//! The tiers are descriptive: the rating engine scores categories by how many
//! of their terms matched, and only the top-tier danger subsets below trigger
//! an immediate danger verdict.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::ScanError;

/// Ingredient category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TransFat,
    Excitotoxin,
    Corn,
    Sugar,
    Gmo,
    Chemstuffs,
    Safe,
}

impl Category {
    /// The six categories that feed `all_detected` and the verdict
    pub const RATED: [Category; 6] = [
        Category::TransFat,
        Category::Excitotoxin,
        Category::Corn,
        Category::Sugar,
        Category::Gmo,
        Category::Safe,
    ];

    pub const ALL: [Category; 7] = [
        Category::TransFat,
        Category::Excitotoxin,
        Category::Corn,
        Category::Sugar,
        Category::Gmo,
        Category::Chemstuffs,
        Category::Safe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TransFat => "trans_fat",
            Category::Excitotoxin => "excitotoxin",
            Category::Corn => "corn",
            Category::Sugar => "sugar",
            Category::Gmo => "gmo",
            Category::Chemstuffs => "chemstuffs",
            Category::Safe => "safe",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    HighRisk,
    ModerateRisk,
    LowRisk,
    Safe,
}

/// Terms of one category, split by risk tier
///
/// A tier missing from JSON is empty, not the built-in tier: overriding a
/// category in a configuration file replaces all four of its tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngredientDictionary {
    pub high_risk: BTreeSet<String>,
    pub moderate_risk: BTreeSet<String>,
    pub low_risk: BTreeSet<String>,
    pub safe: BTreeSet<String>,
}

impl IngredientDictionary {
    /// Build a dictionary from static term slices
    pub fn from_tiers(high: &[&str], moderate: &[&str], low: &[&str], safe: &[&str]) -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect();
        Self {
            high_risk: owned(high),
            moderate_risk: owned(moderate),
            low_risk: owned(low),
            safe: owned(safe),
        }
    }

    pub fn tier(&self, tier: RiskTier) -> &BTreeSet<String> {
        match tier {
            RiskTier::HighRisk => &self.high_risk,
            RiskTier::ModerateRisk => &self.moderate_risk,
            RiskTier::LowRisk => &self.low_risk,
            RiskTier::Safe => &self.safe,
        }
    }

    /// Union of the high, moderate and low risk tiers
    pub fn risk_terms(&self) -> BTreeSet<String> {
        self.high_risk
            .iter()
            .chain(&self.moderate_risk)
            .chain(&self.low_risk)
            .cloned()
            .collect()
    }

    /// Union of every tier
    pub fn all_terms(&self) -> BTreeSet<String> {
        let mut terms = self.risk_terms();
        terms.extend(self.safe.iter().cloned());
        terms
    }

    /// Most severe tier holding `term`, if any
    pub fn tier_of(&self, term: &str) -> Option<RiskTier> {
        [
            RiskTier::HighRisk,
            RiskTier::ModerateRisk,
            RiskTier::LowRisk,
            RiskTier::Safe,
        ]
        .into_iter()
        .find(|tier| self.tier(*tier).contains(term))
    }

    pub fn is_empty(&self) -> bool {
        self.high_risk.is_empty()
            && self.moderate_risk.is_empty()
            && self.low_risk.is_empty()
            && self.safe.is_empty()
    }

    /// Check term formatting and that no risk term is also listed as safe
    pub fn validate(&self, category: Category) -> Result<(), ScanError> {
        for term in self.all_terms() {
            validate_term(&term)
                .map_err(|reason| ScanError::Configuration(format!("{category} term {term:?} {reason}")))?;
        }

        if let Some(term) = self.risk_terms().intersection(&self.safe).next() {
            return Err(ScanError::Configuration(format!(
                "{category} term {term:?} is listed both as a risk and as safe"
            )));
        }

        Ok(())
    }
}

/// Terms must be trimmed, non-empty and lowercase
pub(crate) fn validate_term(term: &str) -> Result<(), &'static str> {
    if term.trim().is_empty() {
        return Err("is empty");
    }
    if term.trim() != term {
        return Err("has surrounding whitespace");
    }
    if term.to_lowercase() != term {
        return Err("is not lowercase");
    }
    Ok(())
}

/// The full set of category dictionaries
///
/// Categories missing from JSON keep their built-in dictionary; a category
/// that is present replaces the built-in one as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionarySet {
    pub trans_fat: IngredientDictionary,
    pub excitotoxin: IngredientDictionary,
    pub corn: IngredientDictionary,
    pub sugar: IngredientDictionary,
    pub gmo: IngredientDictionary,
    pub chemstuffs: IngredientDictionary,
    pub safe: IngredientDictionary,
}

impl DictionarySet {
    pub fn get(&self, category: Category) -> &IngredientDictionary {
        match category {
            Category::TransFat => &self.trans_fat,
            Category::Excitotoxin => &self.excitotoxin,
            Category::Corn => &self.corn,
            Category::Sugar => &self.sugar,
            Category::Gmo => &self.gmo,
            Category::Chemstuffs => &self.chemstuffs,
            Category::Safe => &self.safe,
        }
    }

    /// Terms searched for when matching `category`.
    ///
    /// Risk categories use their risk tiers. The safe category uses every tier
    /// of the safe dictionary plus the safe tier of every other category.
    pub fn candidate_terms(&self, category: Category) -> BTreeSet<String> {
        match category {
            Category::Safe => {
                let mut terms = self.safe.all_terms();
                for other in Category::ALL.into_iter().filter(|c| *c != Category::Safe) {
                    terms.extend(self.get(other).safe.iter().cloned());
                }
                terms
            }
            other => self.get(other).risk_terms(),
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        for category in Category::ALL {
            let dictionary = self.get(category);
            if dictionary.is_empty() {
                return Err(ScanError::Configuration(format!(
                    "{category} dictionary has no terms"
                )));
            }
            dictionary.validate(category)?;
        }
        Ok(())
    }
}

impl Default for DictionarySet {
    fn default() -> Self {
        Self {
            trans_fat: IngredientDictionary::from_tiers(
                TRANS_FAT_HIGH,
                TRANS_FAT_MODERATE,
                TRANS_FAT_LOW,
                TRANS_FAT_SAFE,
            ),
            excitotoxin: IngredientDictionary::from_tiers(
                EXCITOTOXIN_HIGH,
                EXCITOTOXIN_MODERATE,
                EXCITOTOXIN_LOW,
                EXCITOTOXIN_SAFE,
            ),
            corn: IngredientDictionary::from_tiers(CORN_HIGH, CORN_MODERATE, CORN_LOW, CORN_SAFE),
            sugar: IngredientDictionary::from_tiers(SUGAR_HIGH, SUGAR_MODERATE, SUGAR_LOW, SUGAR_SAFE),
            gmo: IngredientDictionary::from_tiers(GMO_HIGH, GMO_MODERATE, GMO_LOW, GMO_SAFE),
            chemstuffs: IngredientDictionary::from_tiers(
                CHEMSTUFFS_HIGH,
                CHEMSTUFFS_MODERATE,
                CHEMSTUFFS_LOW,
                CHEMSTUFFS_SAFE,
            ),
            safe: IngredientDictionary::from_tiers(&[], &[], SAFE_LOW, SAFE_SAFE),
        }
    }
}

// Trans fats

const TRANS_FAT_HIGH: &[&str] = &[
    "partially hydrogenated soybean oil",
    "partially hydrogenated cottonseed oil",
    "partially hydrogenated vegetable oil",
    "partially hydrogenated palm oil",
    "partially hydrogenated canola oil",
    "partially hydrogenated oil",
    "shortening",
    "vegetable shortening",
    "hydrogenated vegetable oil",
    "hydrogenated oil",
];

const TRANS_FAT_MODERATE: &[&str] = &[
    "hydrogenated palm kernel oil",
    "interesterified fat",
    "interesterified soybean oil",
    "margarine",
    "fractionated palm kernel oil",
];

const TRANS_FAT_LOW: &[&str] = &[
    "mono and diglycerides",
    "monoglycerides",
    "diglycerides",
    "palm oil",
];

const TRANS_FAT_SAFE: &[&str] = &["cold pressed oil", "expeller pressed oil"];

/// Trans fats that force a danger verdict on their own
pub const TRANS_FAT_TOP5_DANGER: &[&str] = &[
    "partially hydrogenated soybean oil",
    "partially hydrogenated cottonseed oil",
    "partially hydrogenated vegetable oil",
    "partially hydrogenated oil",
    "shortening",
];

// Excitotoxins

const EXCITOTOXIN_HIGH: &[&str] = &[
    "monosodium glutamate",
    "msg",
    "aspartame",
    "hydrolyzed vegetable protein",
    "hydrolyzed protein",
    "autolyzed yeast extract",
    "autolyzed yeast",
    "yeast extract",
    "disodium inosinate",
    "disodium guanylate",
    "glutamic acid",
    "sodium caseinate",
    "calcium caseinate",
];

const EXCITOTOXIN_MODERATE: &[&str] = &[
    "natural flavors",
    "natural flavor",
    "natural flavoring",
    "textured vegetable protein",
    "soy protein isolate",
    "whey protein isolate",
    "maltodextrin",
    "carrageenan",
    "gelatin",
    "bouillon",
];

const EXCITOTOXIN_LOW: &[&str] = &[
    "soy sauce",
    "malt extract",
    "malt flavoring",
    "barley malt",
    "pectin",
    "protease",
    "ultra-pasteurized",
];

const EXCITOTOXIN_SAFE: &[&str] = &["fresh herbs", "dried herbs"];

/// Excitotoxins that force a danger verdict on their own
pub const EXCITOTOXIN_TOP5_DANGER: &[&str] = &[
    "monosodium glutamate",
    "msg",
    "aspartame",
    "hydrolyzed vegetable protein",
    "autolyzed yeast extract",
];

// Corn derivatives

const CORN_HIGH: &[&str] = &[
    "corn syrup",
    "high fructose corn syrup",
    "corn syrup solids",
    "corn oil",
    "corn starch",
    "cornstarch",
    "modified corn starch",
    "modified food starch",
];

const CORN_MODERATE: &[&str] = &[
    "dextrose",
    "maltodextrin",
    "corn flour",
    "corn meal",
    "cornmeal",
    "corn",
    "glucose syrup",
    "caramel color",
];

const CORN_LOW: &[&str] = &[
    "citric acid",
    "xanthan gum",
    "sorbitol",
    "ascorbic acid",
    "lactic acid",
    "malic acid",
    "distilled vinegar",
];

const CORN_SAFE: &[&str] = &["organic corn", "non-gmo corn"];

// Added sugars

const SUGAR_HIGH: &[&str] = &[
    "high fructose corn syrup",
    "sugar",
    "cane sugar",
    "brown sugar",
    "invert sugar",
    "corn syrup",
    "glucose-fructose",
    "fructose",
    "sucrose",
];

const SUGAR_MODERATE: &[&str] = &[
    "dextrose",
    "glucose",
    "maltose",
    "molasses",
    "agave nectar",
    "evaporated cane juice",
    "fruit juice concentrate",
    "rice syrup",
    "brown rice syrup",
];

const SUGAR_LOW: &[&str] = &[
    "honey",
    "maple syrup",
    "coconut sugar",
    "date sugar",
    "lactose",
];

const SUGAR_SAFE: &[&str] = &["stevia", "monk fruit", "erythritol", "allulose"];

// Genetically modified sources

const GMO_HIGH: &[&str] = &[
    "high fructose corn syrup",
    "genetically modified",
    "genetically engineered",
    "bioengineered",
    "soy lecithin",
    "cottonseed oil",
    "canola oil",
];

const GMO_MODERATE: &[&str] = &[
    "soybean oil",
    "soy protein",
    "corn oil",
    "sugar beet",
    "beet sugar",
    "vegetable oil",
    "soy",
];

const GMO_LOW: &[&str] = &["aspartame", "lecithin", "papaya"];

const GMO_SAFE: &[&str] = &["non-gmo", "non-gmo project verified", "organic", "usda organic"];

/// Substrings of a matched GMO term that force a danger verdict
pub const GMO_DANGER_MARKERS: &[&str] = &["high fructose corn syrup", "genetically modified"];

// Chemical additives

const CHEMSTUFFS_HIGH: &[&str] = &[
    "sodium nitrite",
    "sodium nitrate",
    "potassium bromate",
    "bha",
    "bht",
    "tbhq",
    "propyl gallate",
    "sodium benzoate",
    "potassium benzoate",
    "red 40",
    "yellow 5",
    "yellow 6",
    "blue 1",
    "titanium dioxide",
    "brominated vegetable oil",
    "azodicarbonamide",
];

const CHEMSTUFFS_MODERATE: &[&str] = &[
    "artificial flavor",
    "artificial flavors",
    "artificial color",
    "sodium phosphate",
    "polysorbate 80",
    "propylene glycol",
    "carboxymethylcellulose",
    "sucralose",
    "acesulfame potassium",
    "sulfur dioxide",
    "sodium sulfite",
];

const CHEMSTUFFS_LOW: &[&str] = &[
    "calcium propionate",
    "sorbic acid",
    "potassium sorbate",
    "caramel color",
    "silicon dioxide",
    "calcium chloride",
];

const CHEMSTUFFS_SAFE: &[&str] = &["vitamin c", "tocopherols", "rosemary extract"];

// Whole foods

const SAFE_LOW: &[&str] = &[
    "sunflower oil",
    "coconut oil",
    "potato starch",
    "tapioca starch",
];

const SAFE_SAFE: &[&str] = &[
    "water",
    "filtered water",
    "salt",
    "sea salt",
    "olive oil",
    "extra virgin olive oil",
    "organic wheat flour",
    "wheat flour",
    "whole wheat flour",
    "whole grain oats",
    "oats",
    "rice",
    "brown rice",
    "yeast",
    "eggs",
    "milk",
    "butter",
    "cream",
    "almonds",
    "garlic",
    "onion",
    "tomatoes",
    "basil",
    "black pepper",
    "vinegar",
    "lemon juice",
    "cocoa",
    "vanilla",
    "cinnamon",
    "baking soda",
];

/// Canonical term to alternate surface forms
pub fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let groups: &[(&str, &[&str])] = &[
        ("monosodium glutamate", &["msg", "e621", "mono sodium glutamate"]),
        ("aspartame", &["e951", "nutrasweet", "aminosweet"]),
        (
            "high fructose corn syrup",
            &["hfcs", "glucose-fructose syrup", "fructose-glucose syrup", "isoglucose"],
        ),
        ("shortening", &["vegetable shortening", "shortening powder"]),
        ("yeast extract", &["yeast autolysate"]),
        ("soy lecithin", &["soya lecithin", "e322"]),
        (
            "genetically modified",
            &["genetically engineered", "bioengineered", "produced with genetic engineering"],
        ),
        ("sodium benzoate", &["e211"]),
        ("red 40", &["allura red", "e129", "red no. 40"]),
        ("yellow 5", &["tartrazine", "e102"]),
        ("titanium dioxide", &["e171"]),
        ("carrageenan", &["e407"]),
        ("cane sugar", &["cane juice"]),
    ];

    groups
        .iter()
        .map(|(canonical, forms)| {
            (
                canonical.to_string(),
                forms.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect()
}

/// Common OCR misreads, applied in this order to lowercased, cleaned text
///
/// Misreads are word fragments so that no replacement can combine with its
/// neighbours into a misread that an earlier entry already handled.
pub fn default_ocr_corrections() -> Vec<(String, String)> {
    [
        ("hyd rogen", "hydrogen"),
        ("c0rn", "corn"),
        ("hydrogenale", "hydrogenate"),
        ("hydrogenatc", "hydrogenate"),
        ("glutamale", "glutamate"),
        ("sodlum", "sodium"),
        ("fruclose", "fructose"),
        ("frucose", "fructose"),
        ("syrop", "syrup"),
        ("s0y", "soy"),
        ("0il", "oil"),
        ("5ugar", "sugar"),
        ("suqar", "sugar"),
        ("aspartarne", "aspartame"),
        ("ithln", "ithin"),
        ("dextr0se", "dextrose"),
        ("ingred1ent", "ingredient"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}
