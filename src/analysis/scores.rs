use crate::analysis::text::{fix_hyphenated, tokenize};
use crate::models::{CatalogSnapshot, FilterCategory, Gender};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Subcategory name used for the flat axes
pub const OVERALL: &str = "Overall";

/// Brand -> rounded average score
pub type BrandScores = BTreeMap<String, f64>;

/// Subcategory -> brand -> rounded average score
pub type SubcategoryScores = BTreeMap<String, BrandScores>;

/// Dimension scores are averaged over
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Brand,
    Terrain,
    Pace,
    Year,
    Masc,
    Fem,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Brand,
        Axis::Terrain,
        Axis::Pace,
        Axis::Year,
        Axis::Masc,
        Axis::Fem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Axis::Brand => "brand",
            Axis::Terrain => "terrain",
            Axis::Pace => "pace",
            Axis::Year => "year",
            Axis::Masc => "masc",
            Axis::Fem => "fem",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed view of one axis in its declared shape
#[derive(Debug, Clone, Copy)]
pub enum CategoryView<'a> {
    Flat(&'a BrandScores),
    Nested(&'a SubcategoryScores),
}

/// Average scores per axis. Keys exist only where at least one score was
/// parsable, so a missing brand means "no data", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTable {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub brand: BrandScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terrain: SubcategoryScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pace: SubcategoryScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub year: SubcategoryScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub masc: BrandScores,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fem: BrandScores,
}

impl AggregateTable {
    pub fn category(&self, axis: Axis) -> CategoryView<'_> {
        match axis {
            Axis::Brand => CategoryView::Flat(&self.brand),
            Axis::Masc => CategoryView::Flat(&self.masc),
            Axis::Fem => CategoryView::Flat(&self.fem),
            Axis::Terrain => CategoryView::Nested(&self.terrain),
            Axis::Pace => CategoryView::Nested(&self.pace),
            Axis::Year => CategoryView::Nested(&self.year),
        }
    }

    /// (subcategory, brand scores) pairs of an axis; flat axes yield one
    /// `OVERALL` slice
    pub fn slices(&self, axis: Axis) -> Vec<(&str, &BrandScores)> {
        match self.category(axis) {
            CategoryView::Flat(scores) if scores.is_empty() => Vec::new(),
            CategoryView::Flat(scores) => vec![(OVERALL, scores)],
            CategoryView::Nested(subcategories) => subcategories
                .iter()
                .map(|(name, scores)| (name.as_str(), scores))
                .collect(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn averages(samples: HashMap<String, Vec<f64>>) -> BrandScores {
    samples
        .into_iter()
        .filter_map(|(brand, scores)| mean(&scores).map(|avg| (brand, round2(avg))))
        .collect()
}

fn nested_averages(samples: HashMap<String, HashMap<String, Vec<f64>>>) -> SubcategoryScores {
    samples
        .into_iter()
        .map(|(label, by_brand)| (label, averages(by_brand)))
        .filter(|(_, scores)| !scores.is_empty())
        .collect()
}

/// Average scores by brand, terrain, pace, release year and gender
pub fn aggregate(snapshot: &CatalogSnapshot) -> AggregateTable {
    let mut overall: HashMap<String, Vec<f64>> = HashMap::new();
    let mut masc: HashMap<String, Vec<f64>> = HashMap::new();
    let mut fem: HashMap<String, Vec<f64>> = HashMap::new();
    let mut nested: HashMap<FilterCategory, HashMap<String, HashMap<String, Vec<f64>>>> =
        HashMap::new();

    for (brand, gender, records) in snapshot.partitions() {
        for shoe in records {
            let Some(score) = shoe.score_value() else {
                continue;
            };
            overall.entry(brand.to_string()).or_default().push(score);
            let by_gender = match gender {
                Gender::Male => &mut masc,
                Gender::Female => &mut fem,
            };
            by_gender.entry(brand.to_string()).or_default().push(score);

            for category in [
                FilterCategory::Terrain,
                FilterCategory::Pace,
                FilterCategory::ReleaseYear,
            ] {
                for label in shoe.labels(category) {
                    nested
                        .entry(category)
                        .or_default()
                        .entry(label.clone())
                        .or_default()
                        .entry(brand.to_string())
                        .or_default()
                        .push(score);
                }
            }
        }
    }

    let mut take = |category: FilterCategory| {
        nested_averages(nested.remove(&category).unwrap_or_default())
    };
    AggregateTable {
        brand: averages(overall),
        terrain: take(FilterCategory::Terrain),
        pace: take(FilterCategory::Pace),
        year: take(FilterCategory::ReleaseYear),
        masc: averages(masc),
        fem: averages(fem),
    }
}

/// Other brand -> axis -> advisories
pub type Advisories = BTreeMap<String, BTreeMap<String, Vec<String>>>;

fn advisories<F>(table: &AggregateTable, brand: &str, mut advise: F) -> Advisories
where
    F: FnMut(Axis, &str, &str, f64, f64) -> Option<String>,
{
    let mut result = Advisories::new();
    for axis in Axis::ALL {
        for (subcategory, scores) in table.slices(axis) {
            let Some(&own) = scores.get(brand) else {
                continue;
            };
            for (other, &theirs) in scores.iter().filter(|(name, _)| name.as_str() != brand) {
                if let Some(message) = advise(axis, subcategory, other, own, theirs) {
                    result
                        .entry(other.clone())
                        .or_default()
                        .entry(axis.name().to_string())
                        .or_default()
                        .push(message);
                }
            }
        }
    }
    result
}

/// Where `brand` scores strictly below another brand
pub fn compare_to_others(table: &AggregateTable, brand: &str) -> Advisories {
    advisories(table, brand, |axis, subcategory, other, own, theirs| {
        (own < theirs).then(|| {
            format!(
                "{} scores lower than {} in {} / {}: {} vs {}",
                brand, other, axis, subcategory, own, theirs
            )
        })
    })
}

/// Where another brand scores strictly below `brand`
pub fn compare_others_below(table: &AggregateTable, brand: &str) -> Advisories {
    advisories(table, brand, |axis, subcategory, other, own, theirs| {
        (theirs < own).then(|| {
            format!(
                "{} scores below {} in {} / {}: {} vs {} ({:+.2})",
                other,
                brand,
                axis,
                subcategory,
                theirs,
                own,
                theirs - own
            )
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Above,
    Average,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub brand_score: f64,
    pub others_avg: f64,
    pub status: PerformanceStatus,
}

/// Axis -> subcategory -> performance
pub type PerformanceTable = BTreeMap<String, BTreeMap<String, Performance>>;

pub fn classify_score(own: f64, others_avg: f64, margin: f64) -> PerformanceStatus {
    if own > others_avg + margin {
        PerformanceStatus::Above
    } else if own < others_avg - margin {
        PerformanceStatus::Below
    } else {
        PerformanceStatus::Average
    }
}

/// Compare `brand` with the unweighted mean of every other brand, per
/// subcategory. Slices without a score for `brand` or for any other brand
/// are left out.
pub fn classify_on_performance(table: &AggregateTable, brand: &str, margin: f64) -> PerformanceTable {
    let mut result = PerformanceTable::new();

    for axis in Axis::ALL {
        for (subcategory, scores) in table.slices(axis) {
            let Some(&own) = scores.get(brand) else {
                continue;
            };
            let others: Vec<f64> = scores
                .iter()
                .filter(|(name, _)| name.as_str() != brand)
                .map(|(_, &score)| score)
                .collect();
            let Some(others_avg) = mean(&others) else {
                continue;
            };

            result.entry(axis.name().to_string()).or_default().insert(
                subcategory.to_string(),
                Performance {
                    brand_score: own,
                    others_avg: round2(others_avg),
                    status: classify_score(own, others_avg, margin),
                },
            );
        }
    }

    result
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopRated {
    pub top_score: Option<f64>,
    pub models: Vec<String>,
}

/// Highest-scoring models of a brand, ties included
pub fn top_rated(snapshot: &CatalogSnapshot, brand: &str) -> TopRated {
    let mut top = TopRated::default();

    for shoe in snapshot.brand_records(brand) {
        let Some(score) = shoe.score_value() else {
            continue;
        };
        match top.top_score {
            Some(best) if score < best => {}
            Some(best) if score == best => {
                // same model may be listed for both genders
                if !top.models.contains(&shoe.name) {
                    top.models.push(shoe.name.clone());
                }
            }
            _ => {
                top.top_score = Some(score);
                top.models = vec![shoe.name.clone()];
            }
        }
    }

    top
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentScore {
    pub word: String,
    pub mean_score: f64,
}

/// Words from a brand's cons, ranked by the mean score of the shoes whose
/// cons mention them, lowest first
pub fn most_negative_comments(snapshot: &CatalogSnapshot, brand: &str, top_k: usize) -> Vec<CommentScore> {
    let mut scores_by_word: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for shoe in snapshot.brand_records(brand) {
        let Some(score) = shoe.score_value() else {
            continue;
        };
        let words: BTreeSet<String> = shoe
            .cons
            .iter()
            .flat_map(|sentence| tokenize(&fix_hyphenated(sentence)).collect::<Vec<_>>())
            .collect();
        for word in words {
            scores_by_word.entry(word).or_default().push(score);
        }
    }

    let mut ranked: Vec<CommentScore> = scores_by_word
        .into_iter()
        .filter_map(|(word, scores)| {
            mean(&scores).map(|avg| CommentScore {
                word,
                mean_score: round2(avg),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.mean_score
            .total_cmp(&b.mean_score)
            .then_with(|| a.word.cmp(&b.word))
    });
    ranked.truncate(top_k);
    ranked
}
