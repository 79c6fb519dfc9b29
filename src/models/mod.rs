use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Gender partition of the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Snapshot key used in persisted data ("M" / "F")
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "men" => Ok(Gender::Male),
            "f" | "female" | "women" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}', expected M or F", other)),
        }
    }
}

/// Attribute groups that are filled in by toggling catalog filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterCategory {
    Terrain,
    Pace,
    ReleaseYear,
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterCategory::Terrain => "Terrain",
            FilterCategory::Pace => "Pace",
            FilterCategory::ReleaseYear => "ReleaseYear",
        };
        f.write_str(name)
    }
}

/// One reviewed shoe as scraped from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShoeRecord {
    pub name: String,
    /// Raw score text as shown on the listing ("88"); parsed lazily
    #[serde(default, deserialize_with = "score_text")]
    pub score: Option<String>,
    #[serde(default)]
    pub adjective: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub terrain: Vec<String>,
    #[serde(default)]
    pub pace: Vec<String>,
    #[serde(default)]
    pub release_year: Vec<String>,
}

impl ShoeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: None,
            adjective: None,
            pros: Vec::new(),
            cons: Vec::new(),
            terrain: Vec::new(),
            pace: Vec::new(),
            release_year: Vec::new(),
        }
    }

    /// Numeric score, or `None` when missing or not a number
    pub fn score_value(&self) -> Option<f64> {
        let text = self.score.as_deref()?.trim();
        let value: f64 = text.replace(',', ".").parse().ok()?;
        value.is_finite().then_some(value)
    }

    pub fn labels(&self, category: FilterCategory) -> &[String] {
        match category {
            FilterCategory::Terrain => &self.terrain,
            FilterCategory::Pace => &self.pace,
            FilterCategory::ReleaseYear => &self.release_year,
        }
    }

    /// Add a filter label; returns false if it was already present
    pub fn tag(&mut self, category: FilterCategory, label: &str) -> bool {
        let labels = match category {
            FilterCategory::Terrain => &mut self.terrain,
            FilterCategory::Pace => &mut self.pace,
            FilterCategory::ReleaseYear => &mut self.release_year,
        };
        if labels.iter().any(|l| l == label) {
            return false;
        }
        labels.push(label.to_string());
        true
    }
}

/// Accepts the score as text, a bare number or null
fn score_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Brand name -> gender -> records, the root artifact of a collection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogSnapshot {
    brands: BTreeMap<String, BTreeMap<Gender, Vec<ShoeRecord>>>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, brand: &str, gender: Gender, records: Vec<ShoeRecord>) {
        self.brands
            .entry(brand.to_string())
            .or_default()
            .insert(gender, records);
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }

    pub fn records(&self, brand: &str, gender: Gender) -> &[ShoeRecord] {
        self.brands
            .get(brand)
            .and_then(|by_gender| by_gender.get(&gender))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All records of a brand, men's listing first
    pub fn brand_records<'a>(&'a self, brand: &str) -> impl Iterator<Item = &'a ShoeRecord> + 'a {
        self.brands
            .get(brand)
            .into_iter()
            .flat_map(|by_gender| by_gender.values())
            .flatten()
    }

    /// Every (brand, gender, records) partition
    pub fn partitions(&self) -> impl Iterator<Item = (&str, Gender, &[ShoeRecord])> {
        self.brands.iter().flat_map(|(brand, by_gender)| {
            by_gender
                .iter()
                .map(move |(gender, records)| (brand.as_str(), *gender, records.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.partitions().map(|(_, _, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bookkeeping for one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brands: Vec<String>,
    pub genders: Vec<Gender>,
    /// Brand -> gender -> number of shoes collected
    pub counts: BTreeMap<String, BTreeMap<Gender, usize>>,
}

impl RunManifest {
    pub fn new(started_at: DateTime<Utc>, snapshot: &CatalogSnapshot, genders: &[Gender]) -> Self {
        let mut counts: BTreeMap<String, BTreeMap<Gender, usize>> = BTreeMap::new();
        for (brand, gender, records) in snapshot.partitions() {
            counts
                .entry(brand.to_string())
                .or_default()
                .insert(gender, records.len());
        }
        Self {
            started_at,
            finished_at: Utc::now(),
            brands: snapshot.brands().map(str::to_string).collect(),
            genders: genders.to_vec(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_parsing_skips_non_numeric() {
        let mut shoe = ShoeRecord::new("On Cloud 5");
        assert_eq!(shoe.score_value(), None);

        shoe.score = Some(" 88 ".to_string());
        assert_eq!(shoe.score_value(), Some(88.0));

        shoe.score = Some("87,5".to_string());
        assert_eq!(shoe.score_value(), Some(87.5));

        shoe.score = Some("N/A".to_string());
        assert_eq!(shoe.score_value(), None);
    }

    #[test]
    fn tagging_is_idempotent() {
        let mut shoe = ShoeRecord::new("Hoka Clifton 9");
        assert!(shoe.tag(FilterCategory::Terrain, "Road"));
        assert!(!shoe.tag(FilterCategory::Terrain, "Road"));
        assert!(shoe.tag(FilterCategory::Terrain, "Trail"));
        assert_eq!(shoe.labels(FilterCategory::Terrain), ["Road", "Trail"]);
        assert!(shoe.labels(FilterCategory::Pace).is_empty());
    }

    #[test]
    fn record_uses_catalog_field_names() {
        let raw = r#"{
            "Name": "Nike Pegasus 40",
            "Score": 86,
            "Adjective": null,
            "Pros": ["Comfy"],
            "Cons": [],
            "Terrain": ["Road"],
            "Pace": [],
            "ReleaseYear": ["2023"]
        }"#;
        let shoe: ShoeRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(shoe.score.as_deref(), Some("86"));
        assert_eq!(shoe.release_year, ["2023"]);

        let value = serde_json::to_value(&shoe).unwrap();
        assert!(value.get("ReleaseYear").is_some());
        assert!(value.get("Name").is_some());
    }

    #[test]
    fn snapshot_keys_by_gender_code() {
        let mut snapshot = CatalogSnapshot::new();
        snapshot.insert("On", Gender::Female, vec![ShoeRecord::new("On Cloud 5")]);
        snapshot.insert("On", Gender::Male, vec![ShoeRecord::new("On Cloudmonster")]);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["On"]["F"][0]["Name"], "On Cloud 5");

        let names: Vec<_> = snapshot.brand_records("On").map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["On Cloudmonster", "On Cloud 5"]);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.records("Hoka", Gender::Male).is_empty());
    }

    #[test]
    fn manifest_counts_partitions() {
        let mut snapshot = CatalogSnapshot::new();
        snapshot.insert("On", Gender::Male, vec![ShoeRecord::new("A"), ShoeRecord::new("B")]);
        snapshot.insert("Hoka", Gender::Female, Vec::new());

        let started = Utc::now();
        let manifest = RunManifest::new(started, &snapshot, &Gender::ALL);
        assert_eq!(manifest.brands, ["Hoka", "On"]);
        assert_eq!(manifest.counts["On"][&Gender::Male], 2);
        assert_eq!(manifest.counts["Hoka"][&Gender::Female], 0);
        assert!(manifest.finished_at >= manifest.started_at);
    }

    #[test]
    fn gender_parses_loosely() {
        assert_eq!("m".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert!("x".parse::<Gender>().is_err());
    }
}
