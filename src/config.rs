use crate::models::{FilterCategory, Gender};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const CATALOG_URL: &str = "https://runrepeat.com/catalog";
pub const SITE_ORIGIN: &str = "https://runrepeat.com";

/// A tracked shoe manufacturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Display name, also the snapshot key ("New Balance")
    pub name: String,
    /// Catalog URL slug ("new-balance")
    pub slug: String,
}

impl Brand {
    pub fn new(name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self {
            name: name.to_string(),
            slug,
        }
    }
}

pub fn default_brands() -> Vec<Brand> {
    ["On", "Hoka", "Nike", "Adidas", "New Balance"]
        .into_iter()
        .map(Brand::new)
        .collect()
}

/// CSS selectors for the catalog pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selectors {
    pub consent_button: String,
    pub gender_toggle: String,
    pub listing_item: String,
    pub item_link: String,
    pub item_score: String,
    pub item_adjective: String,
    pub next_page: String,
    pub filter_label: String,
    pub pros: String,
    pub cons: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            consent_button: "#onetrust-accept-btn-handler".to_string(),
            gender_toggle: ".gender-select-radio a.gender-select-radio__option".to_string(),
            listing_item: "li.product_list.no_prices".to_string(),
            item_link: ".product-name a".to_string(),
            item_score: ".corescore-big__score".to_string(),
            item_adjective: ".corescore-big__text".to_string(),
            next_page: "a.paginate-buttons.next-button".to_string(),
            filter_label: "span.checkbox-label-text".to_string(),
            pros: "#the_good li".to_string(),
            cons: "#the_bad li".to_string(),
        }
    }
}

/// Fixed waits between browser interactions
#[derive(Debug, Clone)]
pub struct Pacing {
    pub consent_timeout: Duration,
    pub filter_timeout: Duration,
    /// Pause after toggling gender or a filter
    pub toggle_settle: Duration,
    pub scroll_pause: Duration,
    /// Upper bound on bottom-scroll rounds per listing
    pub max_scroll_rounds: usize,
    pub page_settle: Duration,
    pub detail_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            consent_timeout: Duration::from_secs(15),
            filter_timeout: Duration::from_secs(10),
            toggle_settle: Duration::from_secs(2),
            scroll_pause: Duration::from_secs(2),
            max_scroll_rounds: 50,
            page_settle: Duration::from_secs(2),
            detail_settle: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
impl Pacing {
    /// No waiting at all, for driving canned pages
    pub fn immediate() -> Self {
        Self {
            consent_timeout: Duration::ZERO,
            filter_timeout: Duration::ZERO,
            toggle_settle: Duration::ZERO,
            scroll_pause: Duration::ZERO,
            max_scroll_rounds: 10,
            page_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
        }
    }
}

/// Filter checkboxes toggled to tag records with terrain/pace/year labels
#[derive(Debug, Clone)]
pub struct FilterTaxonomy {
    pub groups: Vec<(FilterCategory, Vec<String>)>,
}

impl Default for FilterTaxonomy {
    fn default() -> Self {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            groups: vec![
                (FilterCategory::Terrain, labels(&["Road", "Trail"])),
                (
                    FilterCategory::Pace,
                    labels(&["Daily running / easy", "Tempo / speed", "Competition / race"]),
                ),
                (
                    FilterCategory::ReleaseYear,
                    labels(&["New", "2024", "2023", "2022", "2021 or older"]),
                ),
            ],
        }
    }
}

impl FilterTaxonomy {
    pub fn iter(&self) -> impl Iterator<Item = (FilterCategory, &str)> {
        self.groups
            .iter()
            .flat_map(|(category, labels)| labels.iter().map(move |l| (*category, l.as_str())))
    }
}

/// Everything the extraction session needs to know about the site
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub catalog_url: String,
    pub site_origin: String,
    pub selectors: Selectors,
    pub pacing: Pacing,
    pub filters: FilterTaxonomy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            catalog_url: CATALOG_URL.to_string(),
            site_origin: SITE_ORIGIN.to_string(),
            selectors: Selectors::default(),
            pacing: Pacing::default(),
            filters: FilterTaxonomy::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn listing_url(&self, brand: &Brand) -> String {
        format!(
            "{}/{}-running-shoes",
            self.catalog_url.trim_end_matches('/'),
            brand.slug
        )
    }

    /// Make a scraped href absolute
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.site_origin.trim_end_matches('/'), href)
        } else {
            format!("{}/{}", self.site_origin.trim_end_matches('/'), href)
        }
    }
}

/// Chrome launch settings
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Explicit binary; otherwise the well-known install locations are probed
    pub chrome_path: Option<PathBuf>,
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Well-known Chrome install locations, probed in order
pub fn chrome_candidates() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/google-chrome-stable"),
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
    ];
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        paths.push(PathBuf::from(local).join(r"Google\Chrome\Application\chrome.exe"));
    }
    paths
}

/// Knobs for the derived artifacts
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Brand every comparison is made against
    pub reference_brand: String,
    pub top_n: usize,
    pub margin: f64,
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_brand: "On".to_string(),
            top_n: 100,
            margin: 1.0,
            top_k: 10,
        }
    }
}

/// Genders collected when none are given
pub fn default_genders() -> Vec<Gender> {
    Gender::ALL.to_vec()
}
