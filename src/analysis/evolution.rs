use crate::models::CatalogSnapshot;
use std::collections::BTreeMap;
use tracing::debug;

/// Base model name -> (full model name, score), sorted by full name
pub type EvolutionFamily = BTreeMap<String, Vec<(String, f64)>>;

/// Canonical model name: lowercase, brand words removed, version numbers
/// and single-letter leftovers ("x", the "v" of "v13") dropped.
pub fn extract_base_name(name: &str, brand: &str) -> String {
    let brand_words: Vec<String> = brand.split_whitespace().map(str::to_lowercase).collect();
    let mut words: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();

    if !brand_words.is_empty() {
        let mut i = 0;
        while i + brand_words.len() <= words.len() {
            if words[i..i + brand_words.len()] == brand_words[..] {
                words.drain(i..i + brand_words.len());
            } else {
                i += 1;
            }
        }
    }

    words
        .iter()
        .map(|word| word.chars().filter(|c| !c.is_ascii_digit()).collect::<String>())
        .filter(|word| word.chars().count() > 1)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group a brand's scored models into families of at least two
pub fn group(snapshot: &CatalogSnapshot, brand: &str) -> EvolutionFamily {
    let mut families = EvolutionFamily::new();

    for shoe in snapshot.brand_records(brand) {
        let Some(score) = shoe.score_value() else {
            continue;
        };
        let base = extract_base_name(&shoe.name, brand);
        if base.is_empty() {
            continue;
        }
        let members = families.entry(base).or_default();
        if !members.iter().any(|(name, _)| name == &shoe.name) {
            members.push((shoe.name.clone(), score));
        }
    }

    families.retain(|_, members| members.len() >= 2);
    for members in families.values_mut() {
        members.sort_by(|a, b| a.0.cmp(&b.0));
    }

    debug!("{} model families with more than one version for {}", families.len(), brand);
    families
}
