use crate::analysis::scores::{AggregateTable, Axis, BrandScores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding a brand's overall average in the pivot
pub const AVG_SCORE_COLUMN: &str = "Avg Score";

/// One long-format row of the averages table, as the dashboard reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRow {
    #[serde(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "Subcategoria")]
    pub subcategory: String,
    #[serde(rename = "Marca")]
    pub brand: String,
    #[serde(rename = "Nota Média")]
    pub score: f64,
}

pub fn flatten(table: &AggregateTable) -> Vec<AverageRow> {
    let mut rows = Vec::new();
    for axis in Axis::ALL {
        for (subcategory, scores) in table.slices(axis) {
            rows.extend(scores.iter().map(|(brand, &score)| AverageRow {
                category: axis.name().to_string(),
                subcategory: subcategory.to_string(),
                brand: brand.clone(),
                score,
            }));
        }
    }
    rows
}

/// Brand -> column -> score: "Avg Score", one column per terrain, pace and
/// year label, then "masc" and "fem"
pub fn brand_pivot(table: &AggregateTable) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut pivot: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut put = |column: &str, scores: &BrandScores| {
        for (brand, &score) in scores {
            pivot
                .entry(brand.clone())
                .or_default()
                .insert(column.to_string(), score);
        }
    };

    put(AVG_SCORE_COLUMN, &table.brand);
    for subcategories in [&table.terrain, &table.pace, &table.year] {
        for (label, scores) in subcategories {
            put(label, scores);
        }
    }
    put(Axis::Masc.name(), &table.masc);
    put(Axis::Fem.name(), &table.fem);

    pivot
}
