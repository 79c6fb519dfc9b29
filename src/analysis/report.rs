use crate::analysis::evolution::{self, EvolutionFamily};
use crate::analysis::presentation::{self, AverageRow};
use crate::analysis::scores::{
    self, Advisories, AggregateTable, CommentScore, PerformanceTable, TopRated,
};
use crate::analysis::sentiment::{self, DifferenceDictionary};
use crate::analysis::text;
use crate::config::AnalysisConfig;
use crate::error::ScoutError;
use crate::models::CatalogSnapshot;
use crate::storage::ArtifactStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Every artifact derived from one catalog snapshot. Field names are the
/// artifact names the dashboard loads.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub positive_words: DifferenceDictionary,
    pub negative_words: DifferenceDictionary,
    pub avg_table: AggregateTable,
    pub avg_table_rows: Vec<AverageRow>,
    pub brand_pivot: BTreeMap<String, BTreeMap<String, f64>>,
    pub on_vs_others: Advisories,
    pub below_on: Advisories,
    pub on_performance: PerformanceTable,
    pub top_on_models: TopRated,
    pub worst_on_comments: Vec<CommentScore>,
    pub model_score_evolution: EvolutionFamily,
}

impl AnalysisReport {
    pub fn build(snapshot: &CatalogSnapshot, config: &AnalysisConfig) -> Self {
        let brand = config.reference_brand.as_str();

        let (pros, cons) = text::extract_pros_cons(snapshot);
        let (pros_vocab, cons_vocab) = text::classify(&pros, &cons);
        let (positive_words, negative_words) =
            sentiment::differentiate(&pros_vocab, &cons_vocab, config.top_n);

        let avg_table = scores::aggregate(snapshot);

        Self {
            positive_words,
            negative_words,
            avg_table_rows: presentation::flatten(&avg_table),
            brand_pivot: presentation::brand_pivot(&avg_table),
            on_vs_others: scores::compare_to_others(&avg_table, brand),
            below_on: scores::compare_others_below(&avg_table, brand),
            on_performance: scores::classify_on_performance(&avg_table, brand, config.margin),
            top_on_models: scores::top_rated(snapshot, brand),
            worst_on_comments: scores::most_negative_comments(snapshot, brand, config.top_k),
            model_score_evolution: evolution::group(snapshot, brand),
            avg_table,
        }
    }

    /// Save each artifact under its own name
    pub async fn persist<S>(&self, store: &S) -> Result<usize, ScoutError>
    where
        S: ArtifactStore + ?Sized,
    {
        let serde_json::Value::Object(artifacts) = serde_json::to_value(self)? else {
            return Ok(0);
        };

        let mut count = 0;
        for name in REPORT_ARTIFACTS {
            if let Some(value) = artifacts.get(name) {
                store.save(name, value).await?;
                count += 1;
            }
        }
        info!("Saved {} analysis artifacts", count);
        Ok(count)
    }

    pub fn log_summary(&self, brand: &str) {
        info!(
            "{} positive and {} negative words",
            self.positive_words.len(),
            self.negative_words.len()
        );
        match self.top_on_models.top_score {
            Some(score) => info!(
                "Top {} score {}: {}",
                brand,
                score,
                self.top_on_models.models.join(", ")
            ),
            None => info!("No scored {} models", brand),
        }
        info!(
            "{} model families, {} brands compared",
            self.model_score_evolution.len(),
            self.brand_pivot.len()
        );
    }
}

/// Artifact names written by `AnalysisReport::persist`
pub const REPORT_ARTIFACTS: [&str; 11] = [
    "positive_words",
    "negative_words",
    "avg_table",
    "avg_table_rows",
    "brand_pivot",
    "on_vs_others",
    "below_on",
    "on_performance",
    "top_on_models",
    "worst_on_comments",
    "model_score_evolution",
];
