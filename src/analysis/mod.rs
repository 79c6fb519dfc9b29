pub mod evolution;
pub mod presentation;
pub mod report;
pub mod scores;
pub mod sentiment;
pub mod text;

pub use report::AnalysisReport;
