use crate::config::{default_brands, default_genders, AnalysisConfig, Brand, BrowserConfig};
use crate::models::Gender;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Running-shoe review scraper and score analysis.
#[derive(Debug, Parser)]
#[command(name = "shoe-scout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory the JSON artifacts are written to.
    #[arg(short, long, global = true, env = "SHOE_SCOUT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scrape the catalog, save the snapshot, then analyze it.
    Collect {
        /// Brands to collect (repeatable); defaults to the five tracked brands.
        #[arg(short, long = "brand", env = "SHOE_SCOUT_BRANDS", value_delimiter = ',')]
        brands: Vec<String>,

        /// Genders to collect: M, F (repeatable).
        #[arg(short, long = "gender", env = "SHOE_SCOUT_GENDERS", value_delimiter = ',')]
        genders: Vec<Gender>,

        /// Show the browser window.
        #[arg(long, env = "SHOE_SCOUT_HEADED")]
        headed: bool,

        /// Chrome binary to launch instead of probing install locations.
        #[arg(long, env = "SHOE_SCOUT_CHROME_PATH")]
        chrome_path: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Recompute the derived artifacts from a saved snapshot.
    Analyze {
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Brand every comparison is made against.
    #[arg(long, env = "SHOE_SCOUT_REFERENCE_BRAND", default_value = "On")]
    pub reference_brand: String,

    /// Words kept on each side of the sentiment split.
    #[arg(long, env = "SHOE_SCOUT_TOP_N", default_value_t = 100)]
    pub top_n: usize,

    /// Distance from the other brands' mean that still counts as average.
    #[arg(long, env = "SHOE_SCOUT_MARGIN", default_value_t = 1.0)]
    pub margin: f64,

    /// Negative comment words reported.
    #[arg(long, env = "SHOE_SCOUT_TOP_K", default_value_t = 10)]
    pub top_k: usize,
}

impl From<AnalysisArgs> for AnalysisConfig {
    fn from(args: AnalysisArgs) -> Self {
        Self {
            reference_brand: args.reference_brand,
            top_n: args.top_n,
            margin: args.margin,
            top_k: args.top_k,
        }
    }
}

pub fn resolve_brands(names: &[String]) -> Vec<Brand> {
    if names.is_empty() {
        default_brands()
    } else {
        names.iter().map(|name| Brand::new(name.trim())).collect()
    }
}

pub fn resolve_genders(genders: &[Gender]) -> Vec<Gender> {
    if genders.is_empty() {
        return default_genders();
    }
    let mut unique = genders.to_vec();
    unique.sort();
    unique.dedup();
    unique
}

pub fn browser_config(headed: bool, chrome_path: Option<PathBuf>) -> BrowserConfig {
    BrowserConfig {
        headless: !headed,
        chrome_path,
        ..BrowserConfig::default()
    }
}
