use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "pfd-stats.toml";

// Include the example configuration at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../pfd-stats.example.toml");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub response: Response,
    #[serde(default)]
    pub counts: Counts,
    #[serde(default)]
    pub labels: Labels,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads `path`, or `./pfd-stats.toml` when present, or the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            info!(action = "load", component = "config", file_path = ?path, "Loading configuration");
            return Self::load(path);
        }

        let default_file = Path::new(DEFAULT_CONFIG_FILE);
        if default_file.exists() {
            info!(action = "load", component = "config", file_path = ?default_file, "Loading default configuration file");
            Self::load(default_file)
        } else {
            info!(
                action = "load",
                component = "config",
                "No configuration file found, using defaults"
            );
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub reports: PathBuf,
    pub out_dir: PathBuf,
    pub statistics: PathBuf,
    pub categories: Option<PathBuf>,
    pub coroner_names: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            reports: "data/reports-corrected.csv".into(),
            out_dir: "data/counts".into(),
            statistics: "data/statistics.toml".into(),
            categories: None,
            coroner_names: None,
        }
    }
}

impl Paths {
    /// Empty strings in the TOML file mean "not configured".
    pub fn categories(&self) -> Option<&Path> {
        non_empty_path(self.categories.as_deref())
    }

    pub fn coroner_names(&self) -> Option<&Path> {
        non_empty_path(self.coroner_names.as_deref())
    }
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// CSV header names for the fields the analysis reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub recipients: String,
    pub replies: String,
    pub date: String,
    pub area: String,
    pub name: String,
    pub category: String,
    pub inquest: String,
    pub circumstances: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            recipients: "this_report_is_being_sent_to".into(),
            replies: "reply_urls".into(),
            date: "date_of_report".into(),
            area: "coroner_area".into(),
            name: "coroner_name".into(),
            category: "category".into(),
            inquest: "inquest".into(),
            circumstances: "circumstances".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub overdue_after_days: i64,
    pub reply_marker: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            overdue_after_days: 56,
            reply_marker: "Response".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Counts {
    pub top_names: usize,
}

impl Default for Counts {
    fn default() -> Self {
        Self { top_names: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub causes: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub max_num: usize,
    pub min_similarity: f64,
    pub dimensions: usize,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            causes: "data/medical-causes.txt".into(),
            output: "data/medical-cause-reports.csv".into(),
            column: "tags".into(),
            max_num: 5,
            min_similarity: 0.3,
            dimensions: 512,
        }
    }
}

pub fn init_default_config() -> Result<()> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);

    if default_file.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            DEFAULT_CONFIG_FILE
        );
    }

    fs::write(default_file, DEFAULT_CONFIG)
        .with_context(|| format!("writing {}", default_file.display()))?;
    println!("Created {} with default settings", DEFAULT_CONFIG_FILE);

    Ok(())
}
