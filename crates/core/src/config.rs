use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HitboardError;
use crate::ports::Result;

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "hitboard.toml";

/// What to do with a results entry that does not decode as a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning and leave the entry out of the page.
    #[default]
    Skip,
    /// Abort the whole load.
    Fail,
}

/// Settings loaded from `hitboard.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboardConfig {
    /// JSON history of hits.
    pub results_file: PathBuf,
    /// Where the rendered page is written.
    pub output_file: PathBuf,
    /// Used for both `<title>` and the page heading.
    pub page_title: String,
    /// Keywords searched for by `record` and `check`.
    pub keywords: Vec<String>,
    /// Pages and PDFs visited by `check`.
    pub urls: Vec<String>,
    /// Per-request timeout for `check`, in seconds.
    pub fetch_timeout_secs: u64,
    pub on_malformed: MalformedPolicy,
}

impl Default for HitboardConfig {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from("resultados.json"),
            output_file: PathBuf::from("resultados.html"),
            page_title: "Resultados".to_string(),
            keywords: Vec::new(),
            urls: Vec::new(),
            fetch_timeout_secs: 10,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

/// Resolves which config file to use: the explicit one, else `./hitboard.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration. An explicit path must exist; the default path falls back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<HitboardConfig> {
    let path = config_path(explicit);
    if !path.exists() {
        if explicit.is_some() {
            return Err(HitboardError::Config(format!(
                "config file {} not found",
                path.display()
            )));
        }
        tracing::debug!("no {} found, using defaults", path.display());
        return Ok(HitboardConfig::default());
    }

    let data = fs::read_to_string(&path)?;
    let cfg = parse(&data)
        .map_err(|e| HitboardError::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

pub fn parse(data: &str) -> std::result::Result<HitboardConfig, toml::de::Error> {
    toml::from_str(data)
}

/// Writes the default configuration, refusing to overwrite unless `force` is set.
pub fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(HitboardError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let toml = toml::to_string_pretty(&HitboardConfig::default())
        .map_err(|e| HitboardError::Config(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    tracing::info!("wrote default config to {}", path.display());
    Ok(())
}
