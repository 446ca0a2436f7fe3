use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::graph::GraphFormat;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Pipeline run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Interaction records (tab-separated, gzip when the name ends in `.gz`)
    pub input: PathBuf,
    /// Graph text output (gzip when the name ends in `.gz`)
    pub output: PathBuf,
    /// Taxon mapping table; rows whose taxa are absent from it are skipped
    pub taxon_map: Option<PathBuf>,
    pub body_part_vocabulary: Vec<PathBuf>,
    pub life_stage_vocabulary: Vec<PathBuf>,
    pub sex_vocabulary: Option<PathBuf>,
    pub interaction_type_vocabulary: Option<PathBuf>,
    /// Rows per batch
    pub batch_size: usize,
    pub format: GraphFormat,
    /// Expected data row counts per accessory file, checked on load
    pub expected_rows: HashMap<PathBuf, usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            taxon_map: None,
            body_part_vocabulary: Vec::new(),
            life_stage_vocabulary: Vec::new(),
            sex_vocabulary: None,
            interaction_type_vocabulary: None,
            batch_size: DEFAULT_BATCH_SIZE,
            format: GraphFormat::Turtle,
            expected_rows: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(path.to_path_buf(), e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| ConfigError::Unreadable(path.to_path_buf(), e.to_string()))
    }

    /// Loads `EMIKG_CONFIG` when set, then applies the individual
    /// `EMIKG_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var_os("EMIKG_CONFIG") {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup("EMIKG_INPUT") {
            self.input = PathBuf::from(input);
        }
        if let Some(output) = lookup("EMIKG_OUTPUT") {
            self.output = PathBuf::from(output);
        }
        if let Some(size) = lookup("EMIKG_BATCH_SIZE") {
            self.batch_size = size
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMIKG_BATCH_SIZE", size.clone()))?;
        }
        if let Some(format) = lookup("EMIKG_FORMAT") {
            self.format = format
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMIKG_FORMAT", format.clone()))?;
        }
        Ok(self)
    }

    pub fn expected_rows_for(&self, path: &Path) -> Option<usize> {
        self.expected_rows.get(path).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("input"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("output"));
        }
        let accessory = self
            .taxon_map
            .iter()
            .chain(&self.body_part_vocabulary)
            .chain(&self.life_stage_vocabulary)
            .chain(&self.sex_vocabulary)
            .chain(&self.interaction_type_vocabulary);
        for path in std::iter::once(&self.input).chain(accessory) {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Batch size must be at least 1")]
    ZeroBatchSize,
    #[error("No {0} path configured")]
    MissingPath(&'static str),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("Cannot read config {0}: {1}")]
    Unreadable(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.format, GraphFormat::Turtle);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = PipelineConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn test_missing_input_rejected() {
        let config = PipelineConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPath("input"))
        ));
    }

    #[test]
    fn test_missing_file_rejected() {
        let config = PipelineConfig {
            input: PathBuf::from("/nonexistent/records.tsv.gz"),
            output: PathBuf::from("out.ttl.gz"),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("EMIKG_INPUT", "records.tsv.gz"),
            ("EMIKG_BATCH_SIZE", "250"),
            ("EMIKG_FORMAT", "ntriples"),
        ]
        .into_iter()
        .collect();

        let config = PipelineConfig::default()
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.input, PathBuf::from("records.tsv.gz"));
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.format, GraphFormat::NTriples);
    }

    #[test]
    fn test_bad_batch_size_override() {
        let result =
            PipelineConfig::default().with_overrides(|key| (key == "EMIKG_BATCH_SIZE").then(|| "lots".into()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue("EMIKG_BATCH_SIZE", _))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let json = r#"{"input": "in.tsv.gz", "output": "out.ttl.gz", "format": "ntriples",
                       "expected_rows": {"bp.csv": 12}}"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.format, GraphFormat::NTriples);
        assert_eq!(config.expected_rows_for(Path::new("bp.csv")), Some(12));
    }
}
