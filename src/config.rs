use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub instruments: Vec<InstrumentConfig>,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_render_charts")]
    pub render_charts: bool,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

fn default_date_column() -> String {
    "Date".into()
}

fn default_price_column() -> String {
    "Price".into()
}

fn default_short_window() -> usize {
    50
}

fn default_long_window() -> usize {
    200
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_render_charts() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no instruments configured")]
    NoInstruments,
    #[error("instrument '{0}' is configured more than once")]
    DuplicateInstrument(String),
    #[error("rolling window '{0}' must be greater than zero")]
    InvalidWindow(&'static str),
}

impl AppConfig {
    /// Builds a config for the given instruments with every other field at its default.
    pub fn with_instruments(instruments: Vec<InstrumentConfig>) -> Self {
        Self {
            instruments,
            date_column: default_date_column(),
            price_column: default_price_column(),
            short_window: default_short_window(),
            long_window: default_long_window(),
            output_dir: default_output_dir(),
            render_charts: default_render_charts(),
            report_path: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }
        let mut seen = HashSet::new();
        for instrument in &self.instruments {
            if !seen.insert(instrument.name.as_str()) {
                return Err(ConfigError::DuplicateInstrument(instrument.name.clone()));
            }
        }
        if self.short_window == 0 {
            return Err(ConfigError::InvalidWindow("short_window"));
        }
        if self.long_window == 0 {
            return Err(ConfigError::InvalidWindow("long_window"));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(r#"{"instruments":[{"name":"Stock A","path":"stock1.csv"}]}"#)
            .expect("config should parse");
        assert_eq!(config.date_column, "Date");
        assert_eq!(config.price_column, "Price");
        assert_eq!(config.short_window, 50);
        assert_eq!(config.long_window, 200);
        assert!(config.render_charts);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_empty_instruments_rejected() {
        let err = parse_config(r#"{"instruments":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoInstruments));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = parse_config(
            r#"{"instruments":[{"name":"A","path":"a.csv"},{"name":"A","path":"b.csv"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateInstrument(name) if name == "A"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = parse_config(
            r#"{"instruments":[{"name":"A","path":"a.csv"}],"long_window":0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindow("long_window")));
    }
}
