// Application settings
// Loaded from ~/.config/gridsel/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use gridsel_core::CountPolicy;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("export delimiter must be an ASCII character other than a quote or line break, got {0:?}")]
    InvalidDelimiter(char),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Aggregation
    #[serde(rename = "aggregate.countPolicy")]
    pub count_policy: CountPolicy,

    // Blank table shape
    #[serde(rename = "table.defaultColumns")]
    pub default_columns: usize,

    #[serde(rename = "table.defaultRows")]
    pub default_rows: usize,

    // Export
    #[serde(rename = "export.delimiter")]
    pub export_delimiter: char,

    #[serde(rename = "export.headers")]
    pub export_headers: bool,

    // Logging (RUST_LOG wins when set)
    #[serde(rename = "log.filter")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            count_policy: CountPolicy::NonEmpty,
            default_columns: 26,
            default_rows: 50,
            export_delimiter: ',',
            export_headers: true,
            log_filter: "warn".to_string(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Which selected cells the status bar counts:
    // "non_empty" (every non-blank cell) or "numeric_only"
    "aggregate.countPolicy": "non_empty",

    // Shape of the blank sheet shown before any data is loaded
    "table.defaultColumns": 26,
    "table.defaultRows": 50,

    // CSV export
    "export.delimiter": ",",
    "export.headers": true,

    // Default log filter (overridden by RUST_LOG)
    "log.filter": "warn"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridsel");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            if let Err(e) = Self::write_default_file(&path) {
                log::warn!("{}", e);
            }
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&strip_comments(&contents)).map_err(|source| {
                SettingsError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        settings.delimiter_byte()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        ensure_parent(path)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the commented default settings file.
    pub fn write_default_file(path: &Path) -> Result<(), SettingsError> {
        ensure_parent(path)?;
        fs::write(path, DEFAULT_CONFIG).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The export delimiter as the byte the CSV writer needs.
    ///
    /// Quotes and line breaks are rejected; the writer uses them for quoting
    /// and record termination.
    pub fn delimiter_byte(&self) -> Result<u8, SettingsError> {
        match self.export_delimiter {
            '"' | '\n' | '\r' => Err(SettingsError::InvalidDelimiter(self.export_delimiter)),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(SettingsError::InvalidDelimiter(c)),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
