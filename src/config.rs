//! Profile file access
//!
//! The backing configuration source is a single document in JSON, YAML
//! or TOML, selected at startup. Top-level keys are instance nicknames
//! and each value deserializes into an [`ArrInstance`]. The document
//! is read as loosely-typed values so that one malformed entry can be
//! skipped without aborting the rest of the load.

use clap::ValueEnum;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::instance::{ArrInstance, InstanceType, Profile};

/// Serialization format of the profile file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raw profile document: instance nickname -> unparsed instance value
pub type Document = BTreeMap<String, Value>;

/// The profile file on disk, in one chosen format
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: PathBuf,
    format: ConfigFormat,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>, format: ConfigFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the whole document.
    ///
    /// A file that cannot be read or parsed at all is an error; entry
    /// deserialization is deliberately left to the caller so a single
    /// bad entry never poisons the rest.
    pub fn read_document(&self) -> Result<Document> {
        let raw = fs::read_to_string(&self.path)?;
        let doc = match self.format {
            ConfigFormat::Json => serde_json::from_str(&raw)?,
            ConfigFormat::Yaml => serde_yaml::from_str(&raw)
                .map_err(|e| Error::Config(format!("{}: {e}", self.path.display())))?,
            ConfigFormat::Toml => toml::from_str(&raw)
                .map_err(|e| Error::Config(format!("{}: {e}", self.path.display())))?,
        };
        Ok(doc)
    }

    /// Serialize the document back in the selected format.
    pub fn write_document(&self, doc: &Document) -> Result<()> {
        let raw = match self.format {
            ConfigFormat::Json => serde_json::to_string_pretty(doc)?,
            ConfigFormat::Yaml => {
                serde_yaml::to_string(doc).map_err(|e| Error::Config(e.to_string()))?
            }
            ConfigFormat::Toml => {
                toml::to_string_pretty(doc).map_err(|e| Error::Config(e.to_string()))?
            }
        };
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// First-run seeding: write an illustrative document so a new
    /// deployment has a template to edit instead of an empty file.
    pub fn seed_example(&self) -> Result<()> {
        let mut language_map = HashMap::new();
        language_map.insert(
            "/media/shows".to_string(),
            Profile {
                required_languages_audio: vec!["en".to_string(), "fr".to_string()],
                required_languages_sub: vec!["en".to_string(), "kr".to_string()],
            },
        );
        language_map.insert(
            "/media/kdramas".to_string(),
            Profile {
                required_languages_audio: vec!["en".to_string(), "kr".to_string()],
                required_languages_sub: vec!["en".to_string(), "kr".to_string()],
            },
        );
        let example = ArrInstance::new(
            InstanceType::Sonarr,
            "https://sonarr.example.com",
            "your_api_key_here",
            language_map,
        );

        let mut doc = Document::new();
        doc.insert(
            "some-meaningful-nickname".to_string(),
            serde_json::to_value(&example)?,
        );
        self.write_document(&doc)?;
        info!(path = %self.path.display(), "created example profile file");
        Ok(())
    }
}
