//! Conversion configuration

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Settings for a conversion run.
///
/// `spase_root` is the directory a local SPASE installation is unpacked
/// under, so `spase://X/Y` resolves to `{spase_root}/X/Y.xml`. The override
/// directory holds locally adjusted copies of external records. `no_split`
/// lists record keys whose free-text author string is a consortium name and
/// must not be split at separators.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub spase_root: PathBuf,
    pub override_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub no_split: Vec<String>,
    /// Maximum nesting depth when resolving related records.
    pub max_relation_depth: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default();
        ConvertConfig {
            spase_root: home.clone(),
            override_dir: Some(home.join("ExternalSPASE_XMLs")),
            output_dir: home.join("SPASE_JSONs"),
            no_split: Vec::new(),
            max_relation_depth: 2,
        }
    }
}

impl ConvertConfig {
    pub fn new(spase_root: impl Into<PathBuf>) -> Self {
        ConvertConfig {
            spase_root: spase_root.into(),
            ..ConvertConfig::default()
        }
    }

    /// Load the do-not-split list from a newline-delimited text file.
    pub fn with_no_split_file(mut self, path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        self.no_split = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_split_file_parsing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NASA/NumericalData/One.xml").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  NASA/NumericalData/Two.xml  ").unwrap();

        let config = ConvertConfig::new("/tmp/spase")
            .with_no_split_file(file.path())
            .unwrap();
        assert_eq!(
            config.no_split,
            vec!["NASA/NumericalData/One.xml", "NASA/NumericalData/Two.xml"]
        );
    }

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.max_relation_depth, 2);
        assert!(config.no_split.is_empty());
    }
}
