//! Flow source configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where flow records are read from
///
/// Records are newline-delimited JSON. Without a `path` the source reads
/// standard input.
///
/// # Example
///
/// ```toml
/// [source]
/// path = "flows.jsonl"
/// continue_on_error = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSONL file to read, stdin when unset
    pub path: Option<PathBuf>,

    /// Skip malformed lines instead of stopping the source
    pub continue_on_error: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            continue_on_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reads_stdin() {
        let config = SourceConfig::default();
        assert!(config.path.is_none());
        assert!(config.continue_on_error);
    }

    #[test]
    fn test_deserialize_path() {
        let toml = r#"
path = "/data/flows.jsonl"
continue_on_error = false
"#;
        let config: SourceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.path, Some(PathBuf::from("/data/flows.jsonl")));
        assert!(!config.continue_on_error);
    }
}
