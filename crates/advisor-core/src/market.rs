//! Market context snapshots
//!
//! The snapshot is opaque text injected verbatim into manager and worker
//! prompts. It is read once at the start of each run.

use crate::config::MarketConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shown when no snapshot is configured or readable
pub const NO_SNAPSHOT: &str = "No market snapshot available.";

/// Source of the market snapshot
pub trait MarketContextProvider: Send + Sync {
    fn snapshot(&self) -> String;
}

/// Fixed snapshot text
#[derive(Debug, Clone)]
pub struct StaticMarketContext {
    text: String,
}

impl StaticMarketContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn empty() -> Self {
        Self::new(NO_SNAPSHOT)
    }
}

impl MarketContextProvider for StaticMarketContext {
    fn snapshot(&self) -> String {
        self.text.clone()
    }
}

/// Snapshot re-read from a file on every run
#[derive(Debug, Clone)]
pub struct FileMarketContext {
    path: PathBuf,
}

impl FileMarketContext {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarketContextProvider for FileMarketContext {
    fn snapshot(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => NO_SNAPSHOT.to_string(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read market snapshot");
                NO_SNAPSHOT.to_string()
            }
        }
    }
}

/// Build the provider described by `[market]`
///
/// `snapshot_file` takes precedence over inline `snapshot`.
pub fn from_config(config: &MarketConfig) -> Arc<dyn MarketContextProvider> {
    if let Some(path) = &config.snapshot_file {
        return Arc::new(FileMarketContext::new(path));
    }
    match &config.snapshot {
        Some(text) if !text.trim().is_empty() => Arc::new(StaticMarketContext::new(text.clone())),
        _ => Arc::new(StaticMarketContext::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_snapshot_is_reread() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Villas +4% QoQ").unwrap();
        let provider = FileMarketContext::new(file.path());
        assert_eq!(provider.snapshot(), "Villas +4% QoQ");

        std::fs::write(file.path(), "Villas +5% QoQ").unwrap();
        assert_eq!(provider.snapshot(), "Villas +5% QoQ");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let provider = FileMarketContext::new("/nonexistent/market.txt");
        assert_eq!(provider.snapshot(), NO_SNAPSHOT);
    }

    #[test]
    fn test_from_config_precedence() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "from file").unwrap();
        let config = MarketConfig {
            snapshot: Some("inline".to_string()),
            snapshot_file: Some(file.path().to_path_buf()),
        };
        assert_eq!(from_config(&config).snapshot(), "from file");

        let inline = MarketConfig {
            snapshot: Some("inline".to_string()),
            snapshot_file: None,
        };
        assert_eq!(from_config(&inline).snapshot(), "inline");
        assert_eq!(from_config(&MarketConfig::default()).snapshot(), NO_SNAPSHOT);
    }
}
