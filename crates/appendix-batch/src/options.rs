use crate::constants::DEFAULT_TARGET_PAGES;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatchOptions {
    /// Page budget per output document
    pub target_pages: usize,
    /// Appended to every header label when non-blank
    pub header_text: String,
    /// Keep earlier runs' outputs instead of replacing them
    pub keep_history: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            target_pages: DEFAULT_TARGET_PAGES,
            header_text: String::new(),
            keep_history: false,
        }
    }
}

impl BatchOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| BatchError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BatchError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Strict check for user-facing surfaces. The planner itself clamps the
    /// budget, so runs never fail on these values.
    pub fn validate(&self) -> Result<()> {
        if self.target_pages == 0 {
            return Err(BatchError::Config(
                "Target pages per batch must be at least 1".to_string(),
            ));
        }
        if self.header_text.contains(['\n', '\r']) {
            return Err(BatchError::Config(
                "Header text must fit on one line".to_string(),
            ));
        }
        Ok(())
    }

    /// Page budget the planner actually uses
    pub fn effective_target_pages(&self) -> usize {
        self.target_pages.max(1)
    }
}
