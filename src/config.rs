use crate::cache::{CacheOptions, MatchMode};
use anyhow::{Context as _, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReuseTabConfig {
    pub mode: MatchMode,
    /// Global switch for close affordances.
    pub allow_close: bool,
    /// Always represent the live route as a tab.
    pub show_current: bool,
    pub max: Option<usize>,
    /// URL patterns never kept alive in `url` mode.
    pub excludes: Vec<String>,
    pub debug: bool,
}

impl Default for ReuseTabConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Menu,
            allow_close: true,
            show_current: true,
            max: None,
            excludes: Vec::new(),
            debug: false,
        }
    }
}

impl ReuseTabConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("failed to parse reuse tab config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Options handed to the cache collaborator.
    pub fn cache_options(&self) -> Result<CacheOptions> {
        let excludes = self
            .excludes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("invalid exclude pattern: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CacheOptions {
            mode: self.mode,
            max: self.max,
            excludes,
            debug: self.debug,
        })
    }
}
