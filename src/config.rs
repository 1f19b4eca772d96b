//! Engine configuration.
//!
//! Loaded from .anneal.yml in the working directory, then
//! ~/.config/anneal/anneal.yml, then defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Generation service settings.
    pub llm: LlmConfig,

    /// Refinement loop settings.
    pub refinement: RefinementConfig,

    /// Supplementary content settings.
    pub content: ContentConfig,

    /// Audit log settings.
    pub audit: AuditConfig,
}

impl EngineConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .anneal.yml in current directory
    /// 3. ~/.config/anneal/anneal.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".anneal.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .anneal.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .anneal.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("anneal").join("anneal.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.refinement.max_cycles == 0 {
            eyre::bail!("refinement.max_cycles must be > 0");
        }
        if !(0.0..=1.0).contains(&self.refinement.accept_threshold) {
            eyre::bail!("refinement.accept_threshold must be within [0, 1]");
        }
        if self.content.cache_capacity == 0 {
            eyre::bail!("content.cache_capacity must be > 0");
        }
        Ok(())
    }
}

/// Generation service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier.
    pub model: String,

    /// Timeout per generation call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Max tokens for answer generation.
    pub answer_max_tokens: u32,

    /// Max tokens for a rubric evaluation.
    pub rubric_max_tokens: u32,

    /// Max tokens for an optimized prompt.
    pub optimizer_max_tokens: u32,

    /// Max tokens for the comparison narrative.
    pub comparison_max_tokens: u32,

    /// Temperature for refinement-loop answers.
    pub answer_temperature: f32,

    /// Temperature for the single-shot direct path.
    pub direct_temperature: f32,

    /// Temperature for rubric evaluation.
    pub rubric_temperature: f32,

    /// Temperature for prompt optimization.
    pub optimizer_temperature: f32,

    /// Temperature for the comparison narrative.
    pub comparison_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-2024-07-18".to_string(),
            timeout_ms: 120_000,
            answer_max_tokens: 1000,
            rubric_max_tokens: 1200,
            optimizer_max_tokens: 500,
            comparison_max_tokens: 1000,
            answer_temperature: 0.5,
            direct_temperature: 0.7,
            rubric_temperature: 0.3,
            optimizer_temperature: 0.7,
            comparison_temperature: 0.6,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Refinement loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Refinement cycles allowed beyond the initial answer.
    pub max_cycles: u32,

    /// Accept-as-good-enough threshold; termination requires a score
    /// strictly above this value.
    pub accept_threshold: f64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_cycles: 3,
            accept_threshold: 0.9,
        }
    }
}

/// Supplementary content settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// URLs retained in the process-wide cache.
    pub cache_capacity: usize,

    /// Timeout per page fetch in milliseconds.
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Token budget per fetched page; null disables truncation.
    pub token_limit: Option<usize>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            cache_capacity: crate::content::DEFAULT_CAPACITY,
            fetch_timeout_ms: 30_000,
            token_limit: Some(2000),
        }
    }
}

impl ContentConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Audit log settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether run logs are written at all.
    pub enabled: bool,

    /// Log directory; defaults to the platform data dir.
    pub dir: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}
