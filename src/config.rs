//! Pipeline configuration.
//!
//! Resolved once at process startup and passed into the services. Nothing in
//! the scoring path reads environment variables.
//!
//! Precedence (highest first): explicit setters (CLI flags), environment,
//! then the `ToolVariant` preset.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::adapters::FileModelProvider;
use crate::application::RiskScorer;
use crate::domain::ZoneTable;

pub const MODEL_PATH_ENV: &str = "CARDIORISK_MODEL_PATH";
pub const THRESHOLD_ENV: &str = "CARDIORISK_THRESHOLD";
pub const MODEL_SHA256_ENV: &str = "CARDIORISK_MODEL_SHA256";
pub const ZONE_EDGES_ENV: &str = "CARDIORISK_ZONE_EDGES";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Threshold {0} must be a finite value in [0, 1]")]
    InvalidThreshold(f64),

    #[error("Invalid zone table: {0}")]
    InvalidZones(String),

    #[error("Invalid SHA-256 digest {0:?}: expected 64 hex characters")]
    InvalidDigest(String),

    #[error("Cannot parse {name}={value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unknown tool variant {0:?} (expected cardiac, cardiac-hub or heart-attack)")]
    UnknownVariant(String),
}

/// The screening tools sharing this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolVariant {
    /// Stand-alone cardiac failure screen
    Cardiac,
    /// Cardiac failure screen as embedded in the app hub
    CardiacHub,
    /// Heart-attack screen
    HeartAttack,
}

impl ToolVariant {
    /// Operating threshold of the tool.
    #[must_use]
    pub fn default_threshold(self) -> f64 {
        match self {
            Self::Cardiac | Self::HeartAttack => 0.35,
            Self::CardiacHub => 0.30,
        }
    }

    #[must_use]
    pub fn default_model_path(self) -> &'static Path {
        match self {
            Self::Cardiac | Self::CardiacHub => Path::new("models/cardiac_failure_detection.json"),
            Self::HeartAttack => Path::new("models/heart_attack_detection.json"),
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Cardiac | Self::CardiacHub => "Cardiac Risk Assessment",
            Self::HeartAttack => "Heart Attack Risk Prediction",
        }
    }
}

impl FromStr for ToolVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cardiac" => Ok(Self::Cardiac),
            "cardiac-hub" | "cardiac_hub" | "hub" => Ok(Self::CardiacHub),
            "heart-attack" | "heart_attack" => Ok(Self::HeartAttack),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

impl std::fmt::Display for ToolVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cardiac => write!(f, "cardiac"),
            Self::CardiacHub => write!(f, "cardiac-hub"),
            Self::HeartAttack => write!(f, "heart-attack"),
        }
    }
}

/// Everything needed to build a scorer and a model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    variant: ToolVariant,
    model_path: PathBuf,
    threshold: f64,
    zones: ZoneTable,
    expected_sha256: Option<String>,
}

impl PipelineConfig {
    /// Preset values for a tool.
    #[must_use]
    pub fn new(variant: ToolVariant) -> Self {
        Self {
            variant,
            model_path: variant.default_model_path().to_path_buf(),
            threshold: variant.default_threshold(),
            zones: ZoneTable::default(),
            expected_sha256: None,
        }
    }

    /// Preset values overridden by `CARDIORISK_*` environment variables.
    ///
    /// # Errors
    /// Returns error if a variable is set but invalid.
    pub fn from_env(variant: ToolVariant) -> Result<Self, ConfigError> {
        Self::from_lookup(variant, |name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    ///
    /// # Errors
    /// Returns error if a variable is set but invalid.
    pub fn from_lookup<F>(variant: ToolVariant, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(variant);

        if let Some(path) = lookup(MODEL_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_model_path(path.trim());
        }
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            let threshold = raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                name: THRESHOLD_ENV,
                value: raw.clone(),
            })?;
            config = config.with_threshold(threshold)?;
        }
        if let Some(digest) = lookup(MODEL_SHA256_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_expected_sha256(digest.trim())?;
        }
        if let Some(raw) = lookup(ZONE_EDGES_ENV) {
            config = config.with_zones(parse_zone_edges(&raw)?);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// # Errors
    /// Returns error unless `threshold` is finite and in [0, 1].
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    #[must_use]
    pub fn with_zones(mut self, zones: ZoneTable) -> Self {
        self.zones = zones;
        self
    }

    /// # Errors
    /// Returns error unless `digest` is 64 hex characters.
    pub fn with_expected_sha256(mut self, digest: &str) -> Result<Self, ConfigError> {
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidDigest(digest.to_string()));
        }
        self.expected_sha256 = Some(digest.to_ascii_lowercase());
        Ok(self)
    }

    #[must_use]
    pub fn variant(&self) -> ToolVariant {
        self.variant
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    #[must_use]
    pub fn expected_sha256(&self) -> Option<&str> {
        self.expected_sha256.as_deref()
    }

    /// Scorer at this configuration's operating point.
    #[must_use]
    pub fn scorer(&self) -> RiskScorer {
        RiskScorer::from_checked(self.threshold, self.zones)
    }

    /// Provider for the configured artifact. Nothing is read until `load()`.
    #[must_use]
    pub fn model_provider(&self) -> FileModelProvider {
        let provider = FileModelProvider::new(&self.model_path);
        match &self.expected_sha256 {
            Some(digest) => provider.with_expected_sha256(digest.as_str()),
            None => provider,
        }
    }
}

/// Parse "0.2,0.35,0.5,0.7" into a zone table.
///
/// # Errors
/// Returns error unless exactly four valid edges are given.
pub fn parse_zone_edges(raw: &str) -> Result<ZoneTable, ConfigError> {
    let values = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::InvalidValue {
            name: ZONE_EDGES_ENV,
            value: raw.to_string(),
        })?;
    let edges: [f64; 4] = values.try_into().map_err(|v: Vec<f64>| {
        ConfigError::InvalidZones(format!("expected 4 edges, got {}", v.len()))
    })?;
    ZoneTable::new(edges).map_err(ConfigError::InvalidZones)
}
