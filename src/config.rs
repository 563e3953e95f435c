//! Runtime configuration.
//!
//! Built-in defaults, then an optional JSON file patch, then validation.
//! Only the keys present in the file override the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NegotiationError, Result};
use crate::negotiation::DEFAULT_MAX_ROUNDS;
use crate::persona::DEFAULT_CURRENCY;
use crate::pricing::{PricingModel, DEFAULT_BONUS_ORIGINS};

/// Highest round cap accepted from configuration
pub const MAX_ROUNDS_LIMIT: u32 = 50;

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "bargain.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BargainConfig {
    /// Buyer turns before a negotiation times out
    pub max_rounds: u32,
    /// Origins that earn the origin premium in both pricing tables
    pub bonus_origins: Vec<String>,
    pub currency_symbol: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for BargainConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            bonus_origins: DEFAULT_BONUS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            currency_symbol: DEFAULT_CURRENCY.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BargainConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `bargain.json` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = resolve_config_path(path)? {
            tracing::debug!("Loading configuration from {}", path.display());
            config.apply_patch(read_patch(&path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document on top of the defaults
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_patch(serde_json::from_str(raw)?);
        config.validate()?;
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(max_rounds) = patch.max_rounds {
            self.max_rounds = max_rounds;
        }
        if let Some(bonus_origins) = patch.bonus_origins {
            self.bonus_origins = bonus_origins;
        }
        if let Some(currency_symbol) = patch.currency_symbol {
            self.currency_symbol = currency_symbol;
        }
        if let Some(log_level) = patch.log_level {
            self.log_level = log_level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ROUNDS_LIMIT).contains(&self.max_rounds) {
            return Err(NegotiationError::InvalidConfig(format!(
                "max_rounds must be between 1 and {}, got {}",
                MAX_ROUNDS_LIMIT, self.max_rounds
            )));
        }
        if self.currency_symbol.trim().is_empty() {
            return Err(NegotiationError::InvalidConfig(
                "currency_symbol must not be empty".to_string(),
            ));
        }
        if self.bonus_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(NegotiationError::InvalidConfig(
                "bonus_origins must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }

    pub fn buyer_pricing(&self) -> PricingModel {
        PricingModel::buyer().with_bonus_origins(&self.bonus_origins)
    }

    pub fn seller_pricing(&self) -> PricingModel {
        PricingModel::seller().with_bonus_origins(&self.bonus_origins)
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit_path {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(NegotiationError::Configuration(format!(
            "config file not found: {}",
            path.display()
        ))),
        None => Ok(Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists())),
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        NegotiationError::Configuration(format!("failed to parse {}: {}", path.display(), e))
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    max_rounds: Option<u32>,
    bonus_origins: Option<Vec<String>>,
    currency_symbol: Option<String>,
    log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    #[test]
    fn test_defaults_are_valid() {
        let config = BargainConfig::default();
        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.currency_symbol, "₹");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_patch_keeps_defaults() {
        let config = BargainConfig::from_json(r#"{"max_rounds": 12, "currency_symbol": "$"}"#).unwrap();

        assert_eq!(config.max_rounds, 12);
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.bonus_origins.len(), 3);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            BargainConfig::from_json(r#"{"max_rounds": 0}"#),
            Err(NegotiationError::InvalidConfig(_))
        ));
        assert!(BargainConfig::from_json(r#"{"max_rounds": 51}"#).is_err());
        assert!(BargainConfig::from_json(r#"{"currency_symbol": "  "}"#).is_err());
        assert!(BargainConfig::from_json(r#"{"bonus_origins": [""]}"#).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            BargainConfig::from_json(r#"{"max_round": 5}"#),
            Err(NegotiationError::Json(_))
        ));
    }

    #[test]
    fn test_bonus_origins_flow_into_pricing() {
        let config = BargainConfig::from_json(r#"{"bonus_origins": ["Ratnagiri"]}"#).unwrap();
        let alphonso = Product::new("Alphonso Mangoes", "Mangoes", 100, "A", "Ratnagiri", 180000);

        assert_eq!(config.buyer_pricing().fair_price(&alphonso), 198450);
        assert_eq!(BargainConfig::default().buyer_pricing().fair_price(&alphonso), 189000);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("bargain-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"max_rounds": 8, "log_level": "debug"}"#).unwrap();

        let config = BargainConfig::load(Some(path.as_path())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.max_rounds, 8);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = BargainConfig::load(Some(Path::new("/nonexistent/bargain.json")));
        assert!(matches!(result, Err(NegotiationError::Configuration(_))));
    }
}
