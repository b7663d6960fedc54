//! Storefront configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StorefrontError;
use crate::geo::GeoPoint;

/// Operator-tunable settings for the storefront domain.
///
/// Everything has a working default; deployments override via TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Restaurant coordinates, the origin of every delivery quote.
    pub origin: GeoPoint,
    /// Charge used when the customer could not be located or the pricing
    /// call failed.
    pub default_delivery_charge: i64,
    /// How long to wait for a geolocation fix before taking the denied path.
    pub geolocation_timeout_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            origin: GeoPoint::new(18.976240, 73.023252),
            default_delivery_charge: 50,
            geolocation_timeout_secs: 12,
        }
    }
}

impl StorefrontConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(input: &str) -> Result<Self, StorefrontError> {
        toml::from_str(input).map_err(|e| StorefrontError::Config(e.to_string()))
    }

    /// Geolocation timeout as a [`Duration`].
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = StorefrontConfig::default();
        assert_eq!(cfg.default_delivery_charge, 50);
        assert_eq!(cfg.geolocation_timeout(), Duration::from_secs(12));
        assert!((cfg.origin.lat - 18.976240).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = StorefrontConfig::from_toml_str(
            r#"
            default_delivery_charge = 60

            [origin]
            lat = 19.07
            lng = 72.87
            "#,
        )
        .unwrap();
        assert_eq!(cfg.default_delivery_charge, 60);
        assert_eq!(cfg.geolocation_timeout_secs, 12);
        assert!((cfg.origin.lng - 72.87).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = StorefrontConfig::from_toml_str("default_delivery_charge = \"lots\"")
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }
}
