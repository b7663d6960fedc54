//! Location and delivery-quote acquisition pipeline.
//!
//! Single-threaded and cooperative: the pipeline suspends at geolocation
//! acquisition (bounded by a timeout) and at the quote call. Each failure
//! takes a fallback branch immediately; there is no retry policy, and the
//! fallback holds for the session until the user explicitly re-triggers
//! location capture.

use async_trait::async_trait;

use crate::config::StorefrontConfig;
use crate::delivery::{DeliveryQuote, LocationState};
use crate::error::StorefrontError;
use crate::geo::{CapturedLocation, GeoPoint};

/// Source of a customer geolocation fix, typically backed by device
/// geolocation.
#[async_trait]
pub trait LocationSource {
    /// Acquire the current location, or fail with denial/unavailability.
    async fn current_location(&self) -> Result<CapturedLocation, StorefrontError>;
}

/// Turns a captured point into a delivery quote; deployments back this with
/// the pricing endpoint.
#[async_trait]
pub trait QuoteService {
    /// Quote delivery for a customer point.
    async fn quote(&self, point: &GeoPoint) -> Result<DeliveryQuote, StorefrontError>;
}

/// In-process quote service pricing against the configured origin.
#[derive(Debug, Clone)]
pub struct LocalQuoteService {
    origin: GeoPoint,
}

impl LocalQuoteService {
    /// Price against a restaurant origin.
    pub fn new(origin: GeoPoint) -> Self {
        Self { origin }
    }
}

#[async_trait]
impl QuoteService for LocalQuoteService {
    async fn quote(&self, point: &GeoPoint) -> Result<DeliveryQuote, StorefrontError> {
        Ok(DeliveryQuote::between(&self.origin, point))
    }
}

/// Run one acquisition attempt and produce the location state for the cart.
///
/// Geolocation is bounded by the configured timeout; timeout or denial takes
/// the denied path with the configured fallback charge. A quote failure
/// after a successful fix keeps the confirmed location but falls back to the
/// default charge with no free-delivery offer, so an explicit re-trigger can
/// re-quote later. Never blocks indefinitely, never retries.
pub async fn acquire_delivery_quote(
    source: &dyn LocationSource,
    service: &dyn QuoteService,
    config: &StorefrontConfig,
) -> LocationState {
    let location = match tokio::time::timeout(
        config.geolocation_timeout(),
        source.current_location(),
    )
    .await
    {
        Ok(Ok(location)) => location,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "geolocation unavailable, quoting fallback");
            return LocationState::Denied {
                fallback_charge: config.default_delivery_charge,
            };
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = config.geolocation_timeout_secs,
                "geolocation timed out, quoting fallback"
            );
            return LocationState::Denied {
                fallback_charge: config.default_delivery_charge,
            };
        }
    };

    if !location.point.is_finite() {
        tracing::warn!("non-finite coordinates from location source, quoting fallback");
        return LocationState::Denied {
            fallback_charge: config.default_delivery_charge,
        };
    }

    match service.quote(&location.point).await {
        Ok(quote) => {
            tracing::debug!(
                distance_km = ?quote.distance_km,
                charge = quote.charge,
                "delivery quote acquired"
            );
            LocationState::Confirmed { location, quote }
        }
        Err(e) => {
            tracing::warn!(error = %e, "quote service failed, using default charge");
            LocationState::Confirmed {
                location,
                quote: DeliveryQuote::fallback_with_charge(config.default_delivery_charge),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FixedLocation(GeoPoint);

    #[async_trait]
    impl LocationSource for FixedLocation {
        async fn current_location(&self) -> Result<CapturedLocation, StorefrontError> {
            Ok(CapturedLocation::now(self.0))
        }
    }

    struct DeniedLocation;

    #[async_trait]
    impl LocationSource for DeniedLocation {
        async fn current_location(&self) -> Result<CapturedLocation, StorefrontError> {
            Err(StorefrontError::LocationUnavailable(
                "permission denied".into(),
            ))
        }
    }

    struct HangingLocation;

    #[async_trait]
    impl LocationSource for HangingLocation {
        async fn current_location(&self) -> Result<CapturedLocation, StorefrontError> {
            std::future::pending().await
        }
    }

    struct FailingQuotes;

    #[async_trait]
    impl QuoteService for FailingQuotes {
        async fn quote(&self, _point: &GeoPoint) -> Result<DeliveryQuote, StorefrontError> {
            Err(StorefrontError::QuoteUnavailable("upstream 502".into()))
        }
    }

    fn config() -> StorefrontConfig {
        StorefrontConfig::default()
    }

    #[tokio::test]
    async fn test_happy_path_confirms_with_quote() {
        let cfg = config();
        // ~0 km from the origin: first tier.
        let source = FixedLocation(cfg.origin);
        let service = LocalQuoteService::new(cfg.origin);

        let state = acquire_delivery_quote(&source, &service, &cfg).await;
        match state {
            LocationState::Confirmed { quote, .. } => {
                assert_eq!(quote.charge, 50);
                assert_eq!(quote.free_delivery_threshold, Some(1000));
            }
            other => panic!("expected confirmed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_denied_source_takes_fallback() {
        let cfg = config();
        let service = LocalQuoteService::new(cfg.origin);
        let state = acquire_delivery_quote(&DeniedLocation, &service, &cfg).await;
        assert_eq!(
            state,
            LocationState::Denied {
                fallback_charge: cfg.default_delivery_charge
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_takes_fallback() {
        let cfg = config();
        let service = LocalQuoteService::new(cfg.origin);
        let task = acquire_delivery_quote(&HangingLocation, &service, &cfg);
        // Paused clock: the 12 s timeout elapses instantly.
        let state = task.await;
        assert_eq!(state, LocationState::Denied { fallback_charge: 50 });
    }

    #[tokio::test]
    async fn test_quote_failure_keeps_location_with_default_charge() {
        let cfg = config();
        let source = FixedLocation(GeoPoint::new(19.2, 73.1));
        let state = acquire_delivery_quote(&source, &FailingQuotes, &cfg).await;
        match state {
            LocationState::Confirmed { quote, .. } => {
                assert_eq!(quote.charge, cfg.default_delivery_charge);
                assert_eq!(quote.distance_km, None);
                assert_eq!(quote.free_delivery_threshold, None);
            }
            other => panic!("expected confirmed fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_finite_fix_is_denied() {
        let cfg = config();
        let source = FixedLocation(GeoPoint::new(f64::NAN, 73.0));
        let service = LocalQuoteService::new(cfg.origin);
        let state = acquire_delivery_quote(&source, &service, &cfg).await;
        assert!(matches!(state, LocationState::Denied { .. }));
    }

    #[tokio::test]
    async fn test_timeout_duration_comes_from_config() {
        let cfg = StorefrontConfig {
            geolocation_timeout_secs: 1,
            ..StorefrontConfig::default()
        };
        assert_eq!(cfg.geolocation_timeout(), Duration::from_secs(1));
    }
}
