//! Distance-based delivery pricing.
//!
//! Two independent step functions share the same clamped distance: the charge
//! tiers are finer-grained near the origin while the free-delivery thresholds
//! only change at 5/10/20 km. Operations staff tune each independently, so
//! they are kept as separate lookups rather than one combined table.

use serde::{Deserialize, Serialize};

use crate::geo::{CapturedLocation, GeoPoint};

/// Charge quoted when the customer could not be located.
pub const FALLBACK_DELIVERY_CHARGE: i64 = 50;

/// Delivery charge for a clamped non-negative distance.
fn charge_for_distance(km: f64) -> i64 {
    if km <= 5.0 {
        50
    } else if km <= 10.0 {
        80
    } else if km <= 15.0 {
        120
    } else if km <= 20.0 {
        150
    } else if km <= 30.0 {
        200
    } else if km <= 40.0 {
        300
    } else if km <= 50.0 {
        400
    } else {
        500
    }
}

/// Order value above which delivery is free, for a clamped distance.
///
/// `None` means there is no free-delivery offer at that distance. That is
/// policy, not an error.
fn free_delivery_threshold(km: f64) -> Option<i64> {
    if km <= 5.0 {
        Some(1000)
    } else if km <= 10.0 {
        Some(1500)
    } else if km <= 20.0 {
        Some(2000)
    } else {
        None
    }
}

/// A delivery price quote for one location-acquisition attempt.
///
/// One quote is in effect at a time; a re-quote supersedes it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    /// Distance from the restaurant, when it could be computed.
    pub distance_km: Option<f64>,
    /// Delivery charge in rupees.
    pub charge: i64,
    /// Order value above which delivery is free, if offered.
    pub free_delivery_threshold: Option<i64>,
}

impl DeliveryQuote {
    /// Price a distance. Total over all inputs: absent or non-finite
    /// distances quote the flat fallback with no free-delivery offer, and
    /// negative distances clamp to zero.
    pub fn for_distance(distance_km: Option<f64>) -> Self {
        let km = match distance_km {
            Some(d) if d.is_finite() => d.max(0.0),
            _ => {
                return Self {
                    distance_km: None,
                    charge: FALLBACK_DELIVERY_CHARGE,
                    free_delivery_threshold: None,
                }
            }
        };

        Self {
            distance_km: Some(km),
            charge: charge_for_distance(km),
            free_delivery_threshold: free_delivery_threshold(km),
        }
    }

    /// Quote delivery from the restaurant origin to a customer point.
    ///
    /// The reported distance is rounded to two decimals; pricing uses the
    /// unrounded value.
    pub fn between(origin: &GeoPoint, dest: &GeoPoint) -> Self {
        if !origin.is_finite() || !dest.is_finite() {
            return Self::for_distance(None);
        }
        let km = origin.distance_km(dest);
        let mut quote = Self::for_distance(Some(km));
        quote.distance_km = Some((km * 100.0).round() / 100.0);
        quote
    }

    /// The quote used when no distance is available.
    pub fn fallback() -> Self {
        Self::for_distance(None)
    }

    /// Fallback quote with an operator-configured charge.
    pub fn fallback_with_charge(charge: i64) -> Self {
        Self {
            distance_km: None,
            charge,
            free_delivery_threshold: None,
        }
    }
}

/// Request body of the delivery pricing endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeliveryChargeRequest {
    /// Customer latitude; may be absent.
    pub lat: Option<f64>,
    /// Customer longitude; may be absent.
    pub lng: Option<f64>,
}

/// Response body of the delivery pricing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryChargeResponse {
    /// Distance in kilometers, rounded to two decimals; null when the
    /// customer could not be located.
    pub distance_km: Option<f64>,
    /// Quoted delivery charge.
    pub delivery_charge: i64,
    /// Free-delivery threshold, if offered at this distance.
    pub free_delivery_threshold: Option<i64>,
}

/// Price a delivery request against the restaurant origin.
///
/// Missing or non-finite coordinates produce the fallback quote rather than
/// an error.
pub fn quote_for_request(origin: &GeoPoint, req: &DeliveryChargeRequest) -> DeliveryChargeResponse {
    let quote = match (req.lat, req.lng) {
        (Some(lat), Some(lng)) => DeliveryQuote::between(origin, &GeoPoint::new(lat, lng)),
        _ => DeliveryQuote::fallback(),
    };
    DeliveryChargeResponse::from(quote)
}

impl From<DeliveryQuote> for DeliveryChargeResponse {
    fn from(q: DeliveryQuote) -> Self {
        Self {
            distance_km: q.distance_km,
            delivery_charge: q.charge,
            free_delivery_threshold: q.free_delivery_threshold,
        }
    }
}

/// Outcome of the location/pricing pipeline, as seen by the cart.
///
/// Replaced wholesale on every acquisition attempt. Denial is a first-class
/// branch, not an error state: it carries its own fallback charge and never
/// grants free delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationState {
    /// No acquisition attempt has completed yet.
    Pending,
    /// Location captured and a quote is in effect.
    Confirmed {
        location: CapturedLocation,
        quote: DeliveryQuote,
    },
    /// Geolocation denied, unavailable, or timed out.
    Denied { fallback_charge: i64 },
}

impl LocationState {
    /// Whether a confirmed location backs the current quote.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, LocationState::Confirmed { .. })
    }

    /// The delivery charge before any waiver.
    pub fn charge(&self) -> i64 {
        match self {
            LocationState::Pending => 0,
            LocationState::Confirmed { quote, .. } => quote.charge,
            LocationState::Denied { fallback_charge } => *fallback_charge,
        }
    }

    /// The free-delivery threshold, if a confirmed quote offers one.
    ///
    /// Denied and pending states never offer free delivery.
    pub fn free_delivery_threshold(&self) -> Option<i64> {
        match self {
            LocationState::Confirmed { quote, .. } => quote.free_delivery_threshold,
            _ => None,
        }
    }

    /// Distance of the confirmed quote, when known.
    pub fn distance_km(&self) -> Option<f64> {
        match self {
            LocationState::Confirmed { quote, .. } => quote.distance_km,
            _ => None,
        }
    }

    /// The captured location fix, when confirmed.
    pub fn captured(&self) -> Option<&CapturedLocation> {
        match self {
            LocationState::Confirmed { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl Default for LocationState {
    fn default() -> Self {
        LocationState::Pending
    }
}
