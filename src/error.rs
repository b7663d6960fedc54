//! Storefront error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in storefront operations.
///
/// Input errors and upstream unavailability inside the reconciliation path are
/// handled by fallback branches and never surface through this enum; it covers
/// the genuinely blocking cases (validation, lifecycle misuse) and pipeline
/// diagnostics.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Quantity delta produced an unusable value.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Item not present in the menu catalog.
    #[error("Unknown menu item: {0}")]
    UnknownItem(String),

    /// A required customer field was left empty at submission.
    #[error("Missing customer field: {0}")]
    MissingCustomerField(&'static str),

    /// The kitchen is closed for the selected order date.
    #[error("Ordering is closed for {0}")]
    OrderingClosed(NaiveDate),

    /// Operation requires a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid cart lifecycle transition.
    #[error("Invalid cart transition from {from} to {to}")]
    InvalidState {
        from: &'static str,
        to: &'static str,
    },

    /// Geolocation could not be acquired.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Delivery quote service failed.
    #[error("Delivery quote unavailable: {0}")]
    QuoteUnavailable(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}
