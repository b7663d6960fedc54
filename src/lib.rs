//! Storefront ordering domain for MealSpot.
//!
//! Domain types and logic for an online food-ordering storefront:
//!
//! - **Geo**: great-circle distance between customer and kitchen
//! - **Delivery**: distance-tiered charges and free-delivery thresholds
//! - **Coupons**: catalog lookup and subtotal-driven validation
//! - **Schedule**: kitchen closures and section availability windows
//! - **Cart**: the reconciliation state machine that keeps totals,
//!   discounts, waivers, and availability consistent
//! - **Orders**: snapshot assembly for the messaging handoff
//!
//! Rendering, HTTP plumbing, and the admin console live elsewhere; this
//! crate is the pure state-transition side of the storefront.
//!
//! # Example
//!
//! ```rust
//! use mealspot_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! cart.set_location(LocationState::Confirmed {
//!     location: CapturedLocation::now(GeoPoint::new(18.98, 73.02)),
//!     quote: DeliveryQuote::for_distance(Some(8.0)),
//! });
//! cart.set_quantity("lunch__Veg Thali", "Veg Thali", Some(400), 4).unwrap();
//!
//! let totals = cart.recompute(&CouponBook::new());
//! assert!(totals.delivery_waived); // 1600 >= the 1500 threshold at 8 km
//! assert_eq!(totals.final_total, 1600);
//! ```

pub mod cart;
pub mod config;
pub mod coupon;
pub mod delivery;
pub mod error;
pub mod geo;
pub mod menu;
pub mod order;
pub mod pipeline;
pub mod schedule;

pub use cart::{Cart, CartStatus, CartTotals};
pub use config::StorefrontConfig;
pub use delivery::DeliveryQuote;
pub use error::StorefrontError;
pub use geo::GeoPoint;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartLine, CartStatus, CartTotals};
    pub use crate::config::StorefrontConfig;
    pub use crate::coupon::{CouponBook, CouponOutcome, CouponRule};
    pub use crate::delivery::{
        DeliveryChargeRequest, DeliveryChargeResponse, DeliveryQuote, LocationState,
        FALLBACK_DELIVERY_CHARGE,
    };
    pub use crate::error::StorefrontError;
    pub use crate::geo::{CapturedLocation, GeoPoint};
    pub use crate::menu::{ExtraOption, Menu, MenuItem, MenuSection};
    pub use crate::order::{CustomerDetails, LineSummary, OrderSnapshot};
    pub use crate::pipeline::{
        acquire_delivery_quote, LocalQuoteService, LocationSource, QuoteService,
    };
    pub use crate::schedule::{
        AvailabilityContext, ClosureWindow, KitchenCalendar, KitchenStateBlob, OrderDay,
    };
}
