//! Cart reconciliation state machine.
//!
//! The cart owns its lines and the currently-applied delivery and coupon
//! values, and recomputes a consistent total whenever any input changes.
//! Recomputation is an explicit, idempotent pipeline stage invoked after
//! every mutation, never a hidden side effect of rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coupon::CouponBook;
use crate::delivery::LocationState;
use crate::error::StorefrontError;
use crate::menu::{is_market_price_item, is_motd_item, section_of, Menu};
use crate::schedule::{AvailabilityContext, KitchenCalendar};
use chrono::NaiveDate;

/// Lifecycle state of a cart instance.
///
/// `Submitted` is terminal; a new order starts with a fresh cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CartStatus {
    /// No lines.
    #[default]
    Empty,
    /// At least one line; mutations self-transition here.
    HasItems,
    /// Customer details being collected for submission.
    Confirming,
    /// Order snapshot taken; this instance is frozen.
    Submitted,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Empty => "empty",
            CartStatus::HasItems => "has_items",
            CartStatus::Confirming => "confirming",
            CartStatus::Submitted => "submitted",
        }
    }
}

/// A line in the cart.
///
/// A line with quantity <= 0 does not exist; it is removed, not zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stable item id (`section__name`).
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Unit price in rupees; market-price items carry none.
    pub unit_price: Option<i64>,
    /// Quantity, always positive.
    pub quantity: i64,
    /// Selected add-ons, name to per-unit price.
    pub extras: BTreeMap<String, i64>,
}

impl CartLine {
    /// Total for this line: (unit price + extras) x quantity.
    ///
    /// A price-unknown item contributes only its extras, which in practice
    /// means nothing.
    pub fn line_total(&self) -> i64 {
        let extras: i64 = self.extras.values().sum();
        (self.unit_price.unwrap_or(0) + extras) * self.quantity
    }

    /// Whether this line counts toward the free-delivery-eligible subtotal.
    pub fn counts_toward_free_delivery(&self) -> bool {
        !is_market_price_item(&self.item_id)
    }
}

/// Derived totals from the last recompute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of all line totals.
    pub subtotal: i64,
    /// Subtotal excluding market-price lines.
    pub free_eligible_subtotal: i64,
    /// Coupon discount, floored and never negative.
    pub discount: i64,
    /// The coupon that actually applied, if any.
    pub applied_coupon: Option<String>,
    /// Whether the delivery charge was waived.
    pub delivery_waived: bool,
    /// Delivery charge after any waiver.
    pub applied_delivery_charge: i64,
    /// Payable total, clamped at zero.
    pub final_total: i64,
}

/// The cart aggregate.
///
/// All mutations arrive from serialized user-interface events, so the cart
/// is a plain owned value with no interior locking. Call
/// [`Cart::recompute`] after every mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    status: CartStatus,
    lines: BTreeMap<String, CartLine>,
    location: LocationState,
    entered_coupon: Option<String>,
    totals: CartTotals,
}

impl Cart {
    /// A fresh, empty cart.
    pub fn new() -> Self {
        Self {
            status: CartStatus::Empty,
            lines: BTreeMap::new(),
            location: LocationState::Pending,
            entered_coupon: None,
            totals: CartTotals::default(),
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> CartStatus {
        self.status
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count, summing quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.values().map(|l| l.quantity).sum()
    }

    /// Iterate the lines.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Look up a line by item id.
    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.get(item_id)
    }

    /// Totals from the last recompute.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// The delivery state currently in effect.
    pub fn location(&self) -> &LocationState {
        &self.location
    }

    /// The entered coupon code, normalized, whether or not it applies.
    pub fn entered_coupon(&self) -> Option<&str> {
        self.entered_coupon.as_deref()
    }

    fn guard_not_submitted(&self, to: &'static str) -> Result<(), StorefrontError> {
        if self.status == CartStatus::Submitted {
            return Err(StorefrontError::InvalidState {
                from: self.status.as_str(),
                to,
            });
        }
        Ok(())
    }

    /// Re-derive `Empty`/`HasItems` after a mutation. A mutation during
    /// confirmation drops back to `HasItems`; the caller re-confirms.
    fn sync_status_after_mutation(&mut self) {
        self.status = if self.lines.is_empty() {
            CartStatus::Empty
        } else {
            CartStatus::HasItems
        };
    }

    /// Apply a quantity delta to a line, creating or removing it as needed.
    ///
    /// The quantity floor is 0 (the line is deleted); no upper bound is
    /// enforced here. Availability rendering may disable further increments
    /// upstream, but the state machine does not reject them.
    pub fn set_quantity(
        &mut self,
        item_id: &str,
        name: &str,
        unit_price: Option<i64>,
        delta: i64,
    ) -> Result<(), StorefrontError> {
        self.guard_not_submitted("has_items")?;

        let line = self.lines.entry(item_id.to_string()).or_insert(CartLine {
            item_id: item_id.to_string(),
            name: name.to_string(),
            unit_price,
            quantity: 0,
            extras: BTreeMap::new(),
        });
        line.quantity += delta;

        if line.quantity <= 0 {
            self.lines.remove(item_id);
        }
        self.sync_status_after_mutation();
        Ok(())
    }

    /// Enable or disable an add-on on an existing line.
    ///
    /// Ignored when the line is absent.
    pub fn set_extra(
        &mut self,
        item_id: &str,
        extra_name: &str,
        price: i64,
        enabled: bool,
    ) -> Result<(), StorefrontError> {
        self.guard_not_submitted("has_items")?;

        if let Some(line) = self.lines.get_mut(item_id) {
            if enabled {
                line.extras.insert(extra_name.to_string(), price);
            } else {
                line.extras.remove(extra_name);
            }
        }
        Ok(())
    }

    /// Replace the delivery state wholesale.
    ///
    /// On denial the charge falls back to the configured default and the
    /// free-delivery offer disappears; denial never silently grants free
    /// delivery.
    pub fn set_location(&mut self, location: LocationState) {
        self.location = location;
    }

    /// Store an entered coupon code for the next recompute.
    ///
    /// Validation is decoupled from entry: the code is checked against the
    /// book whenever totals are recomputed, so a late-loading catalog is
    /// picked up automatically.
    pub fn set_coupon(&mut self, code: &str) {
        let normalized = code.trim().to_uppercase();
        self.entered_coupon = if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        };
    }

    /// Drop the entered coupon.
    pub fn clear_coupon(&mut self) {
        self.entered_coupon = None;
    }

    /// Recompute all derived totals from the current inputs.
    ///
    /// Idempotent: with no state change, a second call yields identical
    /// totals. The steps, in order: subtotal, free-eligible subtotal,
    /// coupon validation, waiver threshold, applied delivery charge,
    /// payable total.
    pub fn recompute(&mut self, coupons: &CouponBook) -> CartTotals {
        let subtotal: i64 = self.lines.values().map(CartLine::line_total).sum();
        let free_eligible_subtotal: i64 = self
            .lines
            .values()
            .filter(|l| l.counts_toward_free_delivery())
            .map(CartLine::line_total)
            .sum();

        let outcome = coupons.apply(subtotal, self.entered_coupon.as_deref());
        if outcome.applied.is_none() && self.totals.applied_coupon.is_some() {
            tracing::debug!(
                coupon = self.totals.applied_coupon.as_deref(),
                subtotal,
                "coupon no longer qualifies, dropping silently"
            );
        }

        let discount = outcome.discount.max(0);
        let eligible_after_discount = (free_eligible_subtotal - discount).max(0);

        let effective_threshold = if outcome.waive_delivery {
            Some(0)
        } else {
            self.location.free_delivery_threshold()
        };
        let delivery_waived = self.location.is_confirmed()
            && effective_threshold
                .map(|t| eligible_after_discount >= t)
                .unwrap_or(false);
        let applied_delivery_charge = if delivery_waived {
            0
        } else {
            self.location.charge()
        };

        let final_total = (subtotal - discount + applied_delivery_charge).max(0);

        self.totals = CartTotals {
            subtotal,
            free_eligible_subtotal,
            discount,
            applied_coupon: outcome.applied,
            delivery_waived,
            applied_delivery_charge,
            final_total,
        };
        tracing::debug!(
            subtotal,
            discount,
            applied_delivery_charge,
            final_total,
            "cart recomputed"
        );
        self.totals.clone()
    }

    /// Purge lines whose availability window has closed.
    ///
    /// Intended to run whenever the menu or the clock rolls over a cutoff.
    /// Menu-of-the-day lines ignore normal section availability and are
    /// exempt. Returns the number of lines removed.
    pub fn purge_unavailable(&mut self, menu: &Menu, ctx: &AvailabilityContext<'_>) -> usize {
        let before = self.lines.len();
        self.lines.retain(|id, _| {
            if is_motd_item(id) {
                return true;
            }
            if !ctx.section_available(section_of(id)) {
                return false;
            }
            // An item explicitly flagged unavailable goes too; items missing
            // from the (possibly not-yet-loaded) menu are left alone.
            !matches!(menu.find_item(id), Some(item) if !item.available)
        });
        let removed = before - self.lines.len();
        if removed > 0 {
            tracing::debug!(removed, "purged unavailable cart lines");
            self.sync_status_after_mutation();
        }
        removed
    }

    /// Reset to `Empty`.
    ///
    /// The delivery quote survives only while the location is still
    /// confirmed; a denied or pending session resets to `Pending` so a stale
    /// fallback charge cannot leak into a fresh cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.entered_coupon = None;
        self.totals = CartTotals::default();
        if !self.location.is_confirmed() {
            self.location = LocationState::Pending;
        }
        self.status = CartStatus::Empty;
    }

    /// Move to `Confirming` ahead of order submission.
    ///
    /// Requires a non-empty cart and an open kitchen for the selected date.
    pub fn begin_confirmation(
        &mut self,
        calendar: &KitchenCalendar,
        selected: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), StorefrontError> {
        self.guard_not_submitted("confirming")?;
        if self.lines.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        if calendar.is_closed(selected, today) {
            return Err(StorefrontError::OrderingClosed(selected));
        }
        self.status = CartStatus::Confirming;
        Ok(())
    }

    /// Abandon confirmation and return to `HasItems`.
    pub fn cancel_confirmation(&mut self) {
        if self.status == CartStatus::Confirming {
            self.status = CartStatus::HasItems;
        }
    }

    /// Freeze this instance after a snapshot is taken and empty it.
    pub(crate) fn mark_submitted(&mut self) -> Result<(), StorefrontError> {
        if self.status != CartStatus::Confirming {
            return Err(StorefrontError::InvalidState {
                from: self.status.as_str(),
                to: "submitted",
            });
        }
        self.lines.clear();
        self.entered_coupon = None;
        self.status = CartStatus::Submitted;
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}
