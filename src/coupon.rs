//! Coupon rules and validation.
//!
//! Coupons are never locked in: the book is re-consulted on every cart
//! recompute, so a coupon that stops qualifying after items are removed
//! silently stops applying. That is policy, not a bug.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A coupon definition from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRule {
    /// Minimum order subtotal for the coupon to qualify.
    #[serde(default)]
    pub min_order: i64,
    /// Discount amount: rupees for flat rules, percent for percent rules.
    #[serde(default)]
    pub discount: i64,
    /// Whether `discount` is a percentage of the subtotal.
    #[serde(default)]
    pub is_percent: bool,
    /// Cap on the computed discount for percent rules; 0 means uncapped.
    #[serde(default)]
    pub max_discount: i64,
    /// Waive the delivery charge in addition to any monetary discount.
    #[serde(default)]
    pub free_delivery: bool,
    /// Waive the delivery charge only; no monetary discount.
    #[serde(default)]
    pub free_delivery_only: bool,
    /// Whether the coupon is currently usable.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CouponRule {
    /// A flat-amount coupon.
    pub fn flat(min_order: i64, discount: i64) -> Self {
        Self {
            min_order,
            discount,
            is_percent: false,
            max_discount: 0,
            free_delivery: false,
            free_delivery_only: false,
            active: true,
        }
    }

    /// A percentage coupon with an optional cap (0 = uncapped).
    pub fn percent(min_order: i64, percent: i64, max_discount: i64) -> Self {
        Self {
            min_order,
            discount: percent,
            is_percent: true,
            max_discount,
            free_delivery: false,
            free_delivery_only: false,
            active: true,
        }
    }

    /// A coupon that only waives the delivery charge.
    pub fn free_delivery_only(min_order: i64) -> Self {
        Self {
            min_order,
            discount: 0,
            is_percent: false,
            max_discount: 0,
            free_delivery: false,
            free_delivery_only: true,
            active: true,
        }
    }

    /// Also waive the delivery charge alongside the monetary discount.
    pub fn with_free_delivery(mut self) -> Self {
        self.free_delivery = true;
        self
    }

    /// Monetary discount for a qualifying subtotal.
    ///
    /// Floored and never negative; percent rules are capped by
    /// `max_discount` when that cap is positive.
    fn monetary_discount(&self, subtotal: i64) -> i64 {
        if self.free_delivery_only {
            return 0;
        }
        let raw = if self.is_percent {
            let computed = subtotal * self.discount / 100;
            if self.max_discount > 0 {
                computed.min(self.max_discount)
            } else {
                computed
            }
        } else {
            self.discount
        };
        raw.max(0)
    }

    /// Whether the rule waives the delivery charge.
    fn waives_delivery(&self) -> bool {
        self.free_delivery || self.free_delivery_only
    }
}

/// Result of validating an entered coupon against a subtotal.
///
/// `applied` distinguishes "entered but not yet qualifying" (None) from an
/// actually applied coupon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CouponOutcome {
    /// Monetary discount in rupees.
    pub discount: i64,
    /// Whether the delivery charge is waived.
    pub waive_delivery: bool,
    /// The coupon code that applied, if any.
    pub applied: Option<String>,
}

impl CouponOutcome {
    /// No coupon applied.
    pub fn none() -> Self {
        Self::default()
    }
}

/// The coupon catalog, keyed by uppercase code.
///
/// Loads asynchronously and independently of the cart; an empty book (the
/// not-yet-loaded state) simply means no coupon ever validates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponBook {
    rules: HashMap<String, CouponRule>,
}

impl CouponBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the legacy `code -> rule` JSON map.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let mut book: Self = serde_json::from_str(json)?;
        book.rules = book
            .rules
            .into_iter()
            .map(|(code, rule)| (code.to_uppercase(), rule))
            .collect();
        Ok(book)
    }

    /// Add a rule under its normalized code.
    pub fn insert(&mut self, code: impl Into<String>, rule: CouponRule) {
        self.rules.insert(code.into().to_uppercase(), rule);
    }

    /// Look up a rule, matching the code case-insensitively.
    pub fn get(&self, code: &str) -> Option<&CouponRule> {
        self.rules.get(&code.trim().to_uppercase())
    }

    /// Number of rules in the book.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the book has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate an entered code against a subtotal.
    ///
    /// Unknown, inactive, or under-minimum coupons yield a zero outcome with
    /// `applied: None`. Re-run on every subtotal change.
    pub fn apply(&self, subtotal: i64, entered: Option<&str>) -> CouponOutcome {
        let Some(entered) = entered else {
            return CouponOutcome::none();
        };
        let code = entered.trim().to_uppercase();
        if code.is_empty() {
            return CouponOutcome::none();
        }

        let Some(rule) = self.rules.get(&code) else {
            return CouponOutcome::none();
        };
        if !rule.active {
            return CouponOutcome::none();
        }
        if subtotal < rule.min_order {
            tracing::debug!(
                coupon = %code,
                subtotal,
                min_order = rule.min_order,
                "coupon entered but below minimum order"
            );
            return CouponOutcome::none();
        }

        CouponOutcome {
            discount: rule.monetary_discount(subtotal),
            waive_delivery: rule.waives_delivery(),
            applied: Some(code),
        }
    }
}
