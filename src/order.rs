//! Order snapshot assembly for the messaging handoff.
//!
//! Submission serializes a snapshot of the reconciled cart state. The
//! transport (messaging link, sheet logging) lives outside this crate; the
//! logging side-channel is fire-and-forget and must never block or fail the
//! primary submission path.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine, CartStatus};
use crate::error::StorefrontError;

/// Customer details collected at confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Customer name; required.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Delivery address; required.
    pub address: String,
    /// Free-form notes.
    pub notes: String,
}

impl CustomerDetails {
    /// Check the required fields.
    ///
    /// Surfaced synchronously as a blocking validation message; submission
    /// does not proceed without name and address.
    pub fn validate(&self) -> Result<(), StorefrontError> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::MissingCustomerField("name"));
        }
        if self.address.trim().is_empty() {
            return Err(StorefrontError::MissingCustomerField("address"));
        }
        Ok(())
    }
}

/// One ordered line, denormalized for the handoff message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    /// Item display name.
    pub name: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Names of selected add-ons.
    pub extras: Vec<String>,
    /// Line total including add-ons.
    pub line_total: i64,
}

impl LineSummary {
    fn from_line(line: &CartLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            extras: line.extras.keys().cloned().collect(),
            line_total: line.line_total(),
        }
    }

    /// Render the line the way the handoff message does.
    pub fn describe(&self) -> String {
        let extras = if self.extras.is_empty() {
            String::new()
        } else {
            let joined = self
                .extras
                .iter()
                .map(|e| format!("+ {e}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" ({joined})")
        };
        format!(
            "\u{2022} {} x {}{} = \u{20b9}{}",
            self.name, self.quantity, extras, self.line_total
        )
    }
}

/// Captured location details attached to the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Device-reported accuracy, meters.
    pub accuracy: Option<f64>,
    /// When the fix was captured.
    pub captured_at: DateTime<Utc>,
    /// Quoted distance, when known.
    pub distance_km: Option<f64>,
    /// Google Maps link for the rider.
    pub maps_url: String,
}

/// Serialized snapshot of a reconciled, confirmed cart.
///
/// Building one is the `Confirming -> Submitted` transition: the source cart
/// is frozen and emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    /// Order identifier, `RAY-<unix-millis>`.
    pub order_id: String,
    /// The service date the order targets.
    pub order_for: NaiveDate,
    /// Human label for the service date.
    pub order_for_label: String,
    /// Customer details.
    pub customer: CustomerDetails,
    /// Ordered lines.
    pub lines: Vec<LineSummary>,
    /// Items subtotal.
    pub subtotal: i64,
    /// Coupon discount.
    pub discount: i64,
    /// Applied or entered coupon code, if any.
    pub coupon_code: Option<String>,
    /// Delivery charge after any waiver.
    pub delivery_charge: i64,
    /// True when the location was denied and the charge is an estimate
    /// settled on confirmation.
    pub delivery_estimated: bool,
    /// Captured location, when available.
    pub location: Option<LocationPayload>,
    /// Payable total.
    pub final_total: i64,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

impl OrderSnapshot {
    /// Take a snapshot of a confirming cart and freeze it.
    ///
    /// Requires the cart to be in `Confirming` state with totals already
    /// recomputed; validation failures leave the cart untouched.
    pub fn build(
        cart: &mut Cart,
        customer: CustomerDetails,
        order_for: NaiveDate,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, StorefrontError> {
        customer.validate()?;
        if cart.status() != CartStatus::Confirming {
            return Err(StorefrontError::InvalidState {
                from: cart.status().as_str(),
                to: "submitted",
            });
        }

        let totals = cart.totals().clone();
        let lines: Vec<LineSummary> = cart.lines().map(LineSummary::from_line).collect();
        let coupon_code = totals
            .applied_coupon
            .clone()
            .or_else(|| cart.entered_coupon().map(str::to_string));
        let delivery_estimated = !cart.location().is_confirmed();
        let distance_km = cart.location().distance_km();
        let location = cart.location().captured().map(|c| LocationPayload {
            lat: c.point.lat,
            lng: c.point.lng,
            accuracy: c.accuracy,
            captured_at: c.captured_at,
            distance_km,
            maps_url: c.point.maps_url(),
        });

        cart.mark_submitted()?;

        Ok(Self {
            order_id: generate_order_id(now),
            order_for,
            order_for_label: order_for_label(order_for, today),
            customer,
            lines,
            subtotal: totals.subtotal,
            discount: totals.discount,
            coupon_code,
            delivery_charge: totals.applied_delivery_charge,
            delivery_estimated,
            location,
            final_total: totals.final_total,
            created_at: now,
        })
    }

    /// Plain-text receipt for the messaging handoff.
    pub fn receipt_text(&self) -> String {
        let mut out = format!(
            "New Order {}\nOrder For: {} ({})\n\nName: {}\nPhone: {}\nAddress: {}\n",
            self.order_id,
            self.order_for_label,
            self.order_for,
            self.customer.name,
            self.customer.phone,
            self.customer.address,
        );
        if let Some(loc) = &self.location {
            out.push_str(&format!("Location: {}\n", loc.maps_url));
        }

        out.push_str("\nItems Ordered:\n");
        for line in &self.lines {
            out.push_str(&line.describe());
            out.push('\n');
        }

        out.push('\n');
        if self.delivery_estimated {
            out.push_str(&format!(
                "Delivery & Packing (actuals): \u{20b9}{}\n",
                self.delivery_charge
            ));
        } else {
            out.push_str(&format!("Delivery Charge: \u{20b9}{}\n", self.delivery_charge));
        }
        if let Some(code) = &self.coupon_code {
            if self.discount > 0 {
                out.push_str(&format!(
                    "Coupon Discount ({code}): -\u{20b9}{}\n",
                    self.discount
                ));
            } else {
                out.push_str(&format!("Coupon Applied ({code}): \u{20b9}0\n"));
            }
        }
        out.push_str(&format!("----------------------\nTotal: \u{20b9}{}", self.final_total));
        out
    }
}

/// Order id derived from the submission time.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    format!("RAY-{}", now.timestamp_millis())
}

/// Human label for the order-for date: Today, Tomorrow, or a short date.
pub fn order_for_label(selected: NaiveDate, today: NaiveDate) -> String {
    let diff = (selected - today).num_days();
    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => format!(
            "{}, {} {}",
            selected.format("%a"),
            selected.day(),
            selected.format("%b")
        ),
    }
}
