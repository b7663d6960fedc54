//! Kitchen closures, order-day resolution, and section availability windows.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minute of the day at which the kitchen starts taking orders (7:00 AM).
pub const OPENING_MINUTE: u32 = 7 * 60;

/// Minute of the day at which same-day breakfast orders end (9:00 AM).
pub const BREAKFAST_CUTOFF_MINUTE: u32 = 9 * 60;

/// Minute of the day at which the menu-of-the-day closes (9:00 PM).
pub const MOTD_CUTOFF_MINUTE: u32 = 21 * 60;

/// Section key for breakfast, which has its own same-day cutoff.
pub const BREAKFAST_SECTION: &str = "breakfast";

/// How far ahead to scan when looking for the next open date.
const NEXT_OPEN_SCAN_DAYS: u64 = 90;

/// Which service day an order targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDay {
    /// Delivery today.
    Today,
    /// Delivery on a later date.
    Tomorrow,
}

impl OrderDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDay::Today => "today",
            OrderDay::Tomorrow => "tomorrow",
        }
    }
}

/// An inclusive range of dates on which the kitchen is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosureWindow {
    /// First closed date.
    pub start_date: NaiveDate,
    /// Last closed date; a single-day closure omits it.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ClosureWindow {
    /// A single-day closure.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start_date: date,
            end_date: None,
        }
    }

    /// A multi-day closure.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: start,
            end_date: Some(end),
        }
    }

    /// Whether a date falls inside this window (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        let end = self.end_date.unwrap_or(self.start_date);
        date >= self.start_date && date <= end
    }
}

/// The kitchen's closure calendar.
///
/// Read-only input from the state endpoint; "kitchen closed for the selected
/// date" is treated identically to "no sections available".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenCalendar {
    /// Ad-hoc same-day closure switch.
    pub closed_today: bool,
    /// Planned closure windows.
    pub closures: Vec<ClosureWindow>,
}

impl KitchenCalendar {
    /// An always-open calendar.
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether the kitchen is closed on `date`, given the current date.
    pub fn is_closed(&self, date: NaiveDate, today: NaiveDate) -> bool {
        if self.closed_today && date == today {
            return true;
        }
        self.closures.iter().any(|c| c.contains(date))
    }

    /// First open date at or after `from`, scanning up to 90 days out.
    ///
    /// Falls back to `from` itself if every scanned day is closed.
    pub fn next_open_date(&self, from: NaiveDate, today: NaiveDate) -> NaiveDate {
        for i in 0..NEXT_OPEN_SCAN_DAYS {
            if let Some(candidate) = from.checked_add_days(Days::new(i)) {
                if !self.is_closed(candidate, today) {
                    return candidate;
                }
            }
        }
        from
    }

    /// Resolve a requested order-for date to an open one.
    ///
    /// A closed selection moves forward to the next open date.
    pub fn resolve_order_date(&self, selected: NaiveDate, today: NaiveDate) -> NaiveDate {
        if self.is_closed(selected, today) {
            let next = self.next_open_date(selected, today);
            tracing::debug!(%selected, %next, "selected date is closed, moving forward");
            next
        } else {
            selected
        }
    }

    /// Which service day an order for `selected` targets.
    ///
    /// Closed-today forces `Tomorrow` even when today is selected.
    pub fn order_day(&self, selected: NaiveDate, today: NaiveDate) -> OrderDay {
        if selected > today {
            OrderDay::Tomorrow
        } else if self.closed_today {
            OrderDay::Tomorrow
        } else {
            OrderDay::Today
        }
    }
}

/// Wire shape of the state endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenStateBlob {
    /// Whether the kitchen is closed today.
    #[serde(default)]
    pub kitchen_closed_today: bool,
    /// Planned closures.
    #[serde(default)]
    pub closures: Vec<ClosureWindow>,
}

impl From<KitchenStateBlob> for KitchenCalendar {
    fn from(blob: KitchenStateBlob) -> Self {
        Self {
            closed_today: blob.kitchen_closed_today,
            closures: blob.closures,
        }
    }
}

/// Everything needed to decide whether a menu section is orderable
/// right now for the selected date.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityContext<'a> {
    /// The closure calendar.
    pub calendar: &'a KitchenCalendar,
    /// The current date.
    pub today: NaiveDate,
    /// The order-for date.
    pub selected: NaiveDate,
    /// Minutes since midnight, local time.
    pub now_minutes: u32,
}

impl<'a> AvailabilityContext<'a> {
    /// Build a context for a selected order date.
    pub fn new(
        calendar: &'a KitchenCalendar,
        today: NaiveDate,
        selected: NaiveDate,
        now_minutes: u32,
    ) -> Self {
        Self {
            calendar,
            today,
            selected,
            now_minutes,
        }
    }

    /// Service day derived from the selected date.
    pub fn order_day(&self) -> OrderDay {
        self.calendar.order_day(self.selected, self.today)
    }

    /// Whether a section is orderable for the selected date.
    ///
    /// Orders for a later date bypass the time-of-day cutoffs; same-day
    /// orders open at 7:00 AM, and breakfast closes at 9:00 AM.
    pub fn section_available(&self, key: &str) -> bool {
        if self.calendar.is_closed(self.selected, self.today) {
            return false;
        }
        if self.order_day() == OrderDay::Tomorrow {
            return true;
        }
        if self.now_minutes < OPENING_MINUTE {
            return false;
        }
        if key == BREAKFAST_SECTION {
            return self.now_minutes < BREAKFAST_CUTOFF_MINUTE;
        }
        true
    }

    /// Whether the menu-of-the-day is currently orderable.
    ///
    /// Its window is 7:00 AM to 9:00 PM, and it respects a same-day closure.
    pub fn motd_available(&self) -> bool {
        if self.now_minutes >= MOTD_CUTOFF_MINUTE {
            return false;
        }
        if self.order_day() == OrderDay::Tomorrow {
            return true;
        }
        if self.calendar.is_closed(self.selected, self.today) {
            return false;
        }
        self.now_minutes >= OPENING_MINUTE
    }

    /// Customer-facing label for an unavailable section, if any.
    pub fn availability_label(&self, key: &str) -> Option<&'static str> {
        if self.section_available(key) {
            return None;
        }

        let today_selected = self.selected == self.today;
        if self.calendar.is_closed(self.selected, self.today) {
            return Some(if today_selected {
                "Ordering for today is closed"
            } else {
                "Kitchen is closed for selected date"
            });
        }
        if today_selected && self.now_minutes < OPENING_MINUTE {
            return Some("Opens at 7:00 AM");
        }
        if key == BREAKFAST_SECTION && today_selected && self.now_minutes >= BREAKFAST_CUTOFF_MINUTE
        {
            return Some("Breakfast ended for today");
        }
        Some("Available on the next open day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_closure_window_inclusive() {
        let w = ClosureWindow::range(d(2025, 9, 10), d(2025, 9, 12));
        assert!(!w.contains(d(2025, 9, 9)));
        assert!(w.contains(d(2025, 9, 10)));
        assert!(w.contains(d(2025, 9, 11)));
        assert!(w.contains(d(2025, 9, 12)));
        assert!(!w.contains(d(2025, 9, 13)));
    }

    #[test]
    fn test_single_day_closure() {
        let w = ClosureWindow::single(d(2025, 9, 10));
        assert!(w.contains(d(2025, 9, 10)));
        assert!(!w.contains(d(2025, 9, 11)));
    }

    #[test]
    fn test_closed_today_only_affects_today() {
        let cal = KitchenCalendar {
            closed_today: true,
            closures: vec![],
        };
        let today = d(2025, 9, 1);
        assert!(cal.is_closed(today, today));
        assert!(!cal.is_closed(d(2025, 9, 2), today));
    }

    #[test]
    fn test_next_open_date_skips_closures() {
        let cal = KitchenCalendar {
            closed_today: false,
            closures: vec![ClosureWindow::range(d(2025, 9, 2), d(2025, 9, 4))],
        };
        let today = d(2025, 9, 1);
        assert_eq!(cal.next_open_date(d(2025, 9, 2), today), d(2025, 9, 5));
        assert_eq!(cal.next_open_date(d(2025, 9, 1), today), d(2025, 9, 1));
    }

    #[test]
    fn test_resolve_order_date() {
        let cal = KitchenCalendar {
            closed_today: true,
            closures: vec![],
        };
        let today = d(2025, 9, 1);
        assert_eq!(cal.resolve_order_date(today, today), d(2025, 9, 2));
        assert_eq!(cal.resolve_order_date(d(2025, 9, 3), today), d(2025, 9, 3));
    }

    #[test]
    fn test_closed_today_forces_tomorrow() {
        let cal = KitchenCalendar {
            closed_today: true,
            closures: vec![],
        };
        let today = d(2025, 9, 1);
        assert_eq!(cal.order_day(today, today), OrderDay::Tomorrow);

        let open = KitchenCalendar::open();
        assert_eq!(open.order_day(today, today), OrderDay::Today);
        assert_eq!(open.order_day(d(2025, 9, 2), today), OrderDay::Tomorrow);
    }

    #[test]
    fn test_sections_closed_before_opening() {
        let cal = KitchenCalendar::open();
        let today = d(2025, 9, 1);
        let early = AvailabilityContext::new(&cal, today, today, 6 * 60);
        assert!(!early.section_available("lunch"));
        assert_eq!(early.availability_label("lunch"), Some("Opens at 7:00 AM"));

        let open = AvailabilityContext::new(&cal, today, today, 8 * 60);
        assert!(open.section_available("lunch"));
        assert_eq!(open.availability_label("lunch"), None);
    }

    #[test]
    fn test_breakfast_cutoff() {
        let cal = KitchenCalendar::open();
        let today = d(2025, 9, 1);
        let morning = AvailabilityContext::new(&cal, today, today, 8 * 60);
        assert!(morning.section_available(BREAKFAST_SECTION));

        let late = AvailabilityContext::new(&cal, today, today, 9 * 60);
        assert!(!late.section_available(BREAKFAST_SECTION));
        assert_eq!(
            late.availability_label(BREAKFAST_SECTION),
            Some("Breakfast ended for today")
        );
    }

    #[test]
    fn test_tomorrow_bypasses_time_cutoffs() {
        let cal = KitchenCalendar::open();
        let today = d(2025, 9, 1);
        let ctx = AvailabilityContext::new(&cal, today, d(2025, 9, 2), 23 * 60);
        assert!(ctx.section_available(BREAKFAST_SECTION));
        assert!(ctx.section_available("dinner"));
    }

    #[test]
    fn test_closed_date_shuts_everything() {
        let cal = KitchenCalendar {
            closed_today: false,
            closures: vec![ClosureWindow::single(d(2025, 9, 5))],
        };
        let today = d(2025, 9, 1);
        let ctx = AvailabilityContext::new(&cal, today, d(2025, 9, 5), 12 * 60);
        assert!(!ctx.section_available("lunch"));
        assert_eq!(
            ctx.availability_label("lunch"),
            Some("Kitchen is closed for selected date")
        );
    }

    #[test]
    fn test_motd_window() {
        let cal = KitchenCalendar::open();
        let today = d(2025, 9, 1);
        let ctx = |mins| AvailabilityContext::new(&cal, today, today, mins);
        assert!(!ctx(6 * 60).motd_available());
        assert!(ctx(12 * 60).motd_available());
        assert!(!ctx(21 * 60).motd_available());
    }

    #[test]
    fn test_state_blob_wire_shape() {
        let json = r#"{
            "kitchenClosedToday": true,
            "closures": [{ "start_date": "2025-09-10", "end_date": "2025-09-12" }]
        }"#;
        let blob: KitchenStateBlob = serde_json::from_str(json).unwrap();
        let cal = KitchenCalendar::from(blob);
        assert!(cal.closed_today);
        assert!(cal.is_closed(d(2025, 9, 11), d(2025, 9, 1)));
    }
}
