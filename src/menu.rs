//! Menu catalog types and item identity.
//!
//! The catalog loads asynchronously; an empty menu (the not-yet-loaded or
//! fetch-failed state) simply means nothing is orderable until a reload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Section whose items are sold at market price and carry no computable
/// price. They are excluded from the free-delivery-eligible subtotal by
/// construction.
pub const MARKET_PRICE_SECTION: &str = "SeaFood_starters";

/// Item-id prefix of the menu-of-the-day, which is exempt from normal
/// section-availability purges.
pub const MOTD_SECTION: &str = "motd";

/// Stable item identifier derived from the section key and item name.
pub fn item_id(section: &str, name: &str) -> String {
    format!("{section}__{name}")
}

/// Section key portion of an item id.
pub fn section_of(item_id: &str) -> &str {
    item_id.split("__").next().unwrap_or(item_id)
}

/// Whether an item belongs to the market-price section.
pub fn is_market_price_item(item_id: &str) -> bool {
    item_id
        .to_lowercase()
        .starts_with("seafood_starters__")
}

/// Whether an item belongs to the menu-of-the-day.
pub fn is_motd_item(item_id: &str) -> bool {
    item_id.contains("__") && section_of(item_id) == MOTD_SECTION
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display name; combined with the section key it forms the item id.
    pub name: String,
    /// Unit price in rupees; market-price items carry none.
    #[serde(default)]
    pub price: Option<i64>,
    /// Vegetarian marker.
    #[serde(default)]
    pub veg: bool,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the item is currently orderable within its section.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// An optional add-on offered by a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraOption {
    /// Add-on name.
    pub item: String,
    /// Add-on price per unit of the parent line.
    pub price: i64,
}

/// Free-form section note; the legacy catalog stores the extras list here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionNote {
    /// Add-ons available for every item in the section.
    #[serde(rename = "Extras available", default)]
    pub extras_available: Vec<ExtraOption>,
}

/// A menu section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSection {
    /// Display title.
    pub title: String,
    /// Optional subheading.
    #[serde(default)]
    pub subheading: Option<String>,
    /// Dishes in the section.
    #[serde(default)]
    pub items: Vec<MenuItem>,
    /// Section note, including available extras.
    #[serde(default)]
    pub note: Option<SectionNote>,
}

impl MenuSection {
    /// Add-ons offered by this section.
    pub fn extras(&self) -> &[ExtraOption] {
        self.note
            .as_ref()
            .map(|n| n.extras_available.as_slice())
            .unwrap_or(&[])
    }
}

/// Legacy catalog document: either `{ "menu": { ... } }` or the bare map.
#[derive(Deserialize)]
#[serde(untagged)]
enum MenuDocument {
    Wrapped { menu: BTreeMap<String, MenuSection> },
    Bare(BTreeMap<String, MenuSection>),
}

/// The menu catalog, keyed by section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Menu {
    sections: BTreeMap<String, MenuSection>,
}

impl Menu {
    /// An empty menu, the state before the catalog loads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the legacy JSON catalog, wrapped or bare.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let doc: MenuDocument = serde_json::from_str(json)?;
        let sections = match doc {
            MenuDocument::Wrapped { menu } => menu,
            MenuDocument::Bare(map) => map,
        };
        Ok(Self { sections })
    }

    /// Add a section.
    pub fn insert_section(&mut self, key: impl Into<String>, section: MenuSection) {
        self.sections.insert(key.into(), section);
    }

    /// Look up a section by key.
    pub fn section(&self, key: &str) -> Option<&MenuSection> {
        self.sections.get(key)
    }

    /// Iterate sections.
    pub fn sections(&self) -> impl Iterator<Item = (&String, &MenuSection)> {
        self.sections.iter()
    }

    /// Whether the catalog has loaded anything.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Find an item by its id.
    pub fn find_item(&self, id: &str) -> Option<&MenuItem> {
        let section_key = section_of(id);
        let section = self.sections.get(section_key)?;
        section
            .items
            .iter()
            .find(|i| item_id(section_key, &i.name) == id)
    }

    /// Whether the item itself is flagged available.
    ///
    /// Unknown items count as unavailable; section windows are checked
    /// separately via the schedule.
    pub fn item_available(&self, id: &str) -> bool {
        self.find_item(id).map(|i| i.available).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Menu {
        Menu::from_json_str(
            r#"{
                "menu": {
                    "lunch": {
                        "title": "Lunch Thalis",
                        "subheading": "Served 12-4",
                        "items": [
                            { "name": "Veg Thali", "price": 180, "veg": true },
                            { "name": "Chicken Thali", "price": 250, "available": false }
                        ],
                        "note": {
                            "Extras available": [
                                { "item": "Extra Roti", "price": 15 }
                            ]
                        }
                    },
                    "SeaFood_starters": {
                        "title": "Seafood Starters",
                        "items": [
                            { "name": "Prawns Koliwada" }
                        ]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_item_id_composition() {
        assert_eq!(item_id("lunch", "Veg Thali"), "lunch__Veg Thali");
        assert_eq!(section_of("lunch__Veg Thali"), "lunch");
    }

    #[test]
    fn test_market_price_detection_is_case_insensitive() {
        assert!(is_market_price_item("SeaFood_starters__Prawns Koliwada"));
        assert!(is_market_price_item("seafood_starters__Crab"));
        assert!(!is_market_price_item("lunch__Veg Thali"));
    }

    #[test]
    fn test_motd_detection() {
        assert!(is_motd_item("motd__Special Biryani"));
        assert!(!is_motd_item("lunch__Veg Thali"));
    }

    #[test]
    fn test_parse_wrapped_catalog() {
        let menu = sample();
        assert!(!menu.is_empty());
        let lunch = menu.section("lunch").unwrap();
        assert_eq!(lunch.title, "Lunch Thalis");
        assert_eq!(lunch.extras().len(), 1);
        assert_eq!(lunch.extras()[0].price, 15);
    }

    #[test]
    fn test_parse_bare_catalog() {
        let menu = Menu::from_json_str(
            r#"{ "dinner": { "title": "Dinner", "items": [] } }"#,
        )
        .unwrap();
        assert!(menu.section("dinner").is_some());
    }

    #[test]
    fn test_find_item() {
        let menu = sample();
        let item = menu.find_item("lunch__Veg Thali").unwrap();
        assert_eq!(item.price, Some(180));
        assert!(menu.find_item("lunch__Nope").is_none());
    }

    #[test]
    fn test_item_availability() {
        let menu = sample();
        assert!(menu.item_available("lunch__Veg Thali"));
        assert!(!menu.item_available("lunch__Chicken Thali"));
        assert!(!menu.item_available("unknown__Thing"));
    }

    #[test]
    fn test_market_price_item_has_no_price() {
        let menu = sample();
        let prawns = menu.find_item("SeaFood_starters__Prawns Koliwada").unwrap();
        assert_eq!(prawns.price, None);
        assert!(prawns.available);
    }
}
