//! Explosion root selection from the item master.

use std::collections::HashSet;

use crate::config::ItemConfig;
use crate::model::ItemRow;

/// Picks the items whose make/buy flag marks them as top-level outputs.
#[derive(Debug, Clone)]
pub struct RootSelector {
    marker: String,
}

impl RootSelector {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn from_config(items: &ItemConfig) -> Self {
        Self::new(items.root_marker.clone())
    }

    /// Returns `true` when `item`'s flag contains the marker.
    #[must_use]
    pub fn is_root(&self, item: &ItemRow) -> bool {
        item.flag
            .as_deref()
            .is_some_and(|flag| flag.contains(self.marker.as_str()))
    }

    /// Unique root ids in first-seen order.
    #[must_use]
    pub fn select(&self, items: &[ItemRow]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        items
            .iter()
            .filter(|item| self.is_root(item))
            .filter(|item| seen.insert(item.item_no.as_str()))
            .map(|item| item.item_no.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, flag: Option<&str>) -> ItemRow {
        ItemRow {
            item_no: id.to_string(),
            flag: flag.map(str::to_string),
        }
    }

    #[test]
    fn selects_flagged_items_once_in_order() {
        let items = vec![
            item("FG-2", Some("Output")),
            item("RM-1", Some("Purchase")),
            item("FG-1", Some("Output / Sub")),
            item("FG-2", Some("Output")),
            item("RM-2", None),
        ];

        let roots = RootSelector::new("Output").select(&items);

        assert_eq!(roots, vec!["FG-2".to_string(), "FG-1".to_string()]);
    }

    #[test]
    fn marker_match_is_case_sensitive() {
        let selector = RootSelector::from_config(&ItemConfig::default());
        assert!(!selector.is_root(&item("X", Some("output"))));
        assert!(selector.is_root(&item("X", Some("Output"))));
    }
}
