use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::commission::LineItem;

use super::payload::RawItem;

/// How long a fetched items index stays fresh. Staleness only costs
/// accuracy on brand-new items, never correctness.
pub const ITEMS_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Lookups derived from the Zoho Inventory item catalog: manufacturer per
/// item (for commission attribution) and unit weight per item (for the
/// invoice weight view).
#[derive(Debug, Clone, Default)]
pub struct ItemsIndex {
    manufacturers: HashMap<String, String>,
    weights: HashMap<String, f64>,
}

impl ItemsIndex {
    pub fn from_items(items: Vec<RawItem>) -> Self {
        let mut manufacturers = HashMap::with_capacity(items.len());
        let mut weights = HashMap::with_capacity(items.len());

        for item in items {
            if item.item_id.is_empty() {
                continue;
            }
            manufacturers.insert(item.item_id.clone(), item.manufacturer.trim().to_string());
            weights.insert(item.item_id, item.weight.unwrap_or(0.0));
        }

        Self {
            manufacturers,
            weights,
        }
    }

    /// The item-id to manufacturer map the engine takes as its lookup.
    pub fn manufacturers(&self) -> &HashMap<String, String> {
        &self.manufacturers
    }

    pub fn len(&self) -> usize {
        self.manufacturers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manufacturers.is_empty()
    }

    /// Total shipping weight of a set of lines, counting unknown items as
    /// weightless.
    pub fn total_weight(&self, lines: &[LineItem]) -> f64 {
        lines
            .iter()
            .map(|line| {
                let per_unit = line
                    .item_id
                    .as_deref()
                    .and_then(|id| self.weights.get(id))
                    .copied()
                    .unwrap_or(0.0);
                per_unit * line.quantity
            })
            .sum()
    }
}

/// Time-boxed holder for the items index so repeated reports within one
/// session do not re-page the whole catalog.
#[derive(Debug, Default)]
pub struct ItemsCache {
    cached: Option<(ItemsIndex, Instant)>,
}

impl ItemsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, now: Instant) -> Option<&ItemsIndex> {
        self.cached
            .as_ref()
            .filter(|(_, fetched_at)| now.duration_since(*fetched_at) < ITEMS_CACHE_TTL)
            .map(|(index, _)| index)
    }

    pub fn store(&mut self, index: ItemsIndex, now: Instant) {
        self.cached = Some((index, now));
    }
}
