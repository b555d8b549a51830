//! Favourite product selection and the streak join.
//!
//! The totals branch is fed straight from ingested records, independent of
//! the gap and streak stages. The two branches meet only in
//! `join_longest_streaks`.
//!
//! Tie-break: among products with equal summed quantity the smallest
//! product code (byte order) wins.

use crate::{
    ingest::TransactionRecord,
    streak::StreakedEvent,
    types::{CustomerId, Partition, PartitionKey, ProductId, Quantity},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Totals branch ──────────────────────────────────────────────────────

/// Summed quantity per (customer, product).
#[derive(Debug, Default, Clone)]
pub struct ProductTotals {
    totals: HashMap<PartitionKey, Quantity>,
}

impl ProductTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut totals = Self::new();
        for record in records {
            totals.observe(record);
        }
        totals
    }

    pub fn observe(&mut self, record: &TransactionRecord) {
        let total = self.totals.entry(record.partition_key()).or_insert(0);
        *total = total.saturating_add(record.quantity_sold);
    }

    pub fn total(&self, customer_id: CustomerId, product_id: &str) -> Option<Quantity> {
        self.totals
            .get(&PartitionKey {
                customer_id,
                product_id: product_id.to_string(),
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartitionKey, Quantity)> {
        self.totals.iter().map(|(k, v)| (k, *v))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteSelection {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub total_quantity: Quantity,
}

impl FavouriteSelection {
    fn beats(&self, other: &FavouriteSelection) -> bool {
        self.total_quantity > other.total_quantity
            || (self.total_quantity == other.total_quantity && self.product_id < other.product_id)
    }
}

/// Rank-1 product per customer.
pub fn select_favourites(totals: &ProductTotals) -> BTreeMap<CustomerId, FavouriteSelection> {
    let mut favourites: BTreeMap<CustomerId, FavouriteSelection> = BTreeMap::new();

    for (key, total) in totals.iter() {
        let candidate = FavouriteSelection {
            customer_id: key.customer_id,
            product_id: key.product_id.clone(),
            total_quantity: total,
        };
        match favourites.get_mut(&key.customer_id) {
            Some(current) if candidate.beats(current) => *current = candidate,
            Some(_) => {}
            None => {
                favourites.insert(key.customer_id, candidate);
            }
        }
    }

    log::info!("favourite: selected products for {} customers", favourites.len());
    favourites
}

// ── Join ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub customer_id: CustomerId,
    pub favourite_product: ProductId,
    pub longest_streak: u64,
}

/// Inner-join streaked groups to the favourites and keep the maximum
/// streak position per (customer, favourite product).
///
/// Output is ordered by `longest_streak` descending, then `customer_id`.
pub fn join_longest_streaks(
    favourites: &BTreeMap<CustomerId, FavouriteSelection>,
    streaked: &[Partition<StreakedEvent>],
) -> Vec<ResultRow> {
    let mut longest: BTreeMap<&PartitionKey, u64> = BTreeMap::new();

    for partition in streaked {
        let is_favourite = favourites
            .get(&partition.key.customer_id)
            .is_some_and(|f| f.product_id == partition.key.product_id);
        if !is_favourite {
            continue;
        }
        if let Some(streak) = partition.longest_streak() {
            let entry = longest.entry(&partition.key).or_insert(streak);
            *entry = (*entry).max(streak);
        }
    }

    let mut rows: Vec<ResultRow> = longest
        .into_iter()
        .map(|(key, streak)| ResultRow {
            customer_id: key.customer_id,
            favourite_product: key.product_id.clone(),
            longest_streak: streak,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.longest_streak
            .cmp(&a.longest_streak)
            .then(a.customer_id.cmp(&b.customer_id))
    });
    rows
}
