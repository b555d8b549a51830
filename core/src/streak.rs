//! Streak counting — positional ranks and running totals per group.
//!
//! `streak_position` is the row number of an event among the events of
//! its group that share its `gap_days` value, `None` included. A gap value
//! that comes back after a different gap continues its earlier count
//! rather than restarting at 1.

use crate::{
    gap::GroupedEvent,
    types::{Partition, Quantity},
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakedEvent {
    pub event: GroupedEvent,
    /// Row number within the (customer, product) group.
    pub group_position: u64,
    /// Row number within the (customer, product, gap_days) sub-group.
    pub streak_position: u64,
    /// Inclusive prefix sum of `quantity_sold` over the group.
    pub running_total_quantity: Quantity,
}

impl Partition<StreakedEvent> {
    pub fn longest_streak(&self) -> Option<u64> {
        self.events.iter().map(|e| e.streak_position).max()
    }
}

pub fn count_streaks(partitions: Vec<Partition<GroupedEvent>>) -> Vec<Partition<StreakedEvent>> {
    let streaked: Vec<_> = partitions
        .into_par_iter()
        .map(|p| Partition {
            key: p.key,
            events: streak_group(p.events),
        })
        .collect();
    log::info!("streak: ranked {} groups", streaked.len());
    streaked
}

/// Single scan over one already-ordered group.
pub fn streak_group(events: Vec<GroupedEvent>) -> Vec<StreakedEvent> {
    let mut per_gap: HashMap<Option<i64>, u64> = HashMap::new();
    let mut running_total: Quantity = 0;

    events
        .into_iter()
        .enumerate()
        .map(|(idx, event)| {
            let rank = per_gap.entry(event.gap_days).or_insert(0);
            *rank += 1;
            running_total = running_total.saturating_add(event.record.quantity_sold);
            StreakedEvent {
                group_position: idx as u64 + 1,
                streak_position: *rank,
                running_total_quantity: running_total,
                event,
            }
        })
        .collect()
}
