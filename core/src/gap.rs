//! Gap annotation — per (customer, product) ordering and day gaps.
//!
//! RULE: Within a group, events are ordered by transaction date and then
//! by source line. Every later stage relies on exactly this order.
//!
//! Groups are independent of one another and are sorted and scanned in
//! parallel. The returned partitions are always in ascending key order.

use crate::{
    ingest::TransactionRecord,
    types::{Partition, PartitionKey},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedEvent {
    pub record: TransactionRecord,
    /// Date of the preceding event in the same group.
    pub previous_date: Option<NaiveDate>,
    /// Whole days since `previous_date`. `None` for the first event.
    pub gap_days: Option<i64>,
}

/// Collects records into (customer, product) groups as they stream in.
#[derive(Debug, Default)]
pub struct GapAnnotator {
    groups: HashMap<PartitionKey, Vec<TransactionRecord>>,
    events: usize,
}

impl GapAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TransactionRecord) {
        self.groups
            .entry(record.partition_key())
            .or_default()
            .push(record);
        self.events += 1;
    }

    pub fn event_count(&self) -> usize {
        self.events
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Sort every group and compute gaps.
    pub fn finish(self) -> Vec<Partition<GroupedEvent>> {
        let mut groups: Vec<_> = self.groups.into_iter().collect();
        groups.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let partitions: Vec<_> = groups
            .into_par_iter()
            .map(|(key, records)| Partition {
                key,
                events: annotate_group(records),
            })
            .collect();

        log::info!(
            "gap: annotated {} events across {} groups",
            self.events,
            partitions.len()
        );
        partitions
    }
}

/// Convenience wrapper: group, sort and annotate an in-memory batch.
pub fn annotate_gaps<I>(records: I) -> Vec<Partition<GroupedEvent>>
where
    I: IntoIterator<Item = TransactionRecord>,
{
    let mut annotator = GapAnnotator::new();
    for record in records {
        annotator.push(record);
    }
    annotator.finish()
}

/// Order one group's records and attach the previous date and gap.
pub fn annotate_group(mut records: Vec<TransactionRecord>) -> Vec<GroupedEvent> {
    records.sort_by_key(|r| (r.transaction_date, r.line));

    let mut previous: Option<NaiveDate> = None;
    records
        .into_iter()
        .map(|record| {
            let date = record.transaction_date;
            let event = GroupedEvent {
                gap_days: previous.map(|p| (date - p).num_days()),
                previous_date: previous,
                record,
            };
            previous = Some(date);
            event
        })
        .collect()
}
