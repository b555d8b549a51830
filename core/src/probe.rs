//! Probe check — the single regression row written after every run.
//!
//! If the probe customer has no result row, the test row still exists:
//! it carries the probe id, NULL product and streak, and both flags false.

use crate::{
    config::ProbeConfig,
    favourite::ResultRow,
    types::{CustomerId, ProductId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRow {
    pub customer_id: CustomerId,
    pub favourite_product: Option<ProductId>,
    pub longest_streak: Option<u64>,
    pub favourite_product_test: bool,
    pub longest_streak_test: bool,
}

impl TestRow {
    pub fn passed(&self) -> bool {
        self.favourite_product_test && self.longest_streak_test
    }
}

pub fn check_probe(results: &[ResultRow], probe: &ProbeConfig) -> TestRow {
    match results.iter().find(|r| r.customer_id == probe.customer_id) {
        Some(row) => TestRow {
            customer_id: row.customer_id,
            favourite_product: Some(row.favourite_product.clone()),
            longest_streak: Some(row.longest_streak),
            favourite_product_test: row.favourite_product == probe.expected_product,
            longest_streak_test: row.longest_streak == probe.expected_streak,
        },
        None => {
            log::warn!(
                "probe: customer {} not present in results",
                probe.customer_id
            );
            TestRow {
                customer_id: probe.customer_id,
                favourite_product: None,
                longest_streak: None,
                favourite_product_test: false,
                longest_streak_test: false,
            }
        }
    }
}
