//! The batch pipeline: transaction log in, favourite/streak rows out.
//!
//! STAGE ORDER (fixed, never reordered):
//!   1. Ingestion        records streamed from the source
//!   2. Gap annotation   per (customer, product) ordering and day gaps
//!   3. Streak counting  per (customer, product, gap) ranks, running totals
//!   4. Favourites       per-customer top product, joined to streaks
//!   5. Probe check      the single regression row
//!
//! RULES:
//!   - Stage 4's totals branch is fed from raw records during ingestion,
//!     never from the output of stages 2 and 3.
//!   - Nothing here touches the store. A failed run returns before any
//!     output exists, so the caller never writes a partial result.

use crate::{
    config::EtlConfig,
    error::EtlResult,
    favourite::{join_longest_streaks, select_favourites, ProductTotals, ResultRow},
    gap::GapAnnotator,
    ingest::{TransactionReader, TransactionRecord},
    probe::{check_probe, TestRow},
    streak::count_streaks,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub records: usize,
    pub groups: usize,
    pub customers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub results: Vec<ResultRow>,
    pub test_row: TestRow,
    pub stats: PipelineStats,
}

pub struct Pipeline {
    config: EtlConfig,
}

impl Pipeline {
    pub fn new(config: EtlConfig) -> EtlResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Read the source file named by `path` and run every stage.
    pub fn run_source(&self, path: &str) -> EtlResult<PipelineOutput> {
        let reader = TransactionReader::open(path, &self.config.source)?;
        self.run(reader)
    }

    /// Run over already-parsed records.
    pub fn run_records(&self, records: Vec<TransactionRecord>) -> EtlResult<PipelineOutput> {
        self.run(records.into_iter().map(Ok))
    }

    /// Run every stage over a fallible record stream.
    /// The first error aborts the run.
    pub fn run<I>(&self, records: I) -> EtlResult<PipelineOutput>
    where
        I: IntoIterator<Item = EtlResult<TransactionRecord>>,
    {
        let preview_rows = self.config.source.preview_rows;
        let mut annotator = GapAnnotator::new();
        let mut totals = ProductTotals::new();

        for (idx, record) in records.into_iter().enumerate() {
            let record = record?;
            if idx < preview_rows {
                log::debug!(
                    "ingest: line={} customer={} product={} qty={} date={}",
                    record.line,
                    record.customer_id,
                    record.product_id,
                    record.quantity_sold,
                    record.transaction_date
                );
            }
            totals.observe(&record);
            annotator.push(record);
        }

        let stats_records = annotator.event_count();
        let stats_groups = annotator.group_count();
        log::info!("ingest: {stats_records} records in {stats_groups} groups");

        let grouped = annotator.finish();
        let streaked = count_streaks(grouped);
        let favourites = select_favourites(&totals);
        let results = join_longest_streaks(&favourites, &streaked);
        let test_row = check_probe(&results, &self.config.probe);

        log::info!(
            "pipeline: {} result rows, probe customer {} {}",
            results.len(),
            test_row.customer_id,
            if test_row.passed() { "passed" } else { "did not pass" }
        );

        Ok(PipelineOutput {
            stats: PipelineStats {
                records: stats_records,
                groups: stats_groups,
                customers: favourites.len(),
            },
            results,
            test_row,
        })
    }
}
