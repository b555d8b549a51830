//! End-to-end scenarios over small hand-built transaction logs.

use chrono::NaiveDate;
use streak_core::{
    config::EtlConfig,
    favourite::ResultRow,
    ingest::TransactionRecord,
    pipeline::{Pipeline, PipelineOutput},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn txn(line: u64, customer_id: i64, product: &str, qty: i64, date: &str) -> TransactionRecord {
    TransactionRecord {
        line,
        customer_id,
        product_id: product.into(),
        quantity_sold: qty,
        transaction_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}

fn run(records: Vec<TransactionRecord>) -> PipelineOutput {
    let _ = env_logger::builder().is_test(true).try_init();
    Pipeline::new(EtlConfig::default())
        .unwrap()
        .run_records(records)
        .unwrap()
}

fn row_for(output: &PipelineOutput, customer_id: i64) -> &ResultRow {
    output
        .results
        .iter()
        .find(|r| r.customer_id == customer_id)
        .unwrap_or_else(|| panic!("no result row for customer {customer_id}"))
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The reference probe: PURA250 is the top product and every gap value
/// occurs once, so the longest streak is 1.
#[test]
fn probe_customer_matches_reference_values() {
    let output = run(vec![
        txn(2, 23938, "PURA250", 5, "2012-01-01"),
        txn(3, 23938, "PURA250", 5, "2012-01-03"),
        txn(4, 23938, "PURA100", 2, "2012-01-04"),
        txn(5, 23938, "PURA250", 5, "2012-01-06"),
        txn(6, 11111, "BRA500", 1, "2012-01-02"),
    ]);

    let row = row_for(&output, 23938);
    assert_eq!(row.favourite_product, "PURA250");
    assert_eq!(row.longest_streak, 1);

    assert_eq!(output.test_row.customer_id, 23938);
    assert_eq!(output.test_row.favourite_product.as_deref(), Some("PURA250"));
    assert_eq!(output.test_row.longest_streak, Some(1));
    assert!(output.test_row.favourite_product_test);
    assert!(output.test_row.longest_streak_test);
    assert!(output.test_row.passed());
}

#[test]
fn empty_input_gives_empty_results_and_a_failing_probe_row() {
    let output = run(Vec::new());

    assert!(output.results.is_empty());
    assert_eq!(output.stats.records, 0);
    assert_eq!(output.test_row.customer_id, 23938);
    assert_eq!(output.test_row.favourite_product, None);
    assert_eq!(output.test_row.longest_streak, None);
    assert!(!output.test_row.favourite_product_test);
    assert!(!output.test_row.longest_streak_test);
}

#[test]
fn single_transaction_customer_has_streak_one() {
    let output = run(vec![txn(2, 42, "SOLO", 3, "2012-05-05")]);
    assert_eq!(
        output.results,
        vec![ResultRow {
            customer_id: 42,
            favourite_product: "SOLO".into(),
            longest_streak: 1,
        }]
    );
}

#[test]
fn tied_totals_pick_smallest_product_code() {
    let output = run(vec![
        txn(2, 7, "ZED", 4, "2012-01-01"),
        txn(3, 7, "ABC", 2, "2012-01-02"),
        txn(4, 7, "ABC", 2, "2012-01-03"),
    ]);
    assert_eq!(row_for(&output, 7).favourite_product, "ABC");
}

/// Streaks on a non-favourite product never leak into the result.
#[test]
fn only_favourite_product_streaks_are_joined() {
    let output = run(vec![
        // FREQ: many small purchases, weekly, streak 4 on gap 7.
        txn(2, 5, "FREQ", 1, "2012-01-01"),
        txn(3, 5, "FREQ", 1, "2012-01-08"),
        txn(4, 5, "FREQ", 1, "2012-01-15"),
        txn(5, 5, "FREQ", 1, "2012-01-22"),
        txn(6, 5, "FREQ", 1, "2012-01-29"),
        // BULK: one big purchase.
        txn(7, 5, "BULK", 50, "2012-02-01"),
    ]);
    let row = row_for(&output, 5);
    assert_eq!(row.favourite_product, "BULK");
    assert_eq!(row.longest_streak, 1);
}

/// Same-day repeats form a gap-0 run; a recurring gap keeps counting.
#[test]
fn longest_streak_uses_positional_rank_per_gap() {
    let output = run(vec![
        txn(2, 9, "P", 1, "2012-01-01"), // gap None -> 1
        txn(3, 9, "P", 1, "2012-01-02"), // gap 1    -> 1
        txn(4, 9, "P", 1, "2012-01-02"), // gap 0    -> 1
        txn(5, 9, "P", 1, "2012-01-03"), // gap 1    -> 2
        txn(6, 9, "P", 1, "2012-01-03"), // gap 0    -> 2
        txn(7, 9, "P", 1, "2012-01-03"), // gap 0    -> 3
    ]);
    assert_eq!(row_for(&output, 9).longest_streak, 3);
}

#[test]
fn results_are_ordered_by_streak_then_customer() {
    let output = run(vec![
        txn(2, 3, "A", 1, "2012-01-01"),
        txn(3, 1, "A", 1, "2012-01-01"),
        txn(4, 1, "A", 1, "2012-01-02"),
        txn(5, 1, "A", 1, "2012-01-03"),
        txn(6, 2, "A", 1, "2012-01-01"),
    ]);
    let order: Vec<(i64, u64)> = output
        .results
        .iter()
        .map(|r| (r.customer_id, r.longest_streak))
        .collect();
    assert_eq!(order, vec![(1, 2), (2, 1), (3, 1)]);
}

#[test]
fn source_errors_abort_the_run() {
    let pipeline = Pipeline::new(EtlConfig::default()).unwrap();
    let records = vec![
        Ok(txn(2, 1, "A", 1, "2012-01-01")),
        Err(streak_core::error::EtlError::MalformedField {
            line: 3,
            column: "unitsSold".into(),
            value: "lots".into(),
            reason: "invalid digit found in string".into(),
        }),
    ];
    let err = pipeline.run(records).unwrap_err();
    assert!(err.to_string().contains("line 3"), "unexpected error: {err}");
}

#[test]
fn custom_probe_is_honoured() {
    let mut config = EtlConfig::default();
    config.probe.customer_id = 77;
    config.probe.expected_product = "X".into();
    config.probe.expected_streak = 2;

    let output = Pipeline::new(config)
        .unwrap()
        .run_records(vec![
            txn(2, 77, "X", 1, "2012-01-01"),
            txn(3, 77, "X", 1, "2012-01-02"),
            txn(4, 77, "X", 1, "2012-01-03"),
        ])
        .unwrap();
    assert!(output.test_row.passed());
}

#[test]
fn wrong_expectations_flag_each_field_separately() {
    let mut config = EtlConfig::default();
    config.probe.customer_id = 1;
    config.probe.expected_product = "A".into();
    config.probe.expected_streak = 5;

    let output = Pipeline::new(config)
        .unwrap()
        .run_records(vec![txn(2, 1, "A", 1, "2012-01-01")])
        .unwrap();
    assert!(output.test_row.favourite_product_test);
    assert!(!output.test_row.longest_streak_test);
    assert!(!output.test_row.passed());
}
