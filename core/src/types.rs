//! Shared primitive types used across every pipeline stage.

/// Numeric customer identifier as it appears in the source extract.
pub type CustomerId = i64;

/// Product code, e.g. `PURA250`.
pub type ProductId = String;

/// Unit count of a single transaction line.
pub type Quantity = i64;

/// 1-based line number in the source file. The header is line 1.
/// Doubles as the stable tie-break for events sharing a date.
pub type SourceLine = u64;

/// Canonical run identifier written to the run log.
pub type RunId = String;

/// Grouping key shared by the gap and streak stages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
}

/// All events of one (customer, product) group, in date order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<E> {
    pub key: PartitionKey,
    pub events: Vec<E>,
}
