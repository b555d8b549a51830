use crate::types::CustomerId;
use serde::{Deserialize, Serialize};

// ── Source ─────────────────────────────────────────────────────────────

/// Header names of the four columns the pipeline reads.
/// Any other column in the extract is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnMap {
    pub customer_id: String,
    pub product_id: String,
    pub quantity_sold: String,
    pub transaction_date: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            customer_id: "custId".into(),
            product_id: "productSold".into(),
            quantity_sold: "unitsSold".into(),
            transaction_date: "transactionDate".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Single-byte field delimiter.
    pub delimiter: char,
    pub columns: ColumnMap,
    /// Tried in order for `transaction_date`.
    pub date_formats: Vec<String>,
    /// Tried after `date_formats`; only the date part is kept.
    pub datetime_formats: Vec<String>,
    /// Number of parsed records echoed at debug level.
    pub preview_rows: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            delimiter: '|',
            columns: ColumnMap::default(),
            date_formats: vec!["%Y-%m-%d".into()],
            datetime_formats: vec!["%Y-%m-%d %H:%M:%S".into(), "%Y-%m-%dT%H:%M:%S".into()],
            preview_rows: 20,
        }
    }
}

// ── Probe ──────────────────────────────────────────────────────────────

/// The customer whose result row is checked against known values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    pub customer_id: CustomerId,
    pub expected_product: String,
    pub expected_streak: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            customer_id: 23938,
            expected_product: "PURA250".into(),
            expected_streak: 1,
        }
    }
}

// ── Output ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub result_table: String,
    pub test_table: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_table: "customers".into(),
            test_table: "test".into(),
        }
    }
}

// ── Root ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EtlConfig {
    pub source: SourceConfig,
    pub probe: ProbeConfig,
    pub output: OutputConfig,
}

impl EtlConfig {
    /// Load from a JSON file. Missing sections and fields keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EtlConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.source.delimiter.is_ascii() {
            anyhow::bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.source.delimiter
            );
        }
        if self.source.date_formats.is_empty() && self.source.datetime_formats.is_empty() {
            anyhow::bail!("at least one date or datetime format is required");
        }
        Ok(())
    }
}
