use super::ResultStore;
use crate::{error::EtlResult, pipeline::PipelineOutput, types::RunId};
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub run_id: RunId,
    pub source: String,
    pub input_records: i64,
    pub result_rows: i64,
    pub probe_passed: bool,
    pub started_at: String,
}

impl RunLogEntry {
    /// Fresh entry for a run over `source` that began at `started_at`.
    pub fn new(source: &str, started_at: DateTime<Utc>, run: &PipelineOutput) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            input_records: run.stats.records as i64,
            result_rows: run.results.len() as i64,
            probe_passed: run.test_row.passed(),
            started_at: started_at.to_rfc3339(),
        }
    }
}

impl ResultStore {
    // ── Run log ───────────────────────────────────────────────────

    pub fn insert_run(&self, entry: &RunLogEntry) -> EtlResult<()> {
        self.conn.execute(
            "INSERT INTO run_log (run_id, source, input_records, result_rows, probe_passed, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.run_id,
                entry.source,
                entry.input_records,
                entry.result_rows,
                entry.probe_passed,
                entry.started_at,
            ],
        )?;
        Ok(())
    }

    pub fn runs(&self) -> EtlResult<Vec<RunLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, source, input_records, result_rows, probe_passed, started_at
             FROM run_log ORDER BY started_at ASC, run_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RunLogEntry {
                run_id: row.get(0)?,
                source: row.get(1)?,
                input_records: row.get(2)?,
                result_rows: row.get(3)?,
                probe_passed: row.get(4)?,
                started_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
