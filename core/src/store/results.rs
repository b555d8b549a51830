use super::{checked_table_name, ResultStore};
use crate::{
    config::OutputConfig,
    error::EtlResult,
    favourite::ResultRow,
    pipeline::PipelineOutput,
    probe::TestRow,
};
use rusqlite::params;

impl ResultStore {
    // ── Provisioning ──────────────────────────────────────────────

    pub fn create_result_table(&self, table: &str) -> EtlResult<()> {
        let table = checked_table_name(table)?;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                customer_id        INTEGER,
                favourite_product  TEXT,
                longest_streak     INTEGER
            );"
        ))?;
        Ok(())
    }

    pub fn create_test_table(&self, table: &str) -> EtlResult<()> {
        let table = checked_table_name(table)?;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                customer_id             INTEGER,
                favourite_product       TEXT,
                longest_streak          INTEGER,
                favourite_product_test  BOOLEAN,
                longest_streak_test     BOOLEAN
            );"
        ))?;
        Ok(())
    }

    pub fn ensure_output_tables(&self, output: &OutputConfig) -> EtlResult<()> {
        self.create_result_table(&output.result_table)?;
        self.create_test_table(&output.test_table)?;
        Ok(())
    }

    // ── Overwrite ─────────────────────────────────────────────────

    /// Replace the contents of `table` with `rows` in one transaction.
    /// On any error the transaction rolls back and the old rows remain.
    pub fn overwrite_results(&self, table: &str, rows: &[ResultRow]) -> EtlResult<usize> {
        let table = checked_table_name(table)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (customer_id, favourite_product, longest_streak)
                 VALUES (?1, ?2, ?3)"
            ))?;
            for row in rows {
                stmt.execute(params![
                    row.customer_id,
                    row.favourite_product,
                    row.longest_streak as i64,
                ])?;
            }
        }
        tx.commit()?;
        log::info!("store: wrote {} rows to {table}", rows.len());
        Ok(rows.len())
    }

    pub fn overwrite_test_row(&self, table: &str, row: &TestRow) -> EtlResult<()> {
        let table = checked_table_name(table)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        tx.execute(
            &format!(
                "INSERT INTO {table} (
                    customer_id, favourite_product, longest_streak,
                    favourite_product_test, longest_streak_test
                ) VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            params![
                row.customer_id,
                row.favourite_product,
                row.longest_streak.map(|s| s as i64),
                row.favourite_product_test,
                row.longest_streak_test,
            ],
        )?;
        tx.commit()?;
        log::info!("store: wrote probe row for customer {} to {table}", row.customer_id);
        Ok(())
    }

    /// Write both relations of a finished run: test table first, then results.
    pub fn publish(&self, output: &OutputConfig, run: &PipelineOutput) -> EtlResult<()> {
        self.overwrite_test_row(&output.test_table, &run.test_row)?;
        self.overwrite_results(&output.result_table, &run.results)?;
        Ok(())
    }

    // ── Read back ─────────────────────────────────────────────────

    pub fn results(&self, table: &str) -> EtlResult<Vec<ResultRow>> {
        let table = checked_table_name(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT customer_id, favourite_product, longest_streak
             FROM {table}
             ORDER BY longest_streak DESC, customer_id ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(ResultRow {
                customer_id: row.get(0)?,
                favourite_product: row.get(1)?,
                longest_streak: row.get::<_, i64>(2)? as u64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn test_rows(&self, table: &str) -> EtlResult<Vec<TestRow>> {
        let table = checked_table_name(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT customer_id, favourite_product, longest_streak,
                    favourite_product_test, longest_streak_test
             FROM {table}"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(TestRow {
                customer_id: row.get(0)?,
                favourite_product: row.get(1)?,
                longest_streak: row.get::<_, Option<i64>>(2)?.map(|s| s as u64),
                favourite_product_test: row.get(3)?,
                longest_streak_test: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn row_count(&self, table: &str) -> EtlResult<i64> {
        let table = checked_table_name(table)?;
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}
