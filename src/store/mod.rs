//! SQLite-backed history of analysed snapshots.
//!
//! One row per snapshot timestamp, with the snapshot's contracts and
//! inversions as child rows. A write for a timestamp replaces all three
//! record sets inside one immediate transaction, so concurrent readers see
//! either the old snapshot or the new one, never a mix.

mod import;
pub mod schema;
pub mod types;

use std::path::Path;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::model::{Contract, Inversion, InversionKind, TermStructure};

pub use types::{
    Column, DatabaseStats, DatedValue, Extremum, MigrationReport, PreviousDay, RecentRecord,
    StoredSnapshot,
};

/// How far back `previous_trading_day` looks before giving up.
pub const MAX_DAYS_BACK: u32 = 7;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored row for `{timestamp}`: {reason}")]
    InvalidRow { timestamp: String, reason: String },
}

const SNAPSHOT_COLUMNS: &str = "timestamp, date_only, spot_price, num_contracts, curve_shape, \
     trading_signal, roll_carry_pct, roll_carry_pts, synthetic_index, spot_to_front, \
     front_to_second, front_month_price, second_month_price";

/// Handle to the historical store. Open once per process and pass it to
/// whatever needs history; dropping it (or calling [`HistoryStore::close`])
/// releases the database.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path, config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = Self::init(conn, config)?;
        debug!(path = %path.display(), "history store opened");
        Ok(store)
    }

    /// A private, non-persistent store. Mostly useful in tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, &StoreConfig::default())
    }

    fn init(conn: Connection, config: &StoreConfig) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Flush and close the underlying connection.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    /// Insert or replace the snapshot keyed by its timestamp, together
    /// with its contracts and inversions.
    pub fn store(&mut self, snapshot: &TermStructure) -> Result<(), StoreError> {
        let row = StoredSnapshot::from_term_structure(snapshot);
        self.write(&row, &snapshot.contracts, &snapshot.inversions)?;
        info!(
            timestamp = %row.timestamp,
            contracts = snapshot.contracts.len(),
            inversions = snapshot.inversions.len(),
            "stored snapshot"
        );
        Ok(())
    }

    fn write(
        &mut self,
        row: &StoredSnapshot,
        contracts: &[Contract],
        inversions: &[Inversion],
    ) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        write_records(&tx, row, contracts, inversions)?;
        tx.commit()?;
        Ok(())
    }

    /// Latest snapshot whose calendar date is `date`.
    pub fn latest_on(&self, date: NaiveDate) -> Result<Option<StoredSnapshot>, StoreError> {
        let sql = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
             WHERE date_only = ?1
             ORDER BY timestamp DESC
             LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![date], snapshot_from_row)
            .optional()?)
    }

    /// Walk back from `reference` one calendar day at a time, up to
    /// [`MAX_DAYS_BACK`] days, and return the first day that has data.
    pub fn previous_trading_day(
        &self,
        reference: NaiveDate,
    ) -> Result<Option<PreviousDay>, StoreError> {
        // Read everything for the hit inside one transaction so the child
        // rows match the snapshot row.
        let tx = self.conn.unchecked_transaction()?;

        for days_back in 1..=MAX_DAYS_BACK {
            let Some(date) = reference.checked_sub_days(Days::new(days_back as u64)) else {
                break;
            };
            let Some(snapshot) = self.latest_on(date)? else {
                continue;
            };

            let contracts = self.contracts_for(&snapshot.timestamp)?;
            let inversions = self.inversions_for(&snapshot.timestamp)?;
            tx.finish()?;

            debug!(%reference, %date, days_back, "found previous trading day");
            return Ok(Some(PreviousDay {
                snapshot,
                contracts,
                inversions,
                days_back,
            }));
        }

        tx.finish()?;
        debug!(%reference, "no snapshot in the previous {MAX_DAYS_BACK} days");
        Ok(None)
    }

    /// All snapshots with `start <= date_only <= end`, oldest first.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredSnapshot>, StoreError> {
        let sql = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
             WHERE date_only BETWEEN ?1 AND ?2
             ORDER BY timestamp ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![start, end], snapshot_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Contracts stored for `timestamp`, in curve order.
    pub fn contracts_for(&self, timestamp: &str) -> Result<Vec<Contract>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, price, days_to_expiration, expiration_date, contract_order
             FROM contracts
             WHERE timestamp = ?1
             ORDER BY contract_order",
        )?;
        let rows = stmt
            .query_map([timestamp], |row| {
                let expiration: Option<String> = row.get(3)?;
                Ok(Contract {
                    symbol: row.get(0)?,
                    price: row.get(1)?,
                    days_to_expiration: row.get(2)?,
                    expiration_date: expiration
                        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
                    order: row.get::<_, i64>(4)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Inversions stored for `timestamp`, in detection order.
    pub fn inversions_for(&self, timestamp: &str) -> Result<Vec<Inversion>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT contract1, contract2, price1, price2, magnitude, inversion_type
             FROM inversions
             WHERE timestamp = ?1
             ORDER BY rowid",
        )?;
        let raw = stmt
            .query_map([timestamp], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(contract1, contract2, price1, price2, magnitude, kind)| {
                let kind = kind
                    .parse::<InversionKind>()
                    .map_err(|reason| StoreError::InvalidRow {
                        timestamp: timestamp.to_string(),
                        reason,
                    })?;
                Ok(Inversion {
                    kind,
                    contract1,
                    contract2,
                    price1,
                    price2,
                    magnitude,
                })
            })
            .collect()
    }

    /// Highest or lowest value of `column` between `start` and `end`
    /// (inclusive), with the date it was observed. Ties resolve to the
    /// latest snapshot.
    pub fn extreme(
        &self,
        column: Column,
        extremum: Extremum,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<DatedValue>, StoreError> {
        let order = match extremum {
            Extremum::Highest => "DESC",
            Extremum::Lowest => "ASC",
        };
        let sql = format!(
            "SELECT {col}, date_only FROM snapshots
             WHERE date_only BETWEEN ?1 AND ?2
             ORDER BY {col} {order}, timestamp DESC
             LIMIT 1",
            col = column.name(),
        );
        Ok(self
            .conn
            .query_row(&sql, params![start, end], |row| {
                Ok(DatedValue {
                    value: row.get(0)?,
                    date: row.get(1)?,
                })
            })
            .optional()?)
    }

    /// Row counts, covered date range and the five most recent snapshots.
    pub fn database_stats(&self) -> Result<DatabaseStats, StoreError> {
        let count = |table: &str| -> Result<u64, StoreError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as u64)
        };

        let (earliest, latest): (Option<NaiveDate>, Option<NaiveDate>) = self.conn.query_row(
            "SELECT MIN(date_only), MAX(date_only) FROM snapshots",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT date_only, spot_price, curve_shape
             FROM snapshots
             ORDER BY timestamp DESC
             LIMIT 5",
        )?;
        let recent = stmt
            .query_map([], |r| {
                Ok(RecentRecord {
                    date: r.get(0)?,
                    spot_price: r.get(1)?,
                    curve_shape: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DatabaseStats {
            snapshots: count("snapshots")?,
            contracts: count("contracts")?,
            inversions: count("inversions")?,
            earliest,
            latest,
            recent,
        })
    }
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<StoredSnapshot> {
    Ok(StoredSnapshot {
        timestamp: row.get("timestamp")?,
        date_only: row.get("date_only")?,
        spot_price: row.get("spot_price")?,
        num_contracts: row.get::<_, i64>("num_contracts")? as usize,
        curve_shape: row.get("curve_shape")?,
        trading_signal: row.get("trading_signal")?,
        roll_carry_pct: row.get("roll_carry_pct")?,
        roll_carry_pts: row.get("roll_carry_pts")?,
        synthetic_index: row.get("synthetic_index")?,
        spot_to_front: row.get("spot_to_front")?,
        front_to_second: row.get("front_to_second")?,
        front_month_price: row.get("front_month_price")?,
        second_month_price: row.get("second_month_price")?,
    })
}

/// Upsert the snapshot row, then replace its child rows.
fn write_records(
    tx: &Transaction<'_>,
    row: &StoredSnapshot,
    contracts: &[Contract],
    inversions: &[Inversion],
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO snapshots (
            timestamp, date_only, spot_price, num_contracts, curve_shape, trading_signal,
            roll_carry_pct, roll_carry_pts, synthetic_index, spot_to_front, front_to_second,
            front_month_price, second_month_price
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT(timestamp) DO UPDATE SET
            date_only = excluded.date_only,
            spot_price = excluded.spot_price,
            num_contracts = excluded.num_contracts,
            curve_shape = excluded.curve_shape,
            trading_signal = excluded.trading_signal,
            roll_carry_pct = excluded.roll_carry_pct,
            roll_carry_pts = excluded.roll_carry_pts,
            synthetic_index = excluded.synthetic_index,
            spot_to_front = excluded.spot_to_front,
            front_to_second = excluded.front_to_second,
            front_month_price = excluded.front_month_price,
            second_month_price = excluded.second_month_price",
        params![
            row.timestamp,
            row.date_only,
            row.spot_price,
            row.num_contracts as i64,
            row.curve_shape,
            row.trading_signal,
            row.roll_carry_pct,
            row.roll_carry_pts,
            row.synthetic_index,
            row.spot_to_front,
            row.front_to_second,
            row.front_month_price,
            row.second_month_price,
        ],
    )?;

    tx.execute("DELETE FROM contracts WHERE timestamp = ?1", [&row.timestamp])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO contracts
             (timestamp, symbol, price, days_to_expiration, expiration_date, contract_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for c in contracts {
            stmt.execute(params![
                row.timestamp,
                c.symbol,
                c.price,
                c.days_to_expiration,
                c.expiration_date.map(|d| d.format("%Y-%m-%d").to_string()),
                c.order as i64,
            ])?;
        }
    }

    tx.execute("DELETE FROM inversions WHERE timestamp = ?1", [&row.timestamp])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO inversions
             (timestamp, contract1, contract2, price1, price2, magnitude, inversion_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for inv in inversions {
            stmt.execute(params![
                row.timestamp,
                inv.contract1,
                inv.contract2,
                inv.price1,
                inv.price2,
                inv.magnitude,
                inv.kind.as_str(),
            ])?;
        }
    }

    Ok(())
}
