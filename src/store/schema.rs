use rusqlite::Connection;

/// Create tables and indexes if they do not exist yet.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            timestamp           TEXT PRIMARY KEY,
            date_only           TEXT NOT NULL,
            spot_price          REAL NOT NULL,
            num_contracts       INTEGER NOT NULL,
            curve_shape         TEXT NOT NULL,
            trading_signal      TEXT NOT NULL,
            roll_carry_pct      REAL NOT NULL DEFAULT 0,
            roll_carry_pts      REAL NOT NULL DEFAULT 0,
            synthetic_index     REAL NOT NULL DEFAULT 0,
            spot_to_front       REAL NOT NULL DEFAULT 0,
            front_to_second     REAL NOT NULL DEFAULT 0,
            front_month_price   REAL,
            second_month_price  REAL,
            created_at          INTEGER DEFAULT (unixepoch())
        );

        CREATE TABLE IF NOT EXISTS contracts (
            timestamp           TEXT NOT NULL REFERENCES snapshots(timestamp) ON DELETE CASCADE,
            symbol              TEXT NOT NULL,
            price               REAL NOT NULL,
            days_to_expiration  INTEGER NOT NULL,
            expiration_date     TEXT,
            contract_order      INTEGER NOT NULL,
            UNIQUE(timestamp, symbol)
        );

        CREATE TABLE IF NOT EXISTS inversions (
            timestamp       TEXT NOT NULL REFERENCES snapshots(timestamp) ON DELETE CASCADE,
            contract1       TEXT NOT NULL,
            contract2       TEXT NOT NULL,
            price1          REAL NOT NULL,
            price2          REAL NOT NULL,
            magnitude       REAL NOT NULL,
            inversion_type  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_snapshots_date ON snapshots(date_only);
        CREATE INDEX IF NOT EXISTS idx_contracts_timestamp ON contracts(timestamp);
        CREATE INDEX IF NOT EXISTS idx_contracts_symbol ON contracts(symbol);
        CREATE INDEX IF NOT EXISTS idx_inversions_timestamp ON inversions(timestamp);
        ",
    )
}
