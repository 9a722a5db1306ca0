use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// Money columns hold decimal strings; NULL means the institution reported no
// value, which is distinct from "0".
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    name TEXT,
    account_type TEXT,
    subtype TEXT,
    mask TEXT,
    official_name TEXT,
    available_balance TEXT,
    current_balance TEXT,
    currency_code TEXT,
    institution TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (owner_id, id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    account_id TEXT NOT NULL,
    amount TEXT NOT NULL,
    currency_code TEXT,
    date TEXT NOT NULL,
    merchant TEXT,
    payment_channel TEXT,
    category TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_owner ON transactions(owner_id);
CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
