use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{Result, SatchelError};
use crate::remote::{RemoteAccount, RemoteBalance, RemoteTransaction};

#[derive(Debug, Default)]
pub struct BalanceSummary {
    pub updated: usize,
    pub skipped: usize,
}

impl BalanceSummary {
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

/// Balances come over the wire as strings. Empty means the institution
/// reported no value: stored as NULL, never as zero.
pub fn parse_balance(raw: &str) -> Result<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|e| SatchelError::Decode(format!("bad balance `{trimmed}`: {e}")))
}

/// Upsert refreshed balances keyed by (owner, account id). Best effort: an
/// account whose balances fail to parse or store is logged and skipped, the
/// rest of the batch still lands.
pub fn upsert_balances(
    conn: &Connection,
    owner: &str,
    balances: &[RemoteBalance],
) -> Result<BalanceSummary> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut summary = BalanceSummary::default();

    for balance in balances {
        let parsed = parse_balance(&balance.available_balance)
            .and_then(|avail| parse_balance(&balance.current_balance).map(|cur| (avail, cur)));
        let (available, current) = match parsed {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("skipping account {}: {e}", balance.id);
                summary.skipped += 1;
                continue;
            }
        };

        let stored = conn.execute(
            "INSERT INTO accounts (id, owner_id, available_balance, current_balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(owner_id, id) DO UPDATE SET
                available_balance = excluded.available_balance,
                current_balance = excluded.current_balance,
                updated_at = excluded.updated_at",
            rusqlite::params![
                balance.id,
                owner,
                available.map(|d| d.to_string()),
                current.map(|d| d.to_string()),
                now
            ],
        );
        match stored {
            Ok(_) => summary.updated += 1,
            Err(e) => {
                log::warn!("failed to store account {}: {e}", balance.id);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Upsert full account metadata from the initial account fetch. Same
/// best-effort semantics as the balance path.
pub fn upsert_account_details(
    conn: &Connection,
    owner: &str,
    institution: &str,
    accounts: &[RemoteAccount],
) -> Result<BalanceSummary> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut summary = BalanceSummary::default();

    for account in accounts {
        let parsed = parse_balance(&account.available_balance)
            .and_then(|avail| parse_balance(&account.current_balance).map(|cur| (avail, cur)));
        let (available, current) = match parsed {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("skipping account {}: {e}", account.id);
                summary.skipped += 1;
                continue;
            }
        };

        let stored = conn.execute(
            "INSERT INTO accounts (id, owner_id, name, account_type, subtype, mask, official_name,
                                   available_balance, current_balance, currency_code, institution,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
             ON CONFLICT(owner_id, id) DO UPDATE SET
                name = excluded.name,
                account_type = excluded.account_type,
                subtype = excluded.subtype,
                mask = excluded.mask,
                official_name = excluded.official_name,
                available_balance = excluded.available_balance,
                current_balance = excluded.current_balance,
                currency_code = excluded.currency_code,
                institution = excluded.institution,
                updated_at = excluded.updated_at",
            rusqlite::params![
                account.id,
                owner,
                account.name,
                account.account_type,
                account.subtype,
                account.mask,
                account.official_name,
                available.map(|d| d.to_string()),
                current.map(|d| d.to_string()),
                account.currency_code,
                institution,
                now
            ],
        );
        match stored {
            Ok(_) => summary.updated += 1,
            Err(e) => {
                log::warn!("failed to store account {}: {e}", account.id);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// The pre-insert wipe is scoped to the owner, not the item: a single-item
/// sync clears every cached transaction for the acting owner. Kept isolated
/// here so the scope can be narrowed without touching the reconciler.
pub fn clear_owner_transactions(conn: &Connection, owner: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM transactions WHERE owner_id = ?1", [owner])?;
    Ok(deleted)
}

/// Replace the owner's cached transactions with the upstream snapshot.
/// Fail-fast: a bad amount or a store failure aborts mid-batch, leaving the
/// cache deleted-but-partially-repopulated. No compensating rollback.
pub fn replace_transactions(
    conn: &Connection,
    owner: &str,
    transactions: &[RemoteTransaction],
) -> Result<usize> {
    clear_owner_transactions(conn, owner)?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut inserted = 0;
    for txn in transactions {
        let amount = Decimal::from_str(txn.amount.trim()).map_err(|e| {
            SatchelError::Decode(format!("bad amount `{}` on transaction {}: {e}", txn.amount, txn.id))
        })?;
        conn.execute(
            "INSERT OR REPLACE INTO transactions
                (id, owner_id, account_id, amount, currency_code, date, merchant, payment_channel,
                 category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                txn.id,
                owner,
                txn.account_id,
                amount.to_string(),
                txn.currency_code,
                txn.date,
                txn.merchant_name,
                txn.payment_channel,
                txn.category,
                now
            ],
        )?;
        inserted += 1;
    }

    Ok(inserted)
}
