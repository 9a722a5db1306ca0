use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CachedAccount {
    pub id: String,
    pub name: Option<String>,
    pub account_type: Option<String>,
    pub subtype: Option<String>,
    pub mask: Option<String>,
    pub official_name: Option<String>,
    pub available_balance: Option<Decimal>,
    pub current_balance: Option<Decimal>,
    pub currency_code: Option<String>,
    pub institution: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CachedTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: Decimal,
    pub currency_code: Option<String>,
    pub date: String,
    pub merchant: Option<String>,
    pub payment_channel: Option<String>,
    pub category: Option<String>,
}

/// Decimal columns are stored as their canonical string rendering. A NULL
/// column stays `None`; stored text that no longer parses also comes back as
/// `None` rather than poisoning every read of the row.
pub fn decimal_from_sql(raw: Option<String>) -> Option<Decimal> {
    raw.and_then(|s| Decimal::from_str(&s).ok())
}

pub fn load_accounts(conn: &Connection, owner: &str) -> Result<Vec<CachedAccount>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, account_type, subtype, mask, official_name,
                available_balance, current_balance, currency_code, institution, updated_at
         FROM accounts WHERE owner_id = ?1 ORDER BY name, id",
    )?;
    let rows = stmt
        .query_map([owner], |row| {
            Ok(CachedAccount {
                id: row.get(0)?,
                name: row.get(1)?,
                account_type: row.get(2)?,
                subtype: row.get(3)?,
                mask: row.get(4)?,
                official_name: row.get(5)?,
                available_balance: decimal_from_sql(row.get(6)?),
                current_balance: decimal_from_sql(row.get(7)?),
                currency_code: row.get(8)?,
                institution: row.get(9)?,
                updated_at: row.get(10)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_transactions(
    conn: &Connection,
    owner: &str,
    account_id: Option<&str>,
) -> Result<Vec<CachedTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, amount, currency_code, date, merchant, payment_channel, category
         FROM transactions
         WHERE owner_id = ?1 AND (?2 IS NULL OR account_id = ?2)
         ORDER BY date DESC, id",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![owner, account_id], |row| {
            Ok(CachedTransaction {
                id: row.get(0)?,
                account_id: row.get(1)?,
                amount: decimal_from_sql(row.get(2)?).unwrap_or_default(),
                currency_code: row.get(3)?,
                date: row.get(4)?,
                merchant: row.get(5)?,
                payment_channel: row.get(6)?,
                category: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
