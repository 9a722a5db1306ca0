use comfy_table::{Cell, Table};

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::fmt::money;
use crate::models::load_transactions;
use crate::session::SessionStore;
use crate::settings::db_path;

pub fn list(account: Option<&str>) -> Result<()> {
    let store = SessionStore::open_default();
    let session = store.require()?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let transactions = load_transactions(&conn, session.owner(), account)?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Merchant", "Amount", "Category", "Channel", "Account"]);
    for txn in &transactions {
        table.add_row(vec![
            Cell::new(&txn.date),
            Cell::new(txn.merchant.as_deref().unwrap_or("—")),
            Cell::new(money(txn.amount)),
            Cell::new(txn.category.as_deref().unwrap_or_default()),
            Cell::new(txn.payment_channel.as_deref().unwrap_or_default()),
            Cell::new(&txn.account_id),
        ]);
    }
    println!("Transactions ({})\n{table}", transactions.len());
    Ok(())
}

pub fn export(output: &str) -> Result<()> {
    let store = SessionStore::open_default();
    let session = store.require()?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let transactions = load_transactions(&conn, session.owner(), None)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["id", "account_id", "date", "amount", "currency", "merchant", "channel", "category"])?;
    for txn in &transactions {
        let amount = txn.amount.to_string();
        writer.write_record([
            txn.id.as_str(),
            txn.account_id.as_str(),
            txn.date.as_str(),
            amount.as_str(),
            txn.currency_code.as_deref().unwrap_or(""),
            txn.merchant.as_deref().unwrap_or(""),
            txn.payment_channel.as_deref().unwrap_or(""),
            txn.category.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    println!("Exported {} transactions to {output}", transactions.len());
    Ok(())
}
