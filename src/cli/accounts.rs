use comfy_table::{Cell, Table};

use crate::auth::Authenticator;
use crate::cli::open_remote_context;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::fmt::money_opt;
use crate::models::load_accounts;
use crate::reconcile;
use crate::remote;
use crate::session::SessionStore;
use crate::settings::db_path;

pub fn fetch(item_nickname: &str) -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let auth = Authenticator::new(&client, &store);
    let item = remote::resolve_item(&auth, &mut session, item_nickname)?;
    let accounts = remote::fetch_accounts(&auth, &mut session, &item.remote_id)?;
    let summary = reconcile::upsert_account_details(
        &conn,
        session.owner(),
        &item.institution_name,
        &accounts,
    )?;

    if summary.is_partial() {
        println!(
            "Fetched {} accounts from {} ({} skipped, see log)",
            summary.updated, item.institution_name, summary.skipped
        );
    } else {
        println!("Fetched {} accounts from {}", summary.updated, item.institution_name);
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let store = SessionStore::open_default();
    let session = store.require()?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let accounts = load_accounts(&conn, session.owner())?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Type", "Mask", "Available", "Current", "Institution", "Updated"]);
    for account in accounts {
        table.add_row(vec![
            Cell::new(account.name.unwrap_or_else(|| account.id.clone())),
            Cell::new(account.account_type.unwrap_or_default()),
            Cell::new(account.mask.unwrap_or_default()),
            Cell::new(money_opt(account.available_balance)),
            Cell::new(money_opt(account.current_balance)),
            Cell::new(account.institution.unwrap_or_default()),
            Cell::new(account.updated_at),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
