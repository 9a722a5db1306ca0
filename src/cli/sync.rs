use colored::Colorize;

use crate::auth::Authenticator;
use crate::cli::open_remote_context;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::db_path;
use crate::sync::run_sync;

pub fn run(nickname: &str) -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let auth = Authenticator::new(&client, &store);
    let outcome = run_sync(&conn, &auth, &mut session, nickname)?;

    println!("Synced '{nickname}' ({})", outcome.institution);
    if outcome.balances.is_partial() {
        println!(
            "Accounts:      {} updated, {} skipped (see log)",
            outcome.balances.updated, outcome.balances.skipped
        );
    } else {
        println!("Accounts:      {} updated", outcome.balances.updated);
    }
    println!("Transactions:  {} cached", outcome.transactions);

    if let Some(advisory) = outcome.drift.relink_advisory(nickname) {
        println!("{}", advisory.yellow());
    }
    Ok(())
}
