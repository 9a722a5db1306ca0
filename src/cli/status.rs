use sha2::{Digest, Sha256};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::session::SessionStore;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("satchel.db");

    match SessionStore::open_default().load()? {
        Some(session) => println!(
            "Session:    {} (token {})",
            session.owner(),
            fingerprint(session.access_token())
        ),
        None => println!("Session:    (not logged in)"),
    }
    println!("Aggregator: {}", settings.api_url);
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let accounts: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
        let transactions: i64 =
            conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;

        println!();
        println!("Accounts:      {accounts}");
        println!("Transactions:  {transactions}");
    } else {
        println!();
        println!("Database not found. Run `satchel init` to set up.");
    }

    Ok(())
}

/// Short digest so the user can tell credential sets apart without ever
/// printing a token.
fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())[..8].to_string()
}
