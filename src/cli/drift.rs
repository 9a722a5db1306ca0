use colored::Colorize;

use crate::auth::Authenticator;
use crate::cli::open_remote_context;
use crate::error::Result;
use crate::remote;
use crate::webhooks;

pub fn run(nickname: &str) -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let auth = Authenticator::new(&client, &store);
    let item = remote::resolve_item(&auth, &mut session, nickname)?;
    let report = webhooks::sweep(&auth, &mut session, &item.remote_id)?;

    match report.advisory(nickname) {
        Some(advisory) => println!("{}", advisory.yellow()),
        None => println!("No pending drift notifications for '{nickname}'."),
    }
    Ok(())
}
