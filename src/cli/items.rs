use comfy_table::{Cell, Table};

use crate::auth::Authenticator;
use crate::cli::open_remote_context;
use crate::error::Result;
use crate::remote;

pub fn list() -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let auth = Authenticator::new(&client, &store);
    let items = remote::list_items(&auth, &mut session)?;

    let mut table = Table::new();
    table.set_header(vec!["Nickname", "Institution", "Remote ID"]);
    for item in items {
        table.add_row(vec![
            Cell::new(item.nickname),
            Cell::new(item.institution_name),
            Cell::new(item.remote_id),
        ]);
    }
    println!("Linked items\n{table}");
    Ok(())
}

pub fn rename(nickname: &str, new_name: &str) -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let auth = Authenticator::new(&client, &store);
    let item = remote::resolve_item(&auth, &mut session, nickname)?;
    remote::rename_item(&auth, &mut session, &item.remote_id, new_name)?;
    println!("Renamed '{nickname}' to '{new_name}'");
    Ok(())
}

pub fn delete(nickname: &str) -> Result<()> {
    let (client, store, mut session) = open_remote_context()?;
    let auth = Authenticator::new(&client, &store);
    let item = remote::resolve_item(&auth, &mut session, nickname)?;
    remote::delete_item(&auth, &mut session, &item.remote_id)?;
    println!("Deleted '{nickname}' ({})", item.institution_name);
    Ok(())
}
