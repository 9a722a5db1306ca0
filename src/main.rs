mod api;
mod auth;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod reconcile;
mod remote;
mod session;
mod settings;
mod sync;
mod webhooks;

use clap::{CommandFactory, Parser};

use cli::{AccountsCommands, Cli, Commands, ItemsCommands, TransactionsCommands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, api_url } => cli::init::run(data_dir, api_url),
        Commands::Login { owner } => cli::login::login(&owner),
        Commands::Logout => cli::login::logout(),
        Commands::Status => cli::status::run(),
        Commands::Items { command } => match command {
            ItemsCommands::List => cli::items::list(),
            ItemsCommands::Rename { nickname, new_name } => cli::items::rename(&nickname, &new_name),
            ItemsCommands::Delete { nickname } => cli::items::delete(&nickname),
        },
        Commands::Accounts { command } => match command {
            AccountsCommands::Fetch { item } => cli::accounts::fetch(&item),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { account } => cli::transactions::list(account.as_deref()),
            TransactionsCommands::Export { output } => cli::transactions::export(&output),
        },
        Commands::Sync { nickname } => cli::sync::run(&nickname),
        Commands::Drift { nickname } => cli::drift::run(&nickname),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "satchel", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
