pub mod accounts;
pub mod backup;
pub mod drift;
pub mod init;
pub mod items;
pub mod login;
pub mod status;
pub mod sync;
pub mod transactions;

use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::error::Result;
use crate::session::{Session, SessionStore};
use crate::settings::load_settings;

/// Everything a remote-facing command needs: the transport, the credential
/// store, and the loaded session.
pub(crate) fn open_remote_context() -> Result<(ApiClient, SessionStore, Session)> {
    let settings = load_settings();
    let client = ApiClient::new(&settings.api_url)?;
    let store = SessionStore::open_default();
    let session = store.require()?;
    Ok((client, store, session))
}

#[derive(Parser)]
#[command(name = "satchel", about = "Mirror your bank accounts and transactions from an upstream aggregator.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Satchel: choose a data directory and initialize the cache.
    Init {
        /// Path for Satchel data (default: platform data dir)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Aggregator API base URL
        #[arg(long = "api-url")]
        api_url: Option<String>,
    },
    /// Store the aggregator token pair for an owner.
    Login {
        /// Owner identity the cached data belongs to
        #[arg(long)]
        owner: String,
    },
    /// Purge stored credentials.
    Logout,
    /// Show session, cache and database status.
    Status,
    /// Manage linked institution connections.
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Manage cached accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Browse or export cached transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Reconcile an item's balances and transactions with the aggregator.
    Sync {
        /// Item nickname (see `satchel items list`)
        nickname: String,
    },
    /// Check and acknowledge pending drift notifications for an item.
    Drift {
        /// Item nickname
        nickname: String,
    },
    /// Back up the cache database.
    Backup {
        /// Output path (default: <data_dir>/backups/satchel-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// List linked institutions.
    List,
    /// Rename an item's nickname.
    Rename {
        /// Current nickname
        nickname: String,
        /// New nickname
        new_name: String,
    },
    /// Unlink an institution.
    Delete {
        /// Nickname of the item to delete
        nickname: String,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Fetch account metadata for an item from the aggregator.
    Fetch {
        /// Item nickname
        #[arg(long)]
        item: String,
    },
    /// List cached accounts.
    List,
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List cached transactions.
    List {
        /// Filter by account id
        #[arg(long)]
        account: Option<String>,
    },
    /// Export cached transactions to CSV.
    Export {
        /// Output file path
        #[arg(long)]
        output: String,
    },
}
