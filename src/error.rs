use thiserror::Error;

#[derive(Error, Debug)]
pub enum SatchelError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Request rejected ({status}): {body}")]
    Client { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No linked item named '{0}'")]
    UnknownItem(String),

    #[error("Not logged in. Run `satchel login` first.")]
    NoSession,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SatchelError>;
