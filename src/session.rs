use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, SatchelError};
use crate::settings::config_dir;

/// The active credential set: one access/refresh pair and the identity the
/// cache rows belong to. Tokens are wiped from memory on drop.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    #[zeroize(skip)]
    owner: String,
}

impl Session {
    pub fn new(access_token: String, refresh_token: String, owner: String) -> Self {
        Self { access_token, refresh_token, owner }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Replace both tokens at once. The pair is only ever swapped as a unit.
    pub fn rotate(&mut self, access_token: String, refresh_token: String) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();
        self.access_token = access_token;
        self.refresh_token = refresh_token;
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Self {
        Self::new(config_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session exists; a present-but-unreadable file is an
    /// error rather than a silent logout.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&content)
            .map_err(|e| SatchelError::Settings(format!("bad session file: {e}")))?;
        Ok(Some(session))
    }

    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or(SatchelError::NoSession)
    }

    /// Write-then-rename so a reader never observes an access token from one
    /// exchange next to a refresh token from another.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| SatchelError::Settings(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, format!("{json}\n"))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn purge(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
