use crate::error::{Result, SatchelError};
use crate::session::{Session, SessionStore};

pub fn login(owner: &str) -> Result<()> {
    let access = rpassword::prompt_password("Access token: ")?;
    let refresh = rpassword::prompt_password("Refresh token: ")?;
    if access.trim().is_empty() || refresh.trim().is_empty() {
        return Err(SatchelError::Other("tokens cannot be empty".to_string()));
    }

    let store = SessionStore::open_default();
    let session = Session::new(
        access.trim().to_string(),
        refresh.trim().to_string(),
        owner.to_string(),
    );
    store.save(&session)?;

    println!("Logged in as {owner}");
    Ok(())
}

pub fn logout() -> Result<()> {
    SessionStore::open_default().purge()?;
    println!("Logged out, credentials removed.");
    Ok(())
}
