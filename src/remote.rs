use serde::Deserialize;

use crate::auth::Authenticator;
use crate::error::{Result, SatchelError};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Wire types: exactly what the aggregator returns, camelCase on the wire.
// Money stays a string here; conversion to Decimal happens in the reconciler.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    pub remote_id: String,
    pub institution_name: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub available_balance: String,
    #[serde(default)]
    pub current_balance: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub institution_name: Option<String>,
}

/// Payload of the balance-refresh endpoint: ids plus freshly computed
/// balances only. An empty string means the institution reported no value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBalance {
    pub id: String,
    #[serde(default)]
    pub available_balance: String,
    #[serde(default)]
    pub current_balance: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    pub date: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    pub item_id: String,
    pub webhook_code: String,
    pub webhook_type: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub remote_id: String,
    pub institution_name: String,
}

// ---------------------------------------------------------------------------
// Endpoint calls. Every one goes through the authenticated executor.
// ---------------------------------------------------------------------------

pub fn list_items(auth: &Authenticator, session: &mut Session) -> Result<Vec<RemoteItem>> {
    auth.execute(session, |token| auth.client().get("/items", Some(token)))?
        .require_success()?
        .json()
}

/// Map a nickname to the upstream item. Always a fresh round trip; exact
/// match, first hit in upstream order wins.
pub fn resolve_item(
    auth: &Authenticator,
    session: &mut Session,
    nickname: &str,
) -> Result<ResolvedItem> {
    let items = list_items(auth, session)?;
    items
        .into_iter()
        .find(|item| item.nickname == nickname)
        .map(|item| ResolvedItem {
            remote_id: item.remote_id,
            institution_name: item.institution_name,
        })
        .ok_or_else(|| SatchelError::UnknownItem(nickname.to_string()))
}

pub fn rename_item(
    auth: &Authenticator,
    session: &mut Session,
    item_id: &str,
    new_name: &str,
) -> Result<()> {
    let body = serde_json::json!({ "name": new_name });
    auth.execute(session, |token| {
        auth.client()
            .put(&format!("/items/{item_id}/name"), Some(token), Some(body.clone()))
    })?
    .require_success()?;
    Ok(())
}

pub fn delete_item(auth: &Authenticator, session: &mut Session, item_id: &str) -> Result<()> {
    auth.execute(session, |token| {
        auth.client().delete(&format!("/items/{item_id}"), Some(token))
    })?
    .require_success()?;
    Ok(())
}

/// Initial account fetch: full metadata rows for a freshly linked item.
pub fn fetch_accounts(
    auth: &Authenticator,
    session: &mut Session,
    item_id: &str,
) -> Result<Vec<RemoteAccount>> {
    auth.execute(session, |token| {
        auth.client()
            .post(&format!("/items/{item_id}/access/accounts"), Some(token), None)
    })?
    .require_success()?
    .json()
}

/// Trigger an upstream balance recomputation and return the results.
pub fn refresh_balances(
    auth: &Authenticator,
    session: &mut Session,
    item_id: &str,
) -> Result<Vec<RemoteBalance>> {
    auth.execute(session, |token| {
        auth.client()
            .put(&format!("/items/{item_id}/access/balances"), Some(token), None)
    })?
    .require_success()?
    .json()
}

/// Complete current transaction snapshot for the item's accounts.
pub fn pull_transactions(
    auth: &Authenticator,
    session: &mut Session,
    item_id: &str,
) -> Result<Vec<RemoteTransaction>> {
    auth.execute(session, |token| {
        auth.client()
            .post(&format!("/items/{item_id}/access/transactions"), Some(token), None)
    })?
    .require_success()?
    .json()
}

/// Fetch pending drift notifications matching one (code, type) category and
/// mark that category consumed upstream.
pub fn acknowledge_webhooks(
    auth: &Authenticator,
    session: &mut Session,
    item_id: &str,
    webhook_type: &str,
    webhook_code: &str,
) -> Result<Vec<WebhookRecord>> {
    let body = serde_json::json!({
        "itemId": item_id,
        "webhookCode": webhook_code,
        "webhookType": webhook_type,
    });
    auth.execute(session, |token| {
        auth.client()
            .put("/items/webhook-records", Some(token), Some(body.clone()))
    })?
    .require_success()?
    .json()
}
