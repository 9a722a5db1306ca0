use crate::auth::Authenticator;
use crate::error::Result;
use crate::remote::{self, WebhookRecord};
use crate::session::Session;

/// What a pending drift notification asks of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// Credential failure or institution-side disconnect; the item must be
    /// linked again.
    RelinkRequired,
    /// New data upstream; a resync would pick it up.
    ResyncAdvised,
    /// Code we don't act on.
    Ignored,
}

/// Total mapping over known webhook codes. Unknown codes land in `Ignored`
/// instead of falling through silently.
pub fn classify(code: &str) -> Drift {
    match code {
        "ITEM_LOGIN_REQUIRED" | "ITEM_ERROR" | "ITEM_BAD_STATE" | "NEW_ACCOUNTS_AVAILABLE"
        | "PENDING_DISCONNECT" => Drift::RelinkRequired,
        "DEFAULT_UPDATE" | "TRANSACTIONS_UPDATED" | "TRANSACTIONS_REMOVED" | "INITIAL_UPDATE"
        | "HISTORICAL_UPDATE" | "SYNC_UPDATES_AVAILABLE" => Drift::ResyncAdvised,
        _ => Drift::Ignored,
    }
}

/// Every (type, code) category the post-sync sweep checks and acknowledges.
pub const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("ITEM", "ITEM_LOGIN_REQUIRED"),
    ("ITEM", "ITEM_ERROR"),
    ("ITEM", "ITEM_BAD_STATE"),
    ("ITEM", "NEW_ACCOUNTS_AVAILABLE"),
    ("ITEM", "PENDING_DISCONNECT"),
    ("TRANSACTIONS", "DEFAULT_UPDATE"),
    ("TRANSACTIONS", "TRANSACTIONS_UPDATED"),
    ("TRANSACTIONS", "TRANSACTIONS_REMOVED"),
    ("TRANSACTIONS", "INITIAL_UPDATE"),
    ("TRANSACTIONS", "HISTORICAL_UPDATE"),
    ("TRANSACTIONS", "SYNC_UPDATES_AVAILABLE"),
];

/// The category consumed right before a snapshot pull, so a successful sync
/// doesn't immediately re-advise itself.
pub const PRE_SYNC_CATEGORY: (&str, &str) = ("TRANSACTIONS", "DEFAULT_UPDATE");

#[derive(Debug, Default)]
pub struct DriftReport {
    pub relink: Vec<String>,
    pub resync: Vec<String>,
}

impl DriftReport {
    pub fn note(&mut self, record: &WebhookRecord) {
        match classify(&record.webhook_code) {
            Drift::RelinkRequired => self.relink.push(record.webhook_code.clone()),
            Drift::ResyncAdvised => self.resync.push(record.webhook_code.clone()),
            Drift::Ignored => {}
        }
    }

    /// Advisory shown when the user asked about drift. Re-link always
    /// outranks resync; resync alone is purely advisory.
    pub fn advisory(&self, nickname: &str) -> Option<String> {
        if let Some(text) = self.relink_advisory(nickname) {
            return Some(text);
        }
        if !self.resync.is_empty() {
            return Some(format!(
                "New data is waiting for '{nickname}' ({}). Run `satchel sync {nickname}` to pick it up.",
                self.resync.join(", ")
            ));
        }
        None
    }

    /// The re-link half only. Used after a sync, where "new data waiting"
    /// notices were just consumed by the sync itself.
    pub fn relink_advisory(&self, nickname: &str) -> Option<String> {
        if self.relink.is_empty() {
            return None;
        }
        Some(format!(
            "'{nickname}' has lost its connection ({}). Re-link it with your institution.",
            self.relink.join(", ")
        ))
    }
}

/// Fetch-and-acknowledge every known category for one item. Acknowledgment is
/// the fetch; nothing is re-linked or resynced automatically.
pub fn sweep(auth: &Authenticator, session: &mut Session, item_id: &str) -> Result<DriftReport> {
    let mut report = DriftReport::default();
    for (webhook_type, code) in KNOWN_CATEGORIES {
        let records = remote::acknowledge_webhooks(auth, session, item_id, webhook_type, code)?;
        for record in &records {
            report.note(record);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::scripted_client;
    use crate::session::SessionStore;

    fn record(code: &str) -> WebhookRecord {
        WebhookRecord {
            item_id: "item-1".to_string(),
            webhook_code: code.to_string(),
            webhook_type: "ITEM".to_string(),
        }
    }

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(classify("ITEM_LOGIN_REQUIRED"), Drift::RelinkRequired);
        assert_eq!(classify("PENDING_DISCONNECT"), Drift::RelinkRequired);
        assert_eq!(classify("DEFAULT_UPDATE"), Drift::ResyncAdvised);
        assert_eq!(classify("SYNC_UPDATES_AVAILABLE"), Drift::ResyncAdvised);
        assert_eq!(classify("SOMETHING_NEW"), Drift::Ignored);
        assert_eq!(classify(""), Drift::Ignored);
    }

    #[test]
    fn test_every_known_category_classifies_non_ignored() {
        for (_, code) in KNOWN_CATEGORIES {
            assert_ne!(classify(code), Drift::Ignored, "category {code} must classify");
        }
    }

    #[test]
    fn test_relink_outranks_resync() {
        let mut report = DriftReport::default();
        report.note(&record("ITEM_LOGIN_REQUIRED"));
        report.note(&record("DEFAULT_UPDATE"));

        let advisory = report.advisory("personal").unwrap();
        assert!(advisory.contains("Re-link"));
        assert!(advisory.contains("ITEM_LOGIN_REQUIRED"));
        assert!(!advisory.contains("DEFAULT_UPDATE"));
    }

    #[test]
    fn test_resync_alone_is_advisory() {
        let mut report = DriftReport::default();
        report.note(&record("TRANSACTIONS_REMOVED"));

        let advisory = report.advisory("personal").unwrap();
        assert!(advisory.contains("satchel sync personal"));
        assert!(report.relink_advisory("personal").is_none());
    }

    #[test]
    fn test_unknown_codes_produce_no_advisory() {
        let mut report = DriftReport::default();
        report.note(&record("FUTURE_CODE"));
        assert!(report.advisory("personal").is_none());
    }

    #[test]
    fn test_item_error_with_removed_transactions_emits_relink_only() {
        let mut report = DriftReport::default();
        report.note(&record("ITEM_ERROR"));
        report.note(&record("TRANSACTIONS_REMOVED"));

        let advisory = report.advisory("personal").unwrap();
        assert!(advisory.contains("ITEM_ERROR"));
        assert!(!advisory.contains("sync personal"));
    }

    #[test]
    fn test_sweep_acknowledges_every_category() {
        let (client, fake) = scripted_client("https://api.test");
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());

        for (_, code) in KNOWN_CATEGORIES {
            if *code == "ITEM_ERROR" {
                fake.push(
                    200,
                    r#"[{"itemId":"item-1","webhookCode":"ITEM_ERROR","webhookType":"ITEM"}]"#,
                );
            } else {
                fake.push(200, "[]");
            }
        }

        let auth = Authenticator::new(&client, &store);
        let report = sweep(&auth, &mut session, "item-1").unwrap();

        assert_eq!(report.relink, vec!["ITEM_ERROR"]);
        assert!(report.resync.is_empty());

        let requests = fake.requests.borrow();
        assert_eq!(requests.len(), KNOWN_CATEGORIES.len());
        let sent: Vec<(String, String)> = requests
            .iter()
            .map(|r| {
                let body = r.body.as_ref().unwrap();
                (
                    body["webhookType"].as_str().unwrap().to_string(),
                    body["webhookCode"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        for (webhook_type, code) in KNOWN_CATEGORIES {
            assert!(sent.contains(&(webhook_type.to_string(), code.to_string())));
        }
    }
}
