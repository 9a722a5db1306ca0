use rusqlite::Connection;

use crate::auth::Authenticator;
use crate::error::Result;
use crate::reconcile::{self, BalanceSummary};
use crate::remote;
use crate::session::Session;
use crate::webhooks::{self, DriftReport, PRE_SYNC_CATEGORY};

#[derive(Debug)]
pub struct SyncOutcome {
    pub institution: String,
    pub balances: BalanceSummary,
    pub transactions: usize,
    pub drift: DriftReport,
}

/// One full reconciliation pass for an item: resolve the nickname, refresh
/// and upsert balances, consume the pending "new data" notice, replace the
/// transaction cache with the upstream snapshot, then sweep and acknowledge
/// the remaining drift notifications.
pub fn run_sync(
    conn: &Connection,
    auth: &Authenticator,
    session: &mut Session,
    nickname: &str,
) -> Result<SyncOutcome> {
    let item = remote::resolve_item(auth, session, nickname)?;
    let owner = session.owner().to_string();

    let balances = remote::refresh_balances(auth, session, &item.remote_id)?;
    let balance_summary = reconcile::upsert_balances(conn, &owner, &balances)?;

    let (pre_type, pre_code) = PRE_SYNC_CATEGORY;
    remote::acknowledge_webhooks(auth, session, &item.remote_id, pre_type, pre_code)?;

    let snapshot = remote::pull_transactions(auth, session, &item.remote_id)?;
    let transactions = reconcile::replace_transactions(conn, &owner, &snapshot)?;

    let drift = webhooks::sweep(auth, session, &item.remote_id)?;

    Ok(SyncOutcome {
        institution: item.institution_name,
        balances: balance_summary,
        transactions,
        drift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::scripted_client;
    use crate::db::{get_connection, init_db};
    use crate::error::SatchelError;
    use crate::session::SessionStore;
    use crate::webhooks::KNOWN_CATEGORIES;

    const ITEMS: &str =
        r#"[{"remoteId":"item-1","institutionName":"First Bank","nickname":"personal"}]"#;
    const BALANCES: &str =
        r#"[{"id":"acc1","availableBalance":"120.50","currentBalance":""}]"#;
    const SNAPSHOT: &str = r#"[
        {"id":"t1","accountId":"acc1","amount":"-4.20","currencyCode":"USD","date":"2026-01-15",
         "merchantName":"Acme","paymentChannel":"online","category":"Shops"},
        {"id":"t2","accountId":"acc1","amount":"1250.00","currencyCode":"USD","date":"2026-01-16",
         "merchantName":null,"paymentChannel":"other","category":"Transfer"}
    ]"#;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn test_session_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn test_full_sync_flow() {
        let (client, fake) = scripted_client("https://api.test");
        let (dir, conn) = test_db();
        let store = test_session_store(&dir);
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());

        fake.push(200, ITEMS);
        fake.push(200, BALANCES);
        fake.push(200, "[]"); // pre-sync acknowledgement
        fake.push(200, SNAPSHOT);
        for _ in KNOWN_CATEGORIES {
            fake.push(200, "[]");
        }

        let auth = Authenticator::new(&client, &store);
        let outcome = run_sync(&conn, &auth, &mut session, "personal").unwrap();

        assert_eq!(outcome.institution, "First Bank");
        assert_eq!(outcome.balances.updated, 1);
        assert_eq!(outcome.transactions, 2);
        assert!(outcome.drift.advisory("personal").is_none());

        let (available, current): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT available_balance, current_balance FROM accounts WHERE id = 'acc1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(available.as_deref(), Some("120.50"));
        assert_eq!(current, None);

        let txns: i64 = conn
            .query_row("SELECT count(*) FROM transactions WHERE owner_id = 'owner-1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(txns, 2);

        // resolve → balances → pre-ack → snapshot → sweep, in that order
        let urls: Vec<String> = fake.requests.borrow().iter().map(|r| r.url.clone()).collect();
        assert_eq!(urls[0], "https://api.test/items");
        assert_eq!(urls[1], "https://api.test/items/item-1/access/balances");
        assert_eq!(urls[2], "https://api.test/items/webhook-records");
        assert_eq!(urls[3], "https://api.test/items/item-1/access/transactions");
        assert_eq!(urls.len(), 4 + KNOWN_CATEGORIES.len());
    }

    #[test]
    fn test_unknown_nickname_aborts_before_any_write() {
        let (client, fake) = scripted_client("https://api.test");
        let (dir, conn) = test_db();
        let store = test_session_store(&dir);
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());

        fake.push(200, "[]");

        let auth = Authenticator::new(&client, &store);
        let err = run_sync(&conn, &auth, &mut session, "missing").unwrap_err();
        assert!(matches!(err, SatchelError::UnknownItem(_)));
        assert_eq!(fake.requests.borrow().len(), 1);
    }

    #[test]
    fn test_failed_snapshot_pull_leaves_cache_untouched() {
        let (client, fake) = scripted_client("https://api.test");
        let (dir, conn) = test_db();
        let store = test_session_store(&dir);
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());

        conn.execute(
            "INSERT INTO transactions (id, owner_id, account_id, amount, date, created_at)
             VALUES ('keep', 'owner-1', 'acc1', '1.00', '2026-01-01', 't')",
            [],
        )
        .unwrap();

        fake.push(200, ITEMS);
        fake.push(200, BALANCES);
        fake.push(200, "[]");
        fake.push(502, "bad gateway");

        let auth = Authenticator::new(&client, &store);
        let err = run_sync(&conn, &auth, &mut session, "personal").unwrap_err();
        assert!(matches!(err, SatchelError::Server { status: 502, .. }));

        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_sync_surfaces_relink_advisory_from_sweep() {
        let (client, fake) = scripted_client("https://api.test");
        let (dir, conn) = test_db();
        let store = test_session_store(&dir);
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());

        fake.push(200, ITEMS);
        fake.push(200, "[]");
        fake.push(200, "[]");
        fake.push(200, "[]");
        for (_, code) in KNOWN_CATEGORIES {
            if *code == "ITEM_LOGIN_REQUIRED" {
                fake.push(
                    200,
                    r#"[{"itemId":"item-1","webhookCode":"ITEM_LOGIN_REQUIRED","webhookType":"ITEM"}]"#,
                );
            } else {
                fake.push(200, "[]");
            }
        }

        let auth = Authenticator::new(&client, &store);
        let outcome = run_sync(&conn, &auth, &mut session, "personal").unwrap();
        let advisory = outcome.drift.relink_advisory("personal").unwrap();
        assert!(advisory.contains("Re-link"));
    }

    #[test]
    fn test_sync_renews_credentials_mid_flow() {
        let (client, fake) = scripted_client("https://api.test");
        let (dir, conn) = test_db();
        let store = test_session_store(&dir);
        let mut session = Session::new("A1".into(), "R1".into(), "owner-1".into());
        store.save(&session).unwrap();

        fake.push(200, ITEMS);
        fake.push(401, ""); // balance refresh hits an expired token
        fake.push(200, r#"{"accessToken":"A2","refreshToken":"R2"}"#);
        fake.push(200, BALANCES);
        fake.push(200, "[]");
        fake.push(200, "[]");
        for _ in KNOWN_CATEGORIES {
            fake.push(200, "[]");
        }

        let auth = Authenticator::new(&client, &store);
        let outcome = run_sync(&conn, &auth, &mut session, "personal").unwrap();
        assert_eq!(outcome.balances.updated, 1);

        let stored = store.require().unwrap();
        assert_eq!(stored.access_token(), "A2");
        assert_eq!(session.access_token(), "A2");
    }
}
