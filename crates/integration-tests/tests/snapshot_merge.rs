//! Snapshot deliveries observed through the app context: merge into the
//! visible mapping, empty-document filtering, and error degradation.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pivot_journal::backend::EntryDoc;
use pivot_journal_core::{Day, SaveStatus};
use pivot_journal_integration_tests::{memory_journal, wait_until};

const WAIT: Duration = Duration::from_secs(5);

fn day(n: u16) -> Day {
    Day::new(n).unwrap()
}

#[tokio::test]
async fn test_remote_snapshot_updates_visible_entries() {
    let mut journal = memory_journal(Duration::from_millis(50));
    let session = journal.app.auth().sign_in_anonymously().await.unwrap();
    journal.app.open_session().unwrap();

    journal.backend.push_snapshot(
        &session.user_id,
        vec![EntryDoc::now(day(4), "from another device")],
    );
    wait_until(WAIT, || journal.app.entry(day(4)).is_some()).await;
    assert_eq!(
        journal.app.entry(day(4)).as_deref(),
        Some("from another device")
    );
}

#[tokio::test]
async fn test_empty_text_documents_are_ignored() {
    let mut journal = memory_journal(Duration::from_millis(50));
    let session = journal.app.auth().sign_in_anonymously().await.unwrap();
    journal.app.open_session().unwrap();

    journal.backend.push_snapshot(
        &session.user_id,
        vec![EntryDoc::now(day(1), ""), EntryDoc::now(day(2), "kept")],
    );
    wait_until(WAIT, || journal.app.entry(day(2)).is_some()).await;
    assert!(journal.app.entry(day(1)).is_none());
}

#[tokio::test]
async fn test_subscription_error_degrades_status() {
    let mut journal = memory_journal(Duration::from_millis(50));
    let session = journal.app.auth().sign_in_anonymously().await.unwrap();
    journal.app.open_session().unwrap();

    journal
        .backend
        .push_error(&session.user_id, "listener dropped");
    wait_until(WAIT, || journal.app.save_status() == SaveStatus::Error).await;
}
