//! End-to-end sync over the filesystem backend: sign in, edit through the
//! debounced autosave path, and read the entry back in a fresh process.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pivot_journal_core::{Day, SaveStatus};
use pivot_journal_integration_tests::{fs_app_at, fs_journal, wait_until};

const DEBOUNCE: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_guest_edit_survives_restart() {
    let mut journal = fs_journal(DEBOUNCE);
    let session = journal.app.auth().sign_in_anonymously().await.unwrap();
    journal.app.open_session().unwrap();

    journal.app.change_day(3);
    journal.app.edit_current("a thought for day three").unwrap();
    assert_eq!(journal.app.save_status(), SaveStatus::Saving);
    wait_until(WAIT, || journal.app.save_status() == SaveStatus::Saved).await;
    journal.app.sign_out();

    // Fresh app over the same directory, as after a process restart.
    let mut restarted = fs_app_at(&journal.dir, DEBOUNCE);
    restarted.auth().resume(session);
    restarted.open_session().unwrap();
    wait_until(WAIT, || {
        restarted.entry(Day::new(3).unwrap()).is_some()
    })
    .await;
    assert_eq!(
        restarted.entry(Day::new(3).unwrap()).as_deref(),
        Some("a thought for day three")
    );
}

#[tokio::test]
async fn test_last_edit_per_day_wins() {
    let mut journal = fs_journal(DEBOUNCE);
    journal.app.auth().sign_in_anonymously().await.unwrap();
    journal.app.open_session().unwrap();

    journal.app.change_day(10);
    journal.app.edit_current("draft").unwrap();
    journal.app.edit_current("draft, revised").unwrap();
    wait_until(WAIT, || journal.app.save_status() == SaveStatus::Saved).await;

    assert_eq!(
        journal.app.entry(Day::new(10).unwrap()).as_deref(),
        Some("draft, revised")
    );
}

#[tokio::test]
async fn test_registered_account_roundtrip() {
    let mut journal = fs_journal(DEBOUNCE);
    let created = journal
        .app
        .auth()
        .create_account("me@example.com", &secrecy::SecretString::from("hunter22"))
        .await
        .unwrap();
    journal.app.open_session().unwrap();
    journal.app.edit_current("day one, signed in").unwrap();
    wait_until(WAIT, || journal.app.save_status() == SaveStatus::Saved).await;
    journal.app.sign_out();

    let signed_in = journal
        .app
        .auth()
        .sign_in_with_password("me@example.com", &secrecy::SecretString::from("hunter22"))
        .await
        .unwrap();
    assert_eq!(signed_in.user_id, created.user_id);
    journal.app.open_session().unwrap();
    wait_until(WAIT, || journal.app.entry(Day::FIRST).is_some()).await;
}
