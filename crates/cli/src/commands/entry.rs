//! Entry commands: set, show, list.

use std::time::Duration;

use tracing::info;

use pivot_journal::JournalConfig;
use pivot_journal::backend::FsBackend;
use pivot_journal::JournalApp;
use pivot_journal_core::{Day, SaveStatus, prompt_for};

use super::build_app_with_session;

/// How long to wait for a debounced save before giving up.
const SAVE_GRACE: Duration = Duration::from_secs(2);

/// Write the entry for a day.
///
/// With a signed-in session the write goes through the debounced autosave
/// path and this waits for it to land. Signed out, the entry goes into the
/// device-local scratch cache and is migrated on the next signed-in command.
///
/// # Errors
///
/// Returns an error on an out-of-range day or a failed save.
pub async fn set(
    config: &JournalConfig,
    day: u16,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let day = Day::new(day)?;
    let (mut app, signed_in) = build_app_with_session(config).await?;

    if !signed_in {
        app.cache().set_entry(day, text)?;
        info!(%day, "entry saved locally (sign in to sync)");
        return Ok(());
    }

    app.change_day(day.get());
    app.edit_current(text)?;
    wait_for_save(&app, config.debounce + SAVE_GRACE).await?;
    info!(%day, "entry saved");
    Ok(())
}

/// Show the prompt and entry for a day.
///
/// # Errors
///
/// Returns an error on an out-of-range day.
#[allow(clippy::print_stdout)]
pub async fn show(config: &JournalConfig, day: u16) -> Result<(), Box<dyn std::error::Error>> {
    let day = Day::new(day)?;
    let (app, _) = build_app_with_session(config).await?;

    let prompt = prompt_for(day);
    println!("Day {} - {}", prompt.day, prompt.theme);
    println!("Prompt: {}", prompt.text);
    println!();
    match app.entry(day) {
        Some(text) => println!("{text}"),
        None => println!("(No entry)"),
    }
    Ok(())
}

/// List all days with entries.
///
/// # Errors
///
/// Returns an error if the session cannot be opened.
#[allow(clippy::print_stdout)]
pub async fn list(config: &JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (app, _) = build_app_with_session(config).await?;

    let entries = app.entries();
    if entries.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    for (day, text) in &entries {
        let preview: String = text.chars().take(60).collect();
        let ellipsis = if text.chars().count() > 60 { "..." } else { "" };
        println!("day {day:>3}  {preview}{ellipsis}");
    }
    Ok(())
}

/// Poll the save status until the pending write resolves.
async fn wait_for_save(
    app: &JournalApp<FsBackend>,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match app.save_status() {
            SaveStatus::Saved => return Ok(()),
            SaveStatus::Error => return Err("entry save failed".into()),
            SaveStatus::Idle | SaveStatus::Saving => {}
        }
        if tokio::time::Instant::now() >= deadline {
            return Err("timed out waiting for save".into());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
