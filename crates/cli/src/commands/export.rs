//! Export command.

use std::path::Path;

use tracing::info;

use pivot_journal::JournalConfig;

use super::build_app_with_session;

/// Export the whole journal as plain text.
///
/// Opens a session first when one is persisted, so remote entries (and any
/// pending local-cache migration) are included. Signed out, the export
/// covers the local scratch cache only.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
#[allow(clippy::print_stdout)]
pub async fn run(
    config: &JournalConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (app, signed_in) = build_app_with_session(config).await?;
    if !signed_in {
        info!("no session, exporting local entries only");
    }

    let rendered = app.export();
    match output {
        Some(path) => {
            tokio::fs::write(path, &rendered).await?;
            info!(path = %path.display(), "journal exported");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
