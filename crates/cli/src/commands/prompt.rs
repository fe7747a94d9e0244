//! Prompt command.

use pivot_journal_core::{Day, prompt_for};

/// Show the guided prompt for a day.
///
/// # Errors
///
/// Returns an error on an out-of-range day.
#[allow(clippy::print_stdout)]
pub fn show(day: u16) -> Result<(), Box<dyn std::error::Error>> {
    let prompt = prompt_for(Day::new(day)?);
    println!("Day {} - {}", prompt.day, prompt.theme);
    println!("{}", prompt.text);
    Ok(())
}
