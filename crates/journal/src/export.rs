//! Plain-text journal export.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use pivot_journal_core::{Day, PromptRecord};

/// Placeholder for days without an entry.
const NO_ENTRY: &str = "(No entry)";

/// Section separator line.
const SEPARATOR: &str = "====================================";

/// Render the whole journal as plain text.
///
/// One section per prompt in ascending day order: a header line with the day
/// number and uppercased theme, the prompt text, the user's entry (or a
/// placeholder), and a separator line.
#[must_use]
pub fn render_export(prompts: &[PromptRecord], entries: &BTreeMap<Day, String>) -> String {
    let mut content = String::from("MY PIVOT YEAR JOURNAL\n\n");

    for prompt in prompts {
        let entry = entries
            .get(&prompt.day)
            .map_or(NO_ENTRY, String::as_str);

        let _ = write!(
            content,
            "--- DAY {}: {} ---\n\
             Prompt: {}\n\n\
             My Entry:\n{entry}\n\n\
             {SEPARATOR}\n\n",
            prompt.day,
            prompt.theme.to_uppercase(),
            prompt.text,
        );
    }

    content
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pivot_journal_core::catalog;

    #[test]
    fn test_one_separator_per_prompt() {
        let exported = render_export(catalog(), &BTreeMap::new());
        assert_eq!(exported.matches(SEPARATOR).count(), 365);
    }

    #[test]
    fn test_placeholder_everywhere_except_written_days() {
        let mut entries = BTreeMap::new();
        entries.insert(Day::FIRST, "A".to_owned());

        let exported = render_export(catalog(), &entries);
        assert_eq!(exported.matches(NO_ENTRY).count(), 364);
        assert!(exported.contains("My Entry:\nA\n"));
    }

    #[test]
    fn test_header_uses_uppercased_theme() {
        let exported = render_export(catalog(), &BTreeMap::new());
        assert!(exported.starts_with("MY PIVOT YEAR JOURNAL\n\n"));
        assert!(exported.contains("--- DAY 1: THE PIVOT ---"));
        assert!(exported.contains("--- DAY 365: THE ARRIVAL ---"));
    }

    #[test]
    fn test_prompt_text_is_included() {
        let exported = render_export(catalog(), &BTreeMap::new());
        assert!(exported.contains(
            "Prompt: Day 183: The Halfway Point. Look back at who you were on Day 1. What has \
             shifted?"
        ));
    }
}
