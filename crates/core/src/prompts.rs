//! The 365-day guided prompt catalog.
//!
//! The catalog is generated once from 12 monthly themes and 30 rotating
//! templates, with three hand-written entries for day 1, the halfway point,
//! and day 365. Generation is deterministic and pure; [`catalog`] memoizes
//! the result for the process lifetime.

use std::sync::LazyLock;

use crate::types::Day;

/// A monthly theme: a title and a one-line description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Theme title, e.g. "The Pivot".
    pub title: &'static str,
    /// One-line description shown with each prompt.
    pub description: &'static str,
}

/// The twelve monthly themes, in journal order.
pub const MONTHLY_THEMES: [Theme; 12] = [
    Theme {
        title: "The Pivot",
        description: "Recognizing the gap between who you are and who you want to be.",
    },
    Theme {
        title: "Detachment",
        description: "Letting go of the old self, the past, and what no longer serves.",
    },
    Theme {
        title: "Identity",
        description: "Discovering the person you are becoming underneath the layers.",
    },
    Theme {
        title: "Uncertainty",
        description: "Learning to trust the void and the unknown.",
    },
    Theme {
        title: "Action",
        description: "Making microshifts and taking small, consistent steps.",
    },
    Theme {
        title: "Boundaries",
        description: "Protecting your energy and choosing your environment.",
    },
    Theme {
        title: "Healing",
        description: "Addressing the shadows and the roots of your fears.",
    },
    Theme {
        title: "Worthiness",
        description: "Accepting abundance, love, and the good you deserve.",
    },
    Theme {
        title: "Purpose",
        description: "Finding what lights you up and aligning with your truth.",
    },
    Theme {
        title: "Presence",
        description: "Living in the eternal now; mindfulness as a tool.",
    },
    Theme {
        title: "Resilience",
        description: "Overcoming setbacks and trusting your inner mountain.",
    },
    Theme {
        title: "The Arrival",
        description: "Integration, reflection, and stepping into your new reality.",
    },
];

/// The thirty rotating prompt templates.
pub const PROMPT_TEMPLATES: [&str; 30] = [
    "What is one microshift you can make today to align with this theme?",
    "If you were not afraid of the outcome, what choice would you make right now?",
    "Describe the version of you that has already mastered this.",
    "What old narrative is trying to keep you small today?",
    "Where do you feel resistance in your body when you think about this?",
    "Who in your life represents this quality to you? What can you learn from them?",
    "What would you tell your younger self about this struggle?",
    "If today was the only day that mattered, how would you spend it?",
    "What are you waiting for permission to do?",
    "Write a letter to the future you who has made it through this phase.",
    "What is the most compassionate thing you can do for yourself today?",
    "How does staying in your comfort zone actually hurt you?",
    "What does your intuition whisper when the noise of the world gets quiet?",
    "Identify one thing you are holding onto that is too heavy.",
    "If your life was a story, what would the chapter title be right now?",
    "What is the gap between your actions and your desires today?",
    "How can you validate your own feelings without needing others to understand?",
    "What feels like a 'failure' that might actually be a redirection?",
    "Imagine your energy is currency. What did you spend it on today?",
    "What is one truth you are avoiding?",
    "How can you be the person you want to be, just for the next hour?",
    "What expectation can you drop today to feel lighter?",
    "Reflect on a time you pivoted before. What strength did you gain?",
    "What does 'enough' look like to you right now?",
    "If you stripped away your job and relationships, who are you?",
    "What is the most honest thing you can say to yourself today?",
    "How are you self-sabotaging? Be gentle but honest.",
    "What would it look like to trust the timing of your life completely?",
    "What is one small promise you can keep to yourself today?",
    "Breathe deeply. What does your heart need you to know?",
];

/// One generated prompt, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    /// Day this prompt belongs to.
    pub day: Day,
    /// Theme title for the day's month.
    pub theme: &'static str,
    /// Theme description for the day's month.
    pub theme_desc: &'static str,
    /// Full rendered prompt text.
    pub text: String,
}

/// Generate the 365 prompts.
///
/// Months 1-11 contribute 30 days each, month 12 contributes 35 (summing to
/// 365). Within a month the templates rotate by in-month index. Days 1, 183,
/// and 365 are overridden with fixed text.
#[must_use]
pub fn generate_prompts() -> Vec<PromptRecord> {
    let mut prompts = Vec::with_capacity(Day::COUNT as usize);
    let mut day_count: u16 = 1;

    for (month_index, theme) in MONTHLY_THEMES.iter().enumerate() {
        let days_in_month = if month_index == 11 { 35 } else { 30 };
        for i in 0..days_in_month {
            let template = PROMPT_TEMPLATES
                .get(i % PROMPT_TEMPLATES.len())
                .copied()
                .unwrap_or_default();
            if let Ok(day) = Day::new(day_count) {
                prompts.push(PromptRecord {
                    day,
                    theme: theme.title,
                    theme_desc: theme.description,
                    text: format!("Day {day_count}: {}. {template}", theme.title),
                });
            }
            day_count += 1;
        }
    }

    if let Some(first) = prompts.first_mut() {
        first.text = "Day 1: The Pivot. Identify the gap. Where are you now, and where do you \
                      desperately want to be?"
            .to_owned();
    }
    if let Some(halfway) = prompts.get_mut(182) {
        halfway.text =
            "Day 183: The Halfway Point. Look back at who you were on Day 1. What has shifted?"
                .to_owned();
    }
    if let Some(last) = prompts.get_mut(364) {
        last.text =
            "Day 365: The Completion. You have lived a lifetime in a year. Who are you now?"
                .to_owned();
    }

    prompts
}

static CATALOG: LazyLock<Vec<PromptRecord>> = LazyLock::new(generate_prompts);

/// The memoized prompt catalog.
#[must_use]
pub fn catalog() -> &'static [PromptRecord] {
    &CATALOG
}

/// Look up the prompt for a day.
#[must_use]
pub fn prompt_for(day: Day) -> &'static PromptRecord {
    // index() is always in range: the catalog has exactly Day::COUNT entries.
    #[allow(clippy::indexing_slicing)]
    &catalog()[day.index()]
}
