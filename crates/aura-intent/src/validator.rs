//! Pure decision layer gating long-term context retrieval, so deterministic
//! fast-path intents stay fast.

use crate::intent::Intent;

/// Context categories the retrieval layer can fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Memory,
    Temporal,
    Calendar,
    Lists,
}

/// Tier-0 intents that exist to fetch data; they always want context.
const DATA_FETCH_INTENTS: &[&str] = &[
    "ListShow",
    "CalendarShow",
    "MemoryRecall",
    "ReminderShow",
    "JournalShow",
];

/// Phrases that reference stored memory regardless of the classified intent.
const MEMORY_KEYWORDS: &[&str] = &[
    "remember",
    "recall",
    "did i",
    "told",
    "forget",
    "last time",
    "memory",
];

/// Tier-1 small talk that never needs retrieval.
const SMALL_TALK_INTENTS: &[&str] = &["Greeting", "Acknowledge", "Cancel", "Goodbye"];

const COMPLEX_WORD_THRESHOLD: usize = 15;

/// Decide whether long-term memory/context retrieval should run for this
/// message.
///
/// Failed classification retrieves everything (the LLM fallback needs
/// maximal context); memory-referencing queries retrieve regardless of
/// intent; tier-0 pure actions skip; tier-1 small talk skips; everything
/// else retrieves.
#[must_use]
pub fn should_retrieve_context(intent: Option<&Intent>, query: &str) -> bool {
    let Some(intent) = intent else {
        return true;
    };

    if intent.tier == 0 && DATA_FETCH_INTENTS.contains(&intent.name.as_str()) {
        return true;
    }

    let query_lower = query.to_lowercase();
    if MEMORY_KEYWORDS.iter().any(|kw| query_lower.contains(kw)) {
        return true;
    }

    if intent.tier == 0 {
        return false;
    }

    if is_complex_query(query) {
        return true;
    }

    if intent.tier == 1 {
        return !SMALL_TALK_INTENTS.contains(&intent.name.as_str());
    }

    true
}

fn is_complex_query(query: &str) -> bool {
    query.split_whitespace().count() > COMPLEX_WORD_THRESHOLD
        || query.matches('?').count() > 1
}

/// Which context categories to fetch for an intent; defaults to the three
/// core types when nothing more specific is indicated.
#[must_use]
pub fn get_required_context_types(intent: Option<&Intent>) -> Vec<ContextType> {
    let Some(intent) = intent else {
        return default_types();
    };

    let name = intent.name.as_str();
    if name.contains("Calendar") || name.contains("Reminder") {
        return vec![ContextType::Calendar, ContextType::Temporal];
    }
    if name.contains("List") {
        return vec![ContextType::Lists];
    }
    if name.contains("Memory") || name.contains("Journal") {
        return vec![ContextType::Memory, ContextType::Temporal];
    }
    default_types()
}

fn default_types() -> Vec<ContextType> {
    vec![ContextType::Memory, ContextType::Temporal, ContextType::Calendar]
}
