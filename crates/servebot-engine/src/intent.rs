//! Keyword-overlap intent classification.

use servebot_core::types::Intent;

/// Keywords associated with career queries: job vocabulary, departments,
/// common role and skill names from the listings.
const CAREERS_KEYWORDS: &[&str] = &[
    "job", "jobs", "career", "careers", "hiring", "position", "employment",
    "vacancy", "work", "apply", "application", "salary", "engineer",
    "developer", "manager", "analyst", "specialist", "resume", "cv",
    "interview", "recruit", "talent", "team", "department", "role",
    "opening", "openings", "opportunity", "opportunities", "representative",
    "sales", "marketing", "executive", "associate", "consultant", "intern",
    "internship", "fresher", "experienced", "python", "backend", "frontend",
];

/// Keywords associated with service queries: the trades in the catalog plus
/// booking/pricing vocabulary.
const SERVICES_KEYWORDS: &[&str] = &[
    "service", "services", "electrician", "plumber", "painter", "carpenter",
    "cleaning", "repair", "installation", "maintenance", "fix", "price",
    "cost", "booking", "book", "schedule", "technician", "professional",
    "home", "house", "ac", "electrical", "plumbing", "painting",
];

/// Generic informational keywords.
const GENERAL_KEYWORDS: &[&str] = &[
    "about", "company", "how", "what", "why", "where", "when", "contact",
    "support", "help", "information", "details", "process", "works",
];

/// Maps a raw query string to one of the fixed intents by counting which
/// keywords appear as substrings of the lowercased query.
///
/// A pure function: no state, no external calls. Ties resolve to the first
/// intent in [`Intent::ALL`] priority order (careers, services, general);
/// a query matching nothing classifies as general.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn keywords(intent: Intent) -> &'static [&'static str] {
        match intent {
            Intent::Careers => CAREERS_KEYWORDS,
            Intent::Services => SERVICES_KEYWORDS,
            Intent::General => GENERAL_KEYWORDS,
        }
    }

    pub fn classify(&self, query: &str) -> Intent {
        let query_lower = query.to_lowercase();

        let mut best = Intent::General;
        let mut best_score = 0usize;
        for intent in Intent::ALL {
            let score = Self::keywords(intent)
                .iter()
                .filter(|keyword| query_lower.contains(*keyword))
                .count();
            if score > best_score {
                best = intent;
                best_score = score;
            }
        }

        best
    }
}
