//! Reply text for a list of representatives.

use std::collections::HashSet;
use std::sync::Arc;

use crate::pipeline::selector::{Selector, choose};
use crate::pipeline::types::Representative;

pub const SINGULAR_HEADER: &str = "Call your representative:";

pub const PLURAL_HEADERS: &[&str] = &[
    "Call your representatives:",
    "Give your representatives a call:",
    "Let your representatives hear from you:",
    "Make your voice heard. Call your representatives:",
];

/// How duplicate representatives are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupStrategy {
    /// Keep every entry, even the same person reported by both providers.
    #[default]
    None,
    /// Drop later entries with the same name (case-insensitive) and phone digits.
    ByNameAndPhone,
}

impl DedupStrategy {
    fn apply(&self, reps: Vec<Representative>) -> Vec<Representative> {
        match self {
            Self::None => reps,
            Self::ByNameAndPhone => {
                let mut seen = HashSet::new();
                reps.into_iter()
                    .filter(|r| seen.insert(dedup_key(r)))
                    .collect()
            }
        }
    }
}

fn dedup_key(rep: &Representative) -> (String, String) {
    // Person's name without the title prefix, case-folded.
    let name = rep
        .display_name
        .strip_prefix(rep.title.prefix())
        .unwrap_or(&rep.display_name)
        .trim()
        .to_lowercase();
    let digits = rep.phone.chars().filter(char::is_ascii_digit).collect();
    (name, digits)
}

#[derive(Clone)]
pub struct ResponseComposer {
    selector: Arc<dyn Selector>,
    dedup: DedupStrategy,
}

impl ResponseComposer {
    pub fn new(selector: Arc<dyn Selector>) -> Self {
        Self {
            selector,
            dedup: DedupStrategy::None,
        }
    }

    pub fn with_dedup(mut self, dedup: DedupStrategy) -> Self {
        self.dedup = dedup;
        self
    }

    /// Render the reply.
    ///
    /// Empty `representatives` yields `fallback_text` unchanged. Otherwise the
    /// list is stable-sorted by sort order under a header, one
    /// `"<name>: <phone>"` line each.
    pub fn compose(&self, representatives: Vec<Representative>, fallback_text: &str) -> String {
        let mut reps = self.dedup.apply(representatives);
        if reps.is_empty() {
            return fallback_text.to_string();
        }

        reps.sort_by_key(|r| r.sort_order);

        let header = if reps.len() == 1 {
            SINGULAR_HEADER
        } else {
            choose(self.selector.as_ref(), PLURAL_HEADERS)
                .copied()
                .unwrap_or(PLURAL_HEADERS[0])
        };

        let mut lines = Vec::with_capacity(reps.len() + 1);
        lines.push(header.to_string());
        lines.extend(reps.iter().map(|r| format!("{}: {}", r.display_name, r.phone)));
        lines.join("\n")
    }
}
