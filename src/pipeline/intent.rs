//! Pre-lookup intent classification.
//!
//! Runs before any geocoding to short-circuit messages that are clearly not
//! addresses:
//! - greetings → help text
//! - compliments / thanks → short acknowledgment
//! - info keywords, very short or digit-free text → "send a full address"
//!
//! Everything else is treated as an address query.

use tracing::debug;

pub const GREETING_REPLY: &str = "Hi! Text me a US postal address and I will send back phone numbers for your state and federal legislators.";
pub const COMPLIMENT_REPLY: &str = "Thanks!";
pub const THANKS_REPLY: &str = "You're welcome!";
pub const NEED_ADDRESS_REPLY: &str = "Sorry, I need a full US street address or ZIP code to look up your legislators. Text me your address and I will send back their phone numbers.";

const GREETINGS: &[&str] = &[
    "", "hi", "hello", "hey", "hiya", "👋", "hi 👋", "hello 👋", "hey 👋",
];
const COMPLIMENTS: &[&str] = &["nice", "cool", "neat", "this is awesome"];
const THANKS: &[&str] = &[
    "thanks",
    "thank you",
    "thx",
    "ty",
    "thanks 🙏",
    "thank you 🙏",
    "🙏",
];
const INFO_WORDS: &[&str] = &[
    "text",
    "test",
    "info",
    "help",
    "rep info",
    "congressional representatives",
    "state representatives",
];

/// Shortest text that can still be an address or ZIP.
const MIN_QUERY_CHARS: usize = 4;

/// What the sender is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Compliment,
    Thanks,
    ShortOrNonNumeric,
    AddressQuery,
}

impl Intent {
    /// Fixed reply for every intent except `AddressQuery`.
    pub fn canned_reply(&self) -> Option<&'static str> {
        match self {
            Self::Greeting => Some(GREETING_REPLY),
            Self::Compliment => Some(COMPLIMENT_REPLY),
            Self::Thanks => Some(THANKS_REPLY),
            Self::ShortOrNonNumeric => Some(NEED_ADDRESS_REPLY),
            Self::AddressQuery => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Compliment => "compliment",
            Self::Thanks => "thanks",
            Self::ShortOrNonNumeric => "short_or_non_numeric",
            Self::AddressQuery => "address_query",
        }
    }
}

/// Lowercase, drop `.` and `!`, trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '.' && *c != '!')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Classify raw inbound text.
pub fn classify(text: &str) -> Intent {
    let normalized = normalize(text);
    let phrase = normalized.as_str();

    let intent = if GREETINGS.contains(&phrase) {
        Intent::Greeting
    } else if COMPLIMENTS.contains(&phrase) {
        Intent::Compliment
    } else if THANKS.contains(&phrase) {
        Intent::Thanks
    } else if INFO_WORDS.contains(&phrase)
        || phrase.chars().count() < MIN_QUERY_CHARS
        || !phrase.chars().any(|c| c.is_ascii_digit())
    {
        Intent::ShortOrNonNumeric
    } else {
        Intent::AddressQuery
    };

    debug!(intent = intent.label(), "Classified inbound text");
    intent
}
