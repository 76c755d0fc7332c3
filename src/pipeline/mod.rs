//! Inbound text → reply text.
//!
//! Every inbound SMS flows through:
//! 1. `intent::classify()`: canned replies for greetings, thanks, junk
//! 2. `GeocoderChain::resolve()`: address to US coordinates
//! 3. `LegislatorResolver::resolve()`: civic-info legislators
//! 4. `StateFallbackResolver::resolve_state()`: only without state seats
//! 5. `ResponseComposer::compose()`: sorted phone list
//!
//! Any failure along the way becomes an apology reply; nothing is fatal.

pub mod compose;
pub mod intent;
pub mod processor;
pub mod selector;
pub mod types;
