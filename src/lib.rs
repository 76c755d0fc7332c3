//! repcall: text an address, get your legislators' phone numbers.

pub mod channels;
pub mod civic;
pub mod config;
pub mod error;
pub mod geo;
pub mod pipeline;
