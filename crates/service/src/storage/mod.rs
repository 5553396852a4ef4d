//! Storage abstractions for the service layer
//!
//! The catalogue persists as a single JSON document that is fully rewritten
//! on every mutation; small enough that a database would be overkill.

pub mod catalogue_store;
