//! Opening repertoire browser: load one PGN game tree and walk it with a
//! single cursor.

mod repertoire;

pub use repertoire::*;
