//! Recurrence calculator for yearly anniversaries.
//!
//! # Responsibility
//! - Pure date arithmetic over `BirthRecord` and an explicit reference instant.
//! - Derive the sorted upcoming list consumed by presentation layers.
//!
//! # Invariants
//! - No I/O, no shared state, no ambient clock reads.

pub mod recurrence;
pub mod upcoming;
