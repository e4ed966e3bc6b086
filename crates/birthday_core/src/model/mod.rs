//! Domain model for tracked birthdays.
//!
//! # Responsibility
//! - Define the canonical record shape shared by storage, cache and UI.
//!
//! # Invariants
//! - Every record is identified by a stable `BirthRecordId`.
//! - Deletion is a hard delete; there are no tombstones or versions.

pub mod birth_record;
