//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the relational-store contract consumed by the service layer.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Repository writes enforce `BirthRecord::validate()` before persistence.
//! - Missing targets surface as `RepoError::NotFound`, not silent no-ops.

pub mod birthday_repo;
