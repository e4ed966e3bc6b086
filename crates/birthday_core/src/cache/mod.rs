//! Local persistence used as fallback and write-through cache.

pub mod local_cache;
