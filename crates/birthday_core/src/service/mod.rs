//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and cache calls into use-case level APIs.
//! - Keep front ends decoupled from storage details.

pub mod birthday_service;
