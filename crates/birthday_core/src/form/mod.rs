//! Add/edit form model shared by front ends.

pub mod state;
