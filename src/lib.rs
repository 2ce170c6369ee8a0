//! `AttendanceBuddy` - Sunday-school and mass attendance tracking.
//!
//! This crate keeps a church group's attendance sheets and children roster in
//! a hosted document store. It provides a remote-backed editable list with
//! optimistic local edits and debounced remote writes, search/sort/pagination
//! over the cached roster, spreadsheet import, and a session-gated command
//! surface.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Command-line surface - argument parsing and command handlers
pub mod cli;
/// Configuration management for the remote store and admin credentials
pub mod config;
/// Core business logic - roster editing, debounced writes, views, import, sessions
pub mod core;
/// Entity definitions for the attendance and children collections
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Document store abstraction - REST client and in-memory test store
pub mod store;

#[cfg(test)]
pub mod test_utils;
