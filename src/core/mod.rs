//! Core business logic - framework-agnostic roster editing.
//!
//! The three pages of the application are instantiations of one pattern: a
//! remote-backed editable list with optimistic local edits and debounced
//! remote writes. [`roster`] holds the generic machinery; [`attendance`] and
//! [`children`] specialize it for their collections; [`view`], [`import`]
//! and [`session`] carry the remaining page concerns.

/// Attendance-sheet operations (attendance and mass collections)
pub mod attendance;
/// Children-roster operations
pub mod children;
/// Keyed debounce table for coalescing remote writes
pub mod debounce;
/// Spreadsheet import
pub mod import;
/// Generic remote-backed editable list
pub mod roster;
/// Login, session persistence and the route guard
pub mod session;
/// Search, locale-aware sort and pagination over a cached roster
pub mod view;
