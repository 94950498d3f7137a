//! Shared types, collaborator traits, and error types for Trellis.
//!
//! This crate contains the foundational types shared between the core
//! (registry, access control, URL building) and every collaborator
//! implementation (persistence, rule storage, rendering). Keeping them in a
//! separate crate lets adapter crates build without pulling in the core.

pub mod error;
pub mod perm_adapter;
pub mod prelude;
pub mod principal;
pub mod record;
pub mod render_adapter;
pub mod store_adapter;
pub mod types;

// vim: ts=4
