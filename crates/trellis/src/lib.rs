//! Trellis is the routing registry and access-control core of a
//! content-management micro-framework.
//!
//! # Features
//!
//! - Resource types with display modes mapped to operations
//! - Per-scope endpoint registry for views, listings and related views
//!     - built once at bootstrap, then frozen
//!     - cross-scope URL resolution with a fixed fallback order
//! - Two-tier grant/deny permission rules (user overrides, group rules)
//! - Listing offsets and pagination honouring multi-key orderings

// Re-export shared types and adapter traits from trellis-types
pub use trellis_types::error;
pub use trellis_types::perm_adapter;
pub use trellis_types::principal;
pub use trellis_types::record;
pub use trellis_types::render_adapter;
pub use trellis_types::store_adapter;
pub use trellis_types::types;

// Core re-exports
pub use trellis_core::acl;
pub use trellis_core::catalog;
pub use trellis_core::extract;
pub use trellis_core::middleware;
pub use trellis_core::paging;
pub use trellis_core::registry;
pub use trellis_core::url;

// Local modules
pub mod app;
pub mod config;
pub mod prelude;

pub use crate::app::{App, AppBuilder};
pub use crate::config::Config;

// vim: ts=4
