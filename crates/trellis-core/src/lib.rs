//! Core of the Trellis CMS framework.
//!
//! This crate holds everything between the host web layer and the
//! collaborator adapters: the resource type catalog, the per-scope endpoint
//! registry, the permission resolver, cross-scope URL resolution, listing
//! offsets and pagination, plus the axum extractors and middlewares that tie
//! them to requests. All registries are built once during bootstrap and
//! frozen before the first request.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod acl;
pub mod app;
pub mod catalog;
pub mod extract;
pub mod middleware;
pub mod paging;
pub mod prelude;
pub mod registry;
pub mod url;

// Re-export commonly used types
pub use acl::{Decision, DenyReason, PermissionResolver, RequestAuthorizer};
pub use app::{Adapters, App, AppBuilderOpts, AppState};
pub use catalog::{TypeCatalog, TypeCatalogBuilder};
pub use extract::{Auth, Authorizer, CurrentScope, OptionalAuth, PrincipalResolver};
pub use middleware::PermissionCheckOutput;
pub use paging::{Pagination, PaginationControl};
pub use registry::{Registry, RegistryBuilder};
pub use url::UrlResolver;

// vim: ts=4
