pub use crate::error::{ClResult, Error};
pub use crate::principal::{Access, PermissionRule, Principal, PrincipalRef};
pub use crate::types::{Direction, Handle, OrderKey, ResourceType, ScopeId};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
