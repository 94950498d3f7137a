//! Capability-based access control
//!
//! Two rule tiers decide whether a principal may perform an operation on a
//! resource type. Precedence, first match wins:
//!
//! 1. a rule addressed to the principal's user (deny or grant)
//! 2. any deny addressed to one of its groups
//! 3. any grant addressed to one of its groups
//! 4. deny
//!
//! Rule rows are read through the `PermAdapter` on every check; only
//! `RequestAuthorizer` memoizes, and only for the lifetime of one request.

mod request;

pub use request::RequestAuthorizer;

use std::sync::Arc;

use crate::catalog::TypeCatalog;
use crate::prelude::*;
use trellis_types::perm_adapter::PermAdapter;

/// Why a check was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
	/// A deny rule addressed to the user
	UserOverride,
	/// A deny rule addressed to one of the principal's groups
	GroupRule { group: Box<str> },
	NoMatchingRule,
	/// Abstract types only supply structure and are never checkable
	AbstractType,
	UnknownResourceType,
	/// The mode is not mapped to an operation for the type
	UnknownMode,
}

impl std::fmt::Display for DenyReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DenyReason::UserOverride => write!(f, "user override"),
			DenyReason::GroupRule { group } => write!(f, "denied to group '{}'", group),
			DenyReason::NoMatchingRule => write!(f, "no matching rule"),
			DenyReason::AbstractType => write!(f, "abstract resource type"),
			DenyReason::UnknownResourceType => write!(f, "unknown resource type"),
			DenyReason::UnknownMode => write!(f, "unknown mode"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Grant,
	Deny(DenyReason),
}

impl Decision {
	pub fn is_granted(&self) -> bool {
		matches!(self, Decision::Grant)
	}

	/// `Error::PermissionDenied` for a deny
	pub fn into_result(self) -> ClResult<()> {
		match self {
			Decision::Grant => Ok(()),
			Decision::Deny(_) => Err(Error::PermissionDenied),
		}
	}
}

/// Evaluate loaded rule rows for one `(resource_type, operation)` check
///
/// Rows for other types, operations or principals are ignored, so callers
/// may pass a superset.
pub fn evaluate(
	principal: &Principal,
	rules: &[PermissionRule],
	resource_type: &str,
	operation: &str,
) -> Decision {
	let relevant = rules.iter().filter(|rule| {
		rule.resource_type.as_ref() == resource_type
			&& rule.operation.as_ref() == operation
			&& principal.is_subject_of(&rule.principal)
	});

	let mut user_access = None;
	let mut group_deny = None;
	let mut group_grant = false;
	for rule in relevant {
		match (&rule.principal, rule.access) {
			(PrincipalRef::User(_), Access::Deny) => user_access = Some(Access::Deny),
			(PrincipalRef::User(_), Access::Grant) => {
				user_access.get_or_insert(Access::Grant);
			}
			(PrincipalRef::Group(group), Access::Deny) => {
				group_deny.get_or_insert(group);
			}
			(PrincipalRef::Group(_), Access::Grant) => group_grant = true,
		}
	}

	match (user_access, group_deny) {
		(Some(Access::Deny), _) => Decision::Deny(DenyReason::UserOverride),
		(Some(Access::Grant), _) => Decision::Grant,
		(None, Some(group)) => Decision::Deny(DenyReason::GroupRule { group: group.clone() }),
		(None, None) if group_grant => Decision::Grant,
		(None, None) => Decision::Deny(DenyReason::NoMatchingRule),
	}
}

/// Resolves permission checks against the frozen catalog and the rule store
#[derive(Debug, Clone)]
pub struct PermissionResolver {
	catalog: Arc<TypeCatalog>,
	perm_adapter: Arc<dyn PermAdapter>,
}

impl PermissionResolver {
	pub fn new(catalog: Arc<TypeCatalog>, perm_adapter: Arc<dyn PermAdapter>) -> Self {
		Self { catalog, perm_adapter }
	}

	/// Decide whether `principal` may perform `operation` on `resource_type`
	///
	/// Rule store failures are returned as errors, never as a decision.
	pub async fn authorize(
		&self,
		principal: &Principal,
		resource_type: &str,
		operation: &str,
	) -> ClResult<Decision> {
		let decision = match self.catalog.get(resource_type) {
			None => Decision::Deny(DenyReason::UnknownResourceType),
			Some(rt) if rt.is_abstract => Decision::Deny(DenyReason::AbstractType),
			Some(_) => {
				let rules =
					self.perm_adapter.list_rules(resource_type, operation, principal).await?;
				evaluate(principal, &rules, resource_type, operation)
			}
		};

		log_decision(principal, resource_type, operation, &decision);
		Ok(decision)
	}

	/// Like `authorize`, mapping a display mode through the operation table
	pub async fn authorize_mode(
		&self,
		principal: &Principal,
		resource_type: &str,
		mode: &str,
	) -> ClResult<Decision> {
		match self.catalog.operation(resource_type, mode) {
			Some(operation) => self.authorize(principal, resource_type, operation).await,
			None => {
				let decision = match self.catalog.get(resource_type) {
					None => Decision::Deny(DenyReason::UnknownResourceType),
					Some(rt) if rt.is_abstract => Decision::Deny(DenyReason::AbstractType),
					Some(_) => Decision::Deny(DenyReason::UnknownMode),
				};
				log_decision(principal, resource_type, mode, &decision);
				Ok(decision)
			}
		}
	}

	pub async fn require(
		&self,
		principal: &Principal,
		resource_type: &str,
		operation: &str,
	) -> ClResult<()> {
		self.authorize(principal, resource_type, operation).await?.into_result()
	}

	pub async fn require_mode(
		&self,
		principal: &Principal,
		resource_type: &str,
		mode: &str,
	) -> ClResult<()> {
		self.authorize_mode(principal, resource_type, mode).await?.into_result()
	}

	/// Decision memo bound to one request's principal
	pub fn for_request(&self, principal: Principal) -> RequestAuthorizer {
		RequestAuthorizer::new(self.clone(), principal)
	}

	pub fn catalog(&self) -> &TypeCatalog {
		&self.catalog
	}
}

fn log_decision(principal: &Principal, resource_type: &str, operation: &str, decision: &Decision) {
	match decision {
		Decision::Grant => {
			debug!(
				principal = %principal,
				resource_type = resource_type,
				operation = operation,
				"Permission granted"
			);
		}
		Decision::Deny(reason) => {
			debug!(
				principal = %principal,
				resource_type = resource_type,
				operation = operation,
				reason = %reason,
				"Permission denied"
			);
		}
	}
}


// vim: ts=4
