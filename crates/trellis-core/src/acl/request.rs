//! Per-request decision memo

use parking_lot::Mutex;
use std::collections::HashMap;

use super::{Decision, PermissionResolver};
use crate::prelude::*;

/// Authorizes checks for a single request's principal
///
/// Repeated checks of the same `(resource_type, operation)` within one
/// request reuse the first decision. Created per request and dropped with it.
#[derive(Debug)]
pub struct RequestAuthorizer {
	resolver: PermissionResolver,
	principal: Principal,
	memo: Mutex<HashMap<(Box<str>, Box<str>), Decision>>,
}

impl RequestAuthorizer {
	pub(super) fn new(resolver: PermissionResolver, principal: Principal) -> Self {
		Self { resolver, principal, memo: Mutex::new(HashMap::new()) }
	}

	pub fn principal(&self) -> &Principal {
		&self.principal
	}

	pub async fn authorize(&self, resource_type: &str, operation: &str) -> ClResult<Decision> {
		let key: (Box<str>, Box<str>) = (resource_type.into(), operation.into());
		let cached = self.memo.lock().get(&key).cloned();
		if let Some(decision) = cached {
			return Ok(decision);
		}

		let decision = self.resolver.authorize(&self.principal, resource_type, operation).await?;
		self.memo.lock().insert(key, decision.clone());
		Ok(decision)
	}

	pub async fn authorize_mode(&self, resource_type: &str, mode: &str) -> ClResult<Decision> {
		match self.resolver.catalog().operation(resource_type, mode) {
			Some(operation) => self.authorize(resource_type, operation).await,
			None => self.resolver.authorize_mode(&self.principal, resource_type, mode).await,
		}
	}

	pub async fn require(&self, resource_type: &str, operation: &str) -> ClResult<()> {
		self.authorize(resource_type, operation).await?.into_result()
	}

	pub async fn require_mode(&self, resource_type: &str, mode: &str) -> ClResult<()> {
		self.authorize_mode(resource_type, mode).await?.into_result()
	}

	/// Number of memoized decisions
	pub fn cached(&self) -> usize {
		self.memo.lock().len()
	}
}

// vim: ts=4
