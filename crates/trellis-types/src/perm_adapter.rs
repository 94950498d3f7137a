//! Adapter that stores permission rule rows and group memberships.
//!
//! Rows are edited by administrators at any time, so callers must not cache
//! them beyond a single request.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait PermAdapter: Debug + Send + Sync {
	/// Lists every rule for `(resource_type, operation)` addressed to the
	/// principal's user or to any of its groups
	async fn list_rules(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &Principal,
	) -> ClResult<Vec<PermissionRule>>;

	/// Inserts a rule, replacing the access of an existing row with the same
	/// `(resource_type, operation, principal)` key
	async fn write_rule(&self, rule: &PermissionRule) -> ClResult<()>;

	/// Removes a rule row. Removing a missing row is not an error.
	async fn delete_rule(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &PrincipalRef,
	) -> ClResult<()>;

	/// Lists the groups a user belongs to
	async fn list_user_groups(&self, user_id: &str) -> ClResult<Vec<Box<str>>>;

	async fn add_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()>;

	async fn remove_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()>;
}

// vim: ts=4
