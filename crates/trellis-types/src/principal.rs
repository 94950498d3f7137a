//! Principals and permission rule rows.

use serde::{Deserialize, Serialize};

/// Group every principal is implicitly a member of
pub const EVERYONE_GROUP: &str = "everyone";

/// The subject of a permission check: an optional user and its groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
	/// `None` for anonymous visitors
	pub user_id: Option<Box<str>>,
	pub groups: Box<[Box<str>]>,
}

impl Principal {
	pub fn user(
		user_id: impl Into<Box<str>>,
		groups: impl IntoIterator<Item = impl Into<Box<str>>>,
	) -> Self {
		Self { user_id: Some(user_id.into()), groups: groups.into_iter().map(Into::into).collect() }
	}

	pub fn anonymous(groups: impl IntoIterator<Item = impl Into<Box<str>>>) -> Self {
		Self { user_id: None, groups: groups.into_iter().map(Into::into).collect() }
	}

	pub fn is_member(&self, group_id: &str) -> bool {
		self.groups.iter().any(|g| g.as_ref() == group_id)
	}

	/// Whether a rule row is addressed to this principal
	pub fn is_subject_of(&self, principal: &PrincipalRef) -> bool {
		match principal {
			PrincipalRef::User(id) => self.user_id.as_deref() == Some(id.as_ref()),
			PrincipalRef::Group(id) => self.is_member(id),
		}
	}
}

impl std::fmt::Display for Principal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.user_id {
			Some(id) => write!(f, "user:{}", id),
			None => write!(f, "anonymous"),
		}
	}
}

/// The principal a rule row is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum PrincipalRef {
	#[serde(rename = "user")]
	User(Box<str>),
	#[serde(rename = "group")]
	Group(Box<str>),
}

impl PrincipalRef {
	/// Single-character kind code as persisted by adapters
	pub fn kind_code(&self) -> char {
		match self {
			PrincipalRef::User(_) => 'U',
			PrincipalRef::Group(_) => 'G',
		}
	}

	pub fn id(&self) -> &str {
		match self {
			PrincipalRef::User(id) | PrincipalRef::Group(id) => id,
		}
	}

	pub fn from_code(code: char, id: impl Into<Box<str>>) -> Option<Self> {
		match code {
			'U' => Some(PrincipalRef::User(id.into())),
			'G' => Some(PrincipalRef::Group(id.into())),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
	#[serde(rename = "grant")]
	Grant,
	#[serde(rename = "deny")]
	Deny,
}

impl Access {
	pub fn code(self) -> char {
		match self {
			Access::Grant => 'G',
			Access::Deny => 'D',
		}
	}

	pub fn from_code(code: char) -> Option<Self> {
		match code {
			'G' => Some(Access::Grant),
			'D' => Some(Access::Deny),
			_ => None,
		}
	}
}

/// One persisted permission rule row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
	pub principal: PrincipalRef,
	pub resource_type: Box<str>,
	pub operation: Box<str>,
	pub access: Access,
}

impl PermissionRule {
	pub fn grant(
		principal: PrincipalRef,
		resource_type: impl Into<Box<str>>,
		operation: impl Into<Box<str>>,
	) -> Self {
		Self {
			principal,
			resource_type: resource_type.into(),
			operation: operation.into(),
			access: Access::Grant,
		}
	}

	pub fn deny(
		principal: PrincipalRef,
		resource_type: impl Into<Box<str>>,
		operation: impl Into<Box<str>>,
	) -> Self {
		Self {
			principal,
			resource_type: resource_type.into(),
			operation: operation.into(),
			access: Access::Deny,
		}
	}
}


// vim: ts=4
