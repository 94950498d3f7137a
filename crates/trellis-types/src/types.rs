//! Resource type definitions, handles and scope identifiers.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Well-known display modes
pub mod mode {
	pub const FULL: &str = "full";
	pub const TEASER: &str = "teaser";
	pub const RAW: &str = "raw";
	pub const EDIT: &str = "edit";
	pub const DELETE: &str = "delete";
	pub const ADD: &str = "add";
	pub const LIST: &str = "list";
}

/// Well-known operations modes map to
pub mod operation {
	pub const READ: &str = "read";
	pub const UPDATE: &str = "update";
	pub const DELETE: &str = "delete";
	pub const CREATE: &str = "create";
	pub const LIST: &str = "list";
}

/// Modes starting with this prefix are served by listings rather than views
pub const LISTING_PREFIX: &str = "list";

/// The `(mode, operation)` pairs `ResourceTypeBuilder::standard_modes` declares
pub const STANDARD_MODES: &[(&str, &str)] = &[
	(mode::FULL, operation::READ),
	(mode::TEASER, operation::READ),
	(mode::RAW, operation::READ),
	(mode::EDIT, operation::UPDATE),
	(mode::DELETE, operation::DELETE),
	(mode::ADD, operation::CREATE),
	(mode::LIST, operation::LIST),
];

// Direction //
//***********//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
	#[serde(rename = "asc")]
	Asc,
	#[serde(rename = "desc")]
	Desc,
}

/// One `(field, direction)` element of a declared ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
	pub field: Box<str>,
	pub direction: Direction,
}

impl OrderKey {
	pub fn asc(field: impl Into<Box<str>>) -> Self {
		Self { field: field.into(), direction: Direction::Asc }
	}

	pub fn desc(field: impl Into<Box<str>>) -> Self {
		Self { field: field.into(), direction: Direction::Desc }
	}
}

/// Mode declaration: the display mode and the operation it is authorized as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDef {
	pub mode: Box<str>,
	pub operation: Box<str>,
}

// ResourceType //
//**************//
/// A named entity kind with declared display modes and ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
	pub name: Box<str>,
	pub modes: Box<[ModeDef]>,
	pub order: Box<[OrderKey]>,
	/// Abstract types only supply structure to the types extending them
	pub is_abstract: bool,
	pub extends: Option<Box<str>>,
}

impl ResourceType {
	pub fn builder(name: impl Into<Box<str>>) -> ResourceTypeBuilder {
		ResourceTypeBuilder::new(name)
	}

	/// Operation a mode is authorized as, if the mode is declared
	pub fn operation_for(&self, mode: &str) -> Option<&str> {
		self.modes.iter().find(|m| m.mode.as_ref() == mode).map(|m| m.operation.as_ref())
	}

	pub fn has_mode(&self, mode: &str) -> bool {
		self.operation_for(mode).is_some()
	}
}

/// Builder for ResourceType with fluent API
pub struct ResourceTypeBuilder {
	name: Box<str>,
	modes: Vec<ModeDef>,
	order: Vec<OrderKey>,
	is_abstract: bool,
	extends: Option<Box<str>>,
}

impl ResourceTypeBuilder {
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			modes: Vec::new(),
			order: Vec::new(),
			is_abstract: false,
			extends: None,
		}
	}

	/// Declare a mode and the operation it maps to
	pub fn mode(mut self, mode: impl Into<Box<str>>, operation: impl Into<Box<str>>) -> Self {
		self.modes.push(ModeDef { mode: mode.into(), operation: operation.into() });
		self
	}

	/// Declare every mode of `STANDARD_MODES` not declared yet
	pub fn standard_modes(mut self) -> Self {
		for (mode, operation) in STANDARD_MODES {
			if !self.modes.iter().any(|m| m.mode.as_ref() == *mode) {
				self.modes.push(ModeDef { mode: (*mode).into(), operation: (*operation).into() });
			}
		}
		self
	}

	pub fn order_by(mut self, field: impl Into<Box<str>>, direction: Direction) -> Self {
		self.order.push(OrderKey { field: field.into(), direction });
		self
	}

	pub fn abstract_type(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	pub fn extends(mut self, parent: impl Into<Box<str>>) -> Self {
		self.extends = Some(parent.into());
		self
	}

	pub fn build(self) -> ClResult<ResourceType> {
		if self.name.is_empty() || self.name.contains(['/', '?', '#']) {
			return Err(Error::ConfigError(format!("Invalid resource type name '{}'", self.name)));
		}

		for (i, m) in self.modes.iter().enumerate() {
			if m.mode.is_empty() || m.operation.is_empty() {
				return Err(Error::ConfigError(format!(
					"Resource type '{}' declares an empty mode or operation",
					self.name
				)));
			}
			if self.modes[..i].iter().any(|other| other.mode == m.mode) {
				return Err(Error::ConfigError(format!(
					"Resource type '{}' declares mode '{}' twice",
					self.name, m.mode
				)));
			}
		}

		if self.order.iter().any(|key| key.field.is_empty()) {
			return Err(Error::ConfigError(format!(
				"Resource type '{}' has an empty order field",
				self.name
			)));
		}

		if self.extends.as_deref() == Some(self.name.as_ref()) {
			return Err(Error::ConfigError(format!("Resource type '{}' extends itself", self.name)));
		}

		Ok(ResourceType {
			name: self.name,
			modes: self.modes.into(),
			order: self.order.into(),
			is_abstract: self.is_abstract,
			extends: self.extends,
		})
	}
}

// Handle //
//********//
/// Identifies one resource instance, either by numeric id or unique name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
	Id(i64),
	Name(Box<str>),
}

impl Handle {
	/// Numeric strings are ids, anything else is a unique name
	pub fn parse(s: &str) -> Handle {
		match s.parse::<i64>() {
			Ok(id) => Handle::Id(id),
			Err(_) => Handle::Name(s.into()),
		}
	}

	/// Whether `name` can be stored as a unique name
	///
	/// A numeric name would parse back as an id, so it could not be reached
	/// through a URL.
	pub fn is_valid_name(name: &str) -> bool {
		!name.is_empty() && name.parse::<i64>().is_err()
	}
}

impl std::fmt::Display for Handle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Handle::Id(id) => write!(f, "{}", id),
			Handle::Name(name) => write!(f, "{}", name),
		}
	}
}

impl From<i64> for Handle {
	fn from(id: i64) -> Self {
		Handle::Id(id)
	}
}

impl From<&str> for Handle {
	fn from(name: &str) -> Self {
		Handle::Name(name.into())
	}
}

// ScopeId //
//*********//
/// Identity of a routing scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub Box<str>);

impl ScopeId {
	pub const SITE: &'static str = "site";
	pub const ADMIN: &'static str = "admin";

	/// Reserved scopes in their fixed relative priority order
	pub const RESERVED: [&'static str; 2] = [Self::SITE, Self::ADMIN];

	pub fn new(id: impl Into<Box<str>>) -> Self {
		ScopeId(id.into())
	}

	pub fn site() -> Self {
		ScopeId(Self::SITE.into())
	}

	pub fn admin() -> Self {
		ScopeId(Self::ADMIN.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Position among the reserved scopes, `None` for ordinary scopes
	pub fn reserved_rank(&self) -> Option<usize> {
		Self::RESERVED.iter().position(|r| *r == self.as_str())
	}
}

impl std::fmt::Display for ScopeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for ScopeId {
	fn from(id: &str) -> Self {
		ScopeId(id.into())
	}
}


// vim: ts=4
