//! Endpoint descriptors and registration definitions

use crate::prelude::*;
use trellis_types::types::mode;

/// Registration namespaces. A view and a listing may share a mode name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	View,
	Listing,
	/// Resources reachable through a foreign relationship
	Related,
}

impl EndpointKind {
	pub fn as_str(self) -> &'static str {
		match self {
			EndpointKind::View => "view",
			EndpointKind::Listing => "listing",
			EndpointKind::Related => "related",
		}
	}
}

/// Registry key: `(resource_type, mode)` for views and listings,
/// `(resource_type, related_field)` for related views
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
	pub resource_type: Box<str>,
	pub kind: EndpointKind,
	/// Mode, or the related field for `EndpointKind::Related`
	pub name: Box<str>,
}

impl EndpointKey {
	pub fn new(resource_type: &str, kind: EndpointKind, name: &str) -> Self {
		Self { resource_type: resource_type.into(), kind, name: name.into() }
	}

	pub fn view(resource_type: &str, mode: &str) -> Self {
		Self::new(resource_type, EndpointKind::View, mode)
	}

	pub fn listing(resource_type: &str, mode: &str) -> Self {
		Self::new(resource_type, EndpointKind::Listing, mode)
	}

	pub fn related(resource_type: &str, related_field: &str) -> Self {
		Self::new(resource_type, EndpointKind::Related, related_field)
	}

	/// Prefix of autogenerated ids, `{type}_{kind}_{mode}_autogen_`
	pub(crate) fn autogen_prefix(&self) -> String {
		format!("{}_{}_{}_autogen_", self.resource_type, self.kind.as_str(), self.name)
	}

	/// Route used when the registration does not supply one
	pub fn default_route(&self) -> String {
		match self.kind {
			EndpointKind::View if self.name.as_ref() == mode::ADD => {
				format!("/{}/{}", self.resource_type, self.name)
			}
			EndpointKind::View => format!("/{}/{{handle}}/{}", self.resource_type, self.name),
			EndpointKind::Listing => format!("/{}/{}", self.resource_type, self.name),
			EndpointKind::Related => format!("/{}/{}/{{handle}}", self.resource_type, self.name),
		}
	}
}

impl std::fmt::Display for EndpointKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} '{}/{}'", self.kind.as_str(), self.resource_type, self.name)
	}
}

/// A registered endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
	pub id: Box<str>,
	pub primary: bool,
	pub scope: ScopeId,
	/// Path template relative to the scope prefix; `{handle}` is substituted
	pub route: Box<str>,
}

impl EndpointDescriptor {
	pub fn needs_handle(&self) -> bool {
		self.route.contains(HANDLE_PLACEHOLDER)
	}
}

pub const HANDLE_PLACEHOLDER: &str = "{handle}";

/// Definition handed to `ScopeBuilder::register`
#[derive(Debug, Clone)]
pub struct EndpointDef {
	pub key: EndpointKey,
	pub id: Option<Box<str>>,
	pub primary: bool,
	pub route: Option<Box<str>>,
}

impl EndpointDef {
	pub fn new(key: EndpointKey) -> Self {
		Self { key, id: None, primary: false, route: None }
	}

	pub fn view(resource_type: &str, mode: &str) -> Self {
		Self::new(EndpointKey::view(resource_type, mode))
	}

	pub fn listing(resource_type: &str, mode: &str) -> Self {
		Self::new(EndpointKey::listing(resource_type, mode))
	}

	pub fn related(resource_type: &str, related_field: &str) -> Self {
		Self::new(EndpointKey::related(resource_type, related_field))
	}

	/// Set the endpoint id (autogenerated when not set)
	pub fn id(mut self, id: impl Into<Box<str>>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn primary(mut self) -> Self {
		self.primary = true;
		self
	}

	pub fn route(mut self, route: impl Into<Box<str>>) -> Self {
		self.route = Some(route.into());
		self
	}
}

/// Returns the descriptor flagged primary, else the first registered one
///
/// Permissive at read time: registration only forbids a second primary, it
/// does not require one.
pub fn choose_primary(endpoints: &[EndpointDescriptor]) -> Option<&EndpointDescriptor> {
	endpoints.iter().find(|e| e.primary).or_else(|| endpoints.first())
}

/// Checks the single-primary rule over a descriptor list
pub fn validate_primary(scope: &ScopeId, key: &EndpointKey, endpoints: &[EndpointDescriptor]) -> ClResult<()> {
	if endpoints.iter().filter(|e| e.primary).count() > 1 {
		return Err(Error::DuplicatePrimary {
			scope: scope.as_str().into(),
			key: key.to_string().into(),
		});
	}
	Ok(())
}


// vim: ts=4
