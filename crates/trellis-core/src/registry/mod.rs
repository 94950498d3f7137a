//! Endpoint registry
//!
//! Endpoints are registered per scope during bootstrap through
//! `RegistryBuilder`, then frozen into a `Registry` that has no mutating API
//! and is shared by `Arc`.

pub mod builder;
pub mod endpoint;

pub use builder::{RegistryBuilder, ScopeBuilder};
pub use endpoint::{EndpointDef, EndpointDescriptor, EndpointKey, EndpointKind, choose_primary};

use std::collections::HashMap;

use crate::prelude::*;

/// Frozen endpoints of one routing scope
#[derive(Debug)]
pub struct ScopeRegistry {
	scope: ScopeId,
	prefix: Box<str>,
	endpoints: HashMap<EndpointKey, Box<[EndpointDescriptor]>>,
	ids: HashMap<Box<str>, EndpointKey>,
}

impl ScopeRegistry {
	pub fn id(&self) -> &ScopeId {
		&self.scope
	}

	/// URL prefix (`""` or `/segment`, never a trailing slash)
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// All descriptors registered for a key, in registration order
	pub fn lookup(&self, key: &EndpointKey) -> &[EndpointDescriptor] {
		self.endpoints.get(key).map(|list| &list[..]).unwrap_or_default()
	}

	/// The descriptor serving a key (primary, else first registered)
	pub fn resolve(&self, key: &EndpointKey) -> ClResult<&EndpointDescriptor> {
		choose_primary(self.lookup(key)).ok_or_else(|| Error::NoRegisteredEndpoint {
			scope: self.scope.as_str().into(),
			key: key.to_string().into(),
		})
	}

	pub fn resolve_endpoint_id(&self, resource_type: &str, mode: &str) -> ClResult<&str> {
		self.resolve(&EndpointKey::view(resource_type, mode)).map(|e| e.id.as_ref())
	}

	pub fn resolve_listing_id(&self, resource_type: &str, mode: &str) -> ClResult<&str> {
		self.resolve(&EndpointKey::listing(resource_type, mode)).map(|e| e.id.as_ref())
	}

	pub fn resolve_related_id(&self, resource_type: &str, related_field: &str) -> ClResult<&str> {
		self.resolve(&EndpointKey::related(resource_type, related_field)).map(|e| e.id.as_ref())
	}

	/// Reverse lookup by endpoint id
	pub fn endpoint(&self, id: &str) -> Option<(&EndpointKey, &EndpointDescriptor)> {
		let (key, list) = self.endpoints.get_key_value(self.ids.get(id)?)?;
		list.iter().find(|e| e.id.as_ref() == id).map(|e| (key, e))
	}

	/// Every registration of the scope, sorted by endpoint id
	pub fn iter(&self) -> impl Iterator<Item = (&EndpointKey, &EndpointDescriptor)> {
		let mut all: Vec<_> = self
			.endpoints
			.iter()
			.flat_map(|(key, list)| list.iter().map(move |e| (key, e)))
			.collect();
		all.sort_by(|a, b| a.1.id.cmp(&b.1.id));
		all.into_iter()
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

/// Frozen registry of all scopes, stored in AppState
#[derive(Debug)]
pub struct Registry {
	/// In priority order
	scopes: Vec<ScopeRegistry>,
}

impl Registry {
	pub fn scope(&self, id: &str) -> Option<&ScopeRegistry> {
		self.scopes.iter().find(|s| s.scope.as_str() == id)
	}

	/// Scope ids in priority order: reserved scopes, then registration order
	pub fn priority(&self) -> impl Iterator<Item = &ScopeId> {
		self.scopes.iter().map(|s| &s.scope)
	}

	/// Scopes in the order a lookup starting at `current` tries them
	///
	/// An unknown `current` scope is skipped and the priority order is used.
	pub fn fallback_order<'a>(&'a self, current: &'a ScopeId) -> impl Iterator<Item = &'a ScopeRegistry> {
		self.scope(current.as_str())
			.into_iter()
			.chain(self.scopes.iter().filter(move |s| &s.scope != current))
	}

	pub fn scopes(&self) -> &[ScopeRegistry] {
		&self.scopes
	}
}


// vim: ts=4
