//! Mutable registry used during the bootstrap registration pass

use std::collections::HashMap;

use super::endpoint::{EndpointDef, EndpointDescriptor, EndpointKey, EndpointKind, validate_primary};
use super::{Registry, ScopeRegistry};
use crate::catalog::TypeCatalog;
use crate::prelude::*;

fn normalize_prefix(scope: &ScopeId, prefix: &str) -> ClResult<Box<str>> {
	let prefix = prefix.trim_end_matches('/');
	if !prefix.is_empty() && !prefix.starts_with('/') {
		return Err(Error::ConfigError(format!(
			"URL prefix of scope '{}' must start with '/' (got '{}')",
			scope, prefix
		)));
	}
	Ok(prefix.into())
}

/// Endpoint registrations of one routing scope
#[derive(Debug)]
pub struct ScopeBuilder {
	scope: ScopeId,
	prefix: Box<str>,
	endpoints: HashMap<EndpointKey, Vec<EndpointDescriptor>>,
	/// Endpoint keys in first-registration order
	keys: Vec<EndpointKey>,
	ids: HashMap<Box<str>, EndpointKey>,
}

impl ScopeBuilder {
	fn new(scope: ScopeId, prefix: Box<str>) -> Self {
		Self { scope, prefix, endpoints: HashMap::new(), keys: Vec::new(), ids: HashMap::new() }
	}

	pub fn scope(&self) -> &ScopeId {
		&self.scope
	}

	/// Smallest `n >= 1` such that `{type}_{kind}_{mode}_autogen_{n}` is unused
	fn autogen_id(&self, key: &EndpointKey) -> Box<str> {
		let prefix = key.autogen_prefix();
		let mut n: u32 = 1;
		loop {
			let id = format!("{}{}", prefix, n);
			if !self.ids.contains_key(id.as_str()) {
				return id.into();
			}
			n += 1;
		}
	}

	/// Register an endpoint, returning its (possibly autogenerated) id
	pub fn register(&mut self, def: EndpointDef) -> ClResult<Box<str>> {
		let EndpointDef { key, id, primary, route } = def;

		if primary && self.endpoints.get(&key).is_some_and(|list| list.iter().any(|e| e.primary)) {
			return Err(Error::DuplicatePrimary {
				scope: self.scope.as_str().into(),
				key: key.to_string().into(),
			});
		}

		let id = match id {
			Some(id) if id.is_empty() => {
				return Err(Error::ConfigError(format!("Empty endpoint id for {}", key)));
			}
			Some(id) => {
				if let Some(other) = self.ids.get(&id) {
					return Err(Error::ConfigError(format!(
						"Endpoint id '{}' in scope '{}' is already registered for {}",
						id, self.scope, other
					)));
				}
				id
			}
			None => self.autogen_id(&key),
		};

		let route: Box<str> = route.unwrap_or_else(|| key.default_route().into());
		if !route.starts_with('/') {
			return Err(Error::ConfigError(format!(
				"Route '{}' of endpoint '{}' must start with '/'",
				route, id
			)));
		}

		debug!(scope = %self.scope, endpoint = %id, primary = primary, "Registering {}", key);
		self.ids.insert(id.clone(), key.clone());
		if !self.endpoints.contains_key(&key) {
			self.keys.push(key.clone());
		}
		self.endpoints.entry(key).or_default().push(EndpointDescriptor {
			id: id.clone(),
			primary,
			scope: self.scope.clone(),
			route,
		});
		Ok(id)
	}

	pub fn register_view(
		&mut self,
		resource_type: &str,
		mode: &str,
		endpoint_id: Option<&str>,
		primary: bool,
	) -> ClResult<Box<str>> {
		self.register(def_for(EndpointKey::view(resource_type, mode), endpoint_id, primary))
	}

	pub fn register_listing(
		&mut self,
		resource_type: &str,
		mode: &str,
		endpoint_id: Option<&str>,
		primary: bool,
	) -> ClResult<Box<str>> {
		self.register(def_for(EndpointKey::listing(resource_type, mode), endpoint_id, primary))
	}

	pub fn register_related_view(
		&mut self,
		resource_type: &str,
		related_field: &str,
		endpoint_id: Option<&str>,
	) -> ClResult<Box<str>> {
		self.register(def_for(EndpointKey::related(resource_type, related_field), endpoint_id, false))
	}

	fn freeze(self, catalog: &TypeCatalog) -> ClResult<ScopeRegistry> {
		for key in &self.keys {
			let Some(list) = self.endpoints.get(key) else {
				continue;
			};
			validate_primary(&self.scope, key, list)?;

			let Some(resource_type) = catalog.get(&key.resource_type) else {
				return Err(Error::ConfigError(format!(
					"Scope '{}' registers {} for unknown resource type",
					self.scope, key
				)));
			};
			if resource_type.is_abstract {
				return Err(Error::ConfigError(format!(
					"Scope '{}' registers {} for an abstract resource type",
					self.scope, key
				)));
			}
			if key.kind != EndpointKind::Related && !resource_type.has_mode(&key.name) {
				warn!(
					scope = %self.scope,
					"{} uses a mode the resource type does not declare; it can never be authorized",
					key
				);
			}
		}

		Ok(ScopeRegistry {
			scope: self.scope,
			prefix: self.prefix,
			endpoints: self.endpoints.into_iter().map(|(k, v)| (k, v.into_boxed_slice())).collect(),
			ids: self.ids,
		})
	}
}

fn def_for(key: EndpointKey, endpoint_id: Option<&str>, primary: bool) -> EndpointDef {
	EndpointDef { key, id: endpoint_id.map(Into::into), primary, route: None }
}

/// Mutable registry of all scopes
#[derive(Debug)]
pub struct RegistryBuilder {
	scopes: Vec<ScopeBuilder>,
}

impl RegistryBuilder {
	/// Creates a registry with the two reserved scopes (`site` at `""`,
	/// `admin` at `/admin`)
	pub fn new() -> Self {
		Self {
			scopes: vec![
				ScopeBuilder::new(ScopeId::site(), "".into()),
				ScopeBuilder::new(ScopeId::admin(), "/admin".into()),
			],
		}
	}

	/// Add an ordinary scope. Scopes keep their registration order.
	pub fn add_scope(&mut self, scope: ScopeId, prefix: &str) -> ClResult<&mut ScopeBuilder> {
		if self.scopes.iter().any(|s| s.scope == scope) {
			return Err(Error::ConfigError(format!("Scope '{}' is already registered", scope)));
		}
		let prefix = normalize_prefix(&scope, prefix)?;
		debug!("Registering scope '{}' at '{}'", scope, prefix);
		self.scopes.push(ScopeBuilder::new(scope, prefix));
		let idx = self.scopes.len() - 1;
		Ok(&mut self.scopes[idx])
	}

	pub fn set_prefix(&mut self, scope: &str, prefix: &str) -> ClResult<()> {
		let builder = self.scope_mut(scope)?;
		builder.prefix = normalize_prefix(&builder.scope, prefix)?;
		Ok(())
	}

	pub fn scope_mut(&mut self, scope: &str) -> ClResult<&mut ScopeBuilder> {
		self.scopes
			.iter_mut()
			.find(|s| s.scope.as_str() == scope)
			.ok_or_else(|| Error::ConfigError(format!("Unknown scope '{}'", scope)))
	}

	pub fn site(&mut self) -> ClResult<&mut ScopeBuilder> {
		self.scope_mut(ScopeId::SITE)
	}

	pub fn admin(&mut self) -> ClResult<&mut ScopeBuilder> {
		self.scope_mut(ScopeId::ADMIN)
	}

	/// Freeze the registry (make it immutable)
	///
	/// Re-validates every descriptor list, checks registrations against the
	/// type catalog and fixes the scope priority order: reserved scopes first
	/// in their fixed order, then all others in registration order.
	pub fn freeze(self, catalog: &TypeCatalog) -> ClResult<Registry> {
		let mut scopes = self
			.scopes
			.into_iter()
			.map(|s| s.freeze(catalog))
			.collect::<ClResult<Vec<_>>>()?;

		// Stable sort keeps registration order among ordinary scopes
		scopes.sort_by_key(|s| s.scope.reserved_rank().unwrap_or(usize::MAX));

		let endpoint_count: usize = scopes.iter().map(ScopeRegistry::len).sum();
		info!("Freezing endpoint registry: {} scopes, {} endpoints", scopes.len(), endpoint_count);
		Ok(Registry { scopes })
	}
}

impl Default for RegistryBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
