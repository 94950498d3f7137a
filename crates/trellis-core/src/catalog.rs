//! Resource type catalog
//!
//! Resource types are registered once during bootstrap, then frozen. Freezing
//! resolves `extends` chains: a type inherits every mode its ancestors declare
//! and it does not, and the nearest non-empty ordering when it declares none.
//! The result is a plain `(resource_type, mode) → operation` table.

use std::collections::{HashMap, HashSet};

use crate::prelude::*;
use trellis_types::types::{ModeDef, OrderKey};

/// Mutable catalog used during app initialization
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
	types: Vec<ResourceType>,
}

impl TypeCatalogBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, resource_type: ResourceType) -> ClResult<()> {
		if self.types.iter().any(|t| t.name == resource_type.name) {
			return Err(Error::ConfigError(format!(
				"Resource type '{}' is already registered",
				resource_type.name
			)));
		}

		debug!("Registering resource type: {}", resource_type.name);
		self.types.push(resource_type);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Returns the ancestors of a type, nearest first
	fn ancestors<'a>(&'a self, resource_type: &'a ResourceType) -> ClResult<Vec<&'a ResourceType>> {
		let mut chain = Vec::new();
		let mut seen = HashSet::from([resource_type.name.as_ref()]);
		let mut parent = resource_type.extends.as_deref();

		while let Some(name) = parent {
			if !seen.insert(name) {
				return Err(Error::ConfigError(format!(
					"Resource type '{}' has an inheritance cycle through '{}'",
					resource_type.name, name
				)));
			}
			let Some(parent_type) = self.types.iter().find(|t| t.name.as_ref() == name) else {
				return Err(Error::ConfigError(format!(
					"Resource type '{}' extends unknown type '{}'",
					resource_type.name, name
				)));
			};
			chain.push(parent_type);
			parent = parent_type.extends.as_deref();
		}

		Ok(chain)
	}

	/// Freeze the catalog (make it immutable)
	pub fn freeze(self) -> ClResult<TypeCatalog> {
		let mut resolved = Vec::with_capacity(self.types.len());

		for resource_type in &self.types {
			let ancestors = self.ancestors(resource_type)?;

			let mut modes: Vec<ModeDef> = resource_type.modes.to_vec();
			for ancestor in &ancestors {
				for mode in &ancestor.modes {
					if !modes.iter().any(|m| m.mode == mode.mode) {
						modes.push(mode.clone());
					}
				}
			}

			let order: Box<[OrderKey]> = if resource_type.order.is_empty() {
				ancestors
					.iter()
					.find(|a| !a.order.is_empty())
					.map(|a| a.order.clone())
					.unwrap_or_default()
			} else {
				resource_type.order.clone()
			};

			resolved.push(ResourceType {
				name: resource_type.name.clone(),
				modes: modes.into(),
				order,
				is_abstract: resource_type.is_abstract,
				extends: resource_type.extends.clone(),
			});
		}

		let mut operations: HashMap<Box<str>, HashMap<Box<str>, Box<str>>> = HashMap::new();
		for resource_type in resolved.iter().filter(|t| !t.is_abstract) {
			let table = operations.entry(resource_type.name.clone()).or_default();
			for mode in &resource_type.modes {
				table.insert(mode.mode.clone(), mode.operation.clone());
			}
		}

		info!(
			"Freezing type catalog with {} types ({} operation entries)",
			resolved.len(),
			operations.values().map(HashMap::len).sum::<usize>()
		);
		let index = resolved.iter().enumerate().map(|(i, t)| (t.name.clone(), i)).collect();
		Ok(TypeCatalog { types: resolved, index, operations })
	}
}

/// Immutable catalog stored in AppState
#[derive(Debug)]
pub struct TypeCatalog {
	types: Vec<ResourceType>,
	index: HashMap<Box<str>, usize>,
	/// resource type → mode → operation, concrete types only
	operations: HashMap<Box<str>, HashMap<Box<str>, Box<str>>>,
}

impl TypeCatalog {
	/// Get a resource type with inherited structure applied
	pub fn get(&self, name: &str) -> Option<&ResourceType> {
		self.index.get(name).map(|&i| &self.types[i])
	}

	/// Get a concrete (non-abstract) resource type
	pub fn concrete(&self, name: &str) -> ClResult<&ResourceType> {
		match self.get(name) {
			Some(t) if !t.is_abstract => Ok(t),
			Some(_) => Err(Error::ValidationError(format!("Resource type '{}' is abstract", name))),
			None => Err(Error::ValidationError(format!("Unknown resource type '{}'", name))),
		}
	}

	/// Operation a mode of a concrete type is authorized as
	pub fn operation(&self, resource_type: &str, mode: &str) -> Option<&str> {
		self.operations.get(resource_type)?.get(mode).map(|op| op.as_ref())
	}

	/// Number of `(resource_type, mode)` entries in the operation table
	pub fn operation_count(&self) -> usize {
		self.operations.values().map(HashMap::len).sum()
	}

	/// Concrete types whose `extends` chain passes through `ancestor`
	pub fn descendants<'a>(&'a self, ancestor: &'a str) -> impl Iterator<Item = &'a ResourceType> {
		self.types.iter().filter(move |t| {
			let mut parent = t.extends.as_deref();
			while let Some(name) = parent {
				if name == ancestor {
					return !t.is_abstract;
				}
				parent = self.get(name).and_then(|p| p.extends.as_deref());
			}
			false
		})
	}

	/// List all registered types in registration order
	pub fn list(&self) -> impl Iterator<Item = &ResourceType> {
		self.types.iter()
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}


// vim: ts=4
