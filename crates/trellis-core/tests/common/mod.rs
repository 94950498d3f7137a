//! In-memory collaborators shared by the integration tests
#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trellis_core::catalog::{TypeCatalog, TypeCatalogBuilder};
use trellis_types::perm_adapter::PermAdapter;
use trellis_types::prelude::*;
use trellis_types::record::{Filter, ListOptions, Record};
use trellis_types::store_adapter::StoreAdapter;

// MemStore //
//**********//
#[derive(Debug, Default)]
pub struct MemStore {
	rows: Mutex<HashMap<Box<str>, Vec<Record>>>,
}

impl MemStore {
	pub fn insert(&self, resource_type: &str, record: Record) {
		self.rows.lock().entry(resource_type.into()).or_default().push(record);
	}
}

#[async_trait]
impl StoreAdapter for MemStore {
	async fn get_by_id(&self, resource_type: &str, id: i64) -> ClResult<Record> {
		self.rows
			.lock()
			.get(resource_type)
			.and_then(|rows| rows.iter().find(|r| r.id == id).cloned())
			.ok_or(Error::NotFound)
	}

	async fn get_by_unique_name(&self, resource_type: &str, name: &str) -> ClResult<Record> {
		self.rows
			.lock()
			.get(resource_type)
			.and_then(|rows| rows.iter().find(|r| r.name.as_deref() == Some(name)).cloned())
			.ok_or(Error::NotFound)
	}

	async fn list(&self, resource_type: &str, opts: &ListOptions) -> ClResult<Vec<Record>> {
		let mut rows = self.rows.lock().get(resource_type).cloned().unwrap_or_default();
		if let Some(filter) = &opts.filter {
			rows.retain(|row| filter.matches(row));
		}
		rows.sort_by(|a, b| a.order_cmp(b, &opts.order));
		let offset = usize::try_from(opts.offset).unwrap_or(usize::MAX);
		let limit = opts.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
		Ok(rows.into_iter().skip(offset).take(limit).collect())
	}

	async fn count(&self, resource_type: &str, filter: Option<&Filter>) -> ClResult<u64> {
		let rows = self.rows.lock();
		let count = rows
			.get(resource_type)
			.map(|rows| rows.iter().filter(|r| filter.is_none_or(|f| f.matches(r))).count())
			.unwrap_or_default();
		Ok(count as u64)
	}
}

// MemPerms //
//**********//
#[derive(Debug, Default)]
pub struct MemPerms {
	rules: Mutex<Vec<PermissionRule>>,
	members: Mutex<Vec<(Box<str>, Box<str>)>>,
	pub reads: AtomicUsize,
	/// Makes every rule read fail like an unreachable database
	pub broken: std::sync::atomic::AtomicBool,
}

impl MemPerms {
	pub fn with_rules(rules: impl IntoIterator<Item = PermissionRule>) -> Self {
		let perms = Self::default();
		perms.rules.lock().extend(rules);
		perms
	}

	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl PermAdapter for MemPerms {
	async fn list_rules(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &Principal,
	) -> ClResult<Vec<PermissionRule>> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		if self.broken.load(Ordering::SeqCst) {
			return Err(Error::DbError);
		}
		Ok(self
			.rules
			.lock()
			.iter()
			.filter(|r| {
				r.resource_type.as_ref() == resource_type
					&& r.operation.as_ref() == operation
					&& principal.is_subject_of(&r.principal)
			})
			.cloned()
			.collect())
	}

	async fn write_rule(&self, rule: &PermissionRule) -> ClResult<()> {
		let mut rules = self.rules.lock();
		rules.retain(|r| {
			!(r.resource_type == rule.resource_type
				&& r.operation == rule.operation
				&& r.principal == rule.principal)
		});
		rules.push(rule.clone());
		Ok(())
	}

	async fn delete_rule(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &PrincipalRef,
	) -> ClResult<()> {
		self.rules.lock().retain(|r| {
			!(r.resource_type.as_ref() == resource_type
				&& r.operation.as_ref() == operation
				&& &r.principal == principal)
		});
		Ok(())
	}

	async fn list_user_groups(&self, user_id: &str) -> ClResult<Vec<Box<str>>> {
		Ok(self
			.members
			.lock()
			.iter()
			.filter(|(_, u)| u.as_ref() == user_id)
			.map(|(g, _)| g.clone())
			.collect())
	}

	async fn add_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()> {
		let mut members = self.members.lock();
		if !members.iter().any(|(g, u)| g.as_ref() == group_id && u.as_ref() == user_id) {
			members.push((group_id.into(), user_id.into()));
		}
		Ok(())
	}

	async fn remove_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()> {
		self.members.lock().retain(|(g, u)| !(g.as_ref() == group_id && u.as_ref() == user_id));
		Ok(())
	}
}

/// Catalog with an abstract `node` type, `page` and `article` extending it
/// (newest first) and a `tag` type ordered by name
pub fn catalog() -> TypeCatalog {
	let mut builder = TypeCatalogBuilder::new();
	builder
		.register(
			ResourceType::builder("node")
				.abstract_type()
				.standard_modes()
				.order_by("created", Direction::Desc)
				.build()
				.expect("node"),
		)
		.expect("register node");
	for name in ["page", "article"] {
		builder
			.register(ResourceType::builder(name).extends("node").build().expect("type"))
			.expect("register");
	}
	builder
		.register(
			ResourceType::builder("tag")
				.standard_modes()
				.order_by("name", Direction::Asc)
				.build()
				.expect("tag"),
		)
		.expect("register tag");
	builder.freeze().expect("freeze catalog")
}

/// `count` pages created one second apart; id `n` is the `n`-th oldest
pub fn store_with_pages(count: i64) -> Arc<MemStore> {
	let store = Arc::new(MemStore::default());
	for id in 1..=count {
		store.insert("page", Record::new(id).with_field("created", 1_700_000_000 + id));
	}
	store
}

// vim: ts=4
