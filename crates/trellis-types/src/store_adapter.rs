//! Adapter that loads persisted resource instances.
//!
//! The core never writes through this adapter; it only needs point lookups,
//! ordered pages and counts to resolve handles and pagination anchors.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::record::{Filter, ListOptions, Record};

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	/// Loads an instance by numeric id. Missing rows are `Error::NotFound`.
	async fn get_by_id(&self, resource_type: &str, id: i64) -> ClResult<Record>;

	/// Loads an instance by its unique name. Missing rows are `Error::NotFound`.
	async fn get_by_unique_name(&self, resource_type: &str, name: &str) -> ClResult<Record>;

	/// Lists instances in the given order, skipping `offset` rows
	async fn list(&self, resource_type: &str, opts: &ListOptions) -> ClResult<Vec<Record>>;

	/// Counts instances, optionally restricted by a filter
	async fn count(&self, resource_type: &str, filter: Option<&Filter>) -> ClResult<u64>;

	async fn get_by_handle(&self, resource_type: &str, handle: &Handle) -> ClResult<Record> {
		match handle {
			Handle::Id(id) => self.get_by_id(resource_type, *id).await,
			Handle::Name(name) => self.get_by_unique_name(resource_type, name).await,
		}
	}
}

// vim: ts=4
