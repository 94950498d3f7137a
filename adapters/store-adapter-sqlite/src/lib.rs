//! SQLite-backed adapters for Trellis
//!
//! One database file holds resource instances (`StoreAdapter`), permission
//! rule rows and group memberships (`PermAdapter`). A single
//! `StoreAdapterSqlite` implements both traits; share it between the two
//! slots of the app builder through an `Arc`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod perm;
mod record;
mod schema;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use trellis_types::perm_adapter::PermAdapter;
use trellis_types::prelude::*;
use trellis_types::record::{Filter, ListOptions, Record};
use trellis_types::store_adapter::StoreAdapter;

#[derive(Debug, Clone)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("Cannot open database {}: {:#?}", path.display(), err))
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("Cannot initialize database schema: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		info!("Opened database {}", path.display());
		Ok(Self { db })
	}

	/// Store a new instance and return its id
	///
	/// Records with a non-positive id get one assigned. A clashing id or
	/// unique name is a `ValidationError`.
	pub async fn create_record(&self, resource_type: &str, record: &Record) -> ClResult<i64> {
		record::create(&self.db, resource_type, record).await
	}

	pub async fn delete_record(&self, resource_type: &str, id: i64) -> ClResult<()> {
		record::delete(&self.db, resource_type, id).await
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	async fn get_by_id(&self, resource_type: &str, id: i64) -> ClResult<Record> {
		record::get_by_id(&self.db, resource_type, id).await
	}

	async fn get_by_unique_name(&self, resource_type: &str, name: &str) -> ClResult<Record> {
		record::get_by_name(&self.db, resource_type, name).await
	}

	async fn list(&self, resource_type: &str, opts: &ListOptions) -> ClResult<Vec<Record>> {
		record::list(&self.db, resource_type, opts).await
	}

	async fn count(&self, resource_type: &str, filter: Option<&Filter>) -> ClResult<u64> {
		record::count(&self.db, resource_type, filter).await
	}
}

#[async_trait]
impl PermAdapter for StoreAdapterSqlite {
	async fn list_rules(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &Principal,
	) -> ClResult<Vec<PermissionRule>> {
		perm::list_rules(&self.db, resource_type, operation, principal).await
	}

	async fn write_rule(&self, rule: &PermissionRule) -> ClResult<()> {
		perm::write_rule(&self.db, rule).await
	}

	async fn delete_rule(
		&self,
		resource_type: &str,
		operation: &str,
		principal: &PrincipalRef,
	) -> ClResult<()> {
		perm::delete_rule(&self.db, resource_type, operation, principal).await
	}

	async fn list_user_groups(&self, user_id: &str) -> ClResult<Vec<Box<str>>> {
		perm::list_user_groups(&self.db, user_id).await
	}

	async fn add_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()> {
		perm::add_group_member(&self.db, group_id, user_id).await
	}

	async fn remove_group_member(&self, group_id: &str, user_id: &str) -> ClResult<()> {
		perm::remove_group_member(&self.db, group_id, user_id).await
	}
}

// vim: ts=4
