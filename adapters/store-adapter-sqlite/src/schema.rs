//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Records
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS records (
		id integer NOT NULL,
		type text NOT NULL,
		name text,
		data json NOT NULL DEFAULT '{}',
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_type ON records(type, id)")
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_records_type_name ON records(type, name) WHERE name IS NOT NULL",
	)
	.execute(&mut *tx)
	.await?;

	// Permission rules
	//******************
	// kind: 'U' user, 'G' group; access: 'G' grant, 'D' deny
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS perm_rules (
		type text NOT NULL,
		operation text NOT NULL,
		kind char(1) NOT NULL,
		principal text NOT NULL,
		access char(1) NOT NULL,
		PRIMARY KEY(type, operation, kind, principal)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS group_members (
		group_id text NOT NULL,
		user_id text NOT NULL,
		PRIMARY KEY(group_id, user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
