//! Permission rule rows and group memberships

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use trellis_types::prelude::*;

fn first_char(s: &str) -> Option<char> {
	s.chars().next()
}

fn row_to_rule(row: SqliteRow) -> ClResult<PermissionRule> {
	let resource_type: String = row.try_get("type").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let operation: String = row.try_get("operation").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let kind: String = row.try_get("kind").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let principal: String = row.try_get("principal").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let access: String = row.try_get("access").inspect_err(inspect).map_err(|_| Error::DbError)?;

	let principal = first_char(&kind).and_then(|c| PrincipalRef::from_code(c, principal));
	let access = first_char(&access).and_then(Access::from_code);
	let (Some(principal), Some(access)) = (principal, access) else {
		warn!("Invalid permission rule row for {}/{}: kind={} access={:?}", resource_type, operation, kind, access);
		return Err(Error::DbError);
	};

	Ok(PermissionRule {
		principal,
		resource_type: resource_type.into(),
		operation: operation.into(),
		access,
	})
}

pub(crate) async fn list_rules(
	db: &SqlitePool,
	resource_type: &str,
	operation: &str,
	principal: &Principal,
) -> ClResult<Vec<PermissionRule>> {
	if principal.user_id.is_none() && principal.groups.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = QueryBuilder::<Sqlite>::new(
		"SELECT type, operation, kind, principal, access FROM perm_rules WHERE type = ",
	);
	query.push_bind(resource_type).push(" AND operation = ").push_bind(operation).push(" AND (");

	let mut first = true;
	if let Some(user_id) = principal.user_id.as_deref() {
		query.push("(kind = 'U' AND principal = ").push_bind(user_id).push(")");
		first = false;
	}
	if !principal.groups.is_empty() {
		if !first {
			query.push(" OR ");
		}
		query.push("(kind = 'G' AND principal IN ");
		push_in(&mut query, &principal.groups[..]);
		query.push(")");
	}
	query.push(")");

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.into_iter().map(row_to_rule))
}

pub(crate) async fn write_rule(db: &SqlitePool, rule: &PermissionRule) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO perm_rules (type, operation, kind, principal, access) VALUES (?, ?, ?, ?, ?)
		ON CONFLICT(type, operation, kind, principal) DO UPDATE SET access = excluded.access",
	)
	.bind(rule.resource_type.as_ref())
	.bind(rule.operation.as_ref())
	.bind(rule.principal.kind_code().to_string())
	.bind(rule.principal.id())
	.bind(rule.access.code().to_string())
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn delete_rule(
	db: &SqlitePool,
	resource_type: &str,
	operation: &str,
	principal: &PrincipalRef,
) -> ClResult<()> {
	sqlx::query(
		"DELETE FROM perm_rules WHERE type = ? AND operation = ? AND kind = ? AND principal = ?",
	)
	.bind(resource_type)
	.bind(operation)
	.bind(principal.kind_code().to_string())
	.bind(principal.id())
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn list_user_groups(db: &SqlitePool, user_id: &str) -> ClResult<Vec<Box<str>>> {
	let rows = sqlx::query("SELECT group_id FROM group_members WHERE user_id = ? ORDER BY group_id")
		.bind(user_id)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.into_iter().map(|row| {
		row.try_get::<String, _>("group_id")
			.map(String::into_boxed_str)
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)
	}))
}

pub(crate) async fn add_group_member(db: &SqlitePool, group_id: &str, user_id: &str) -> ClResult<()> {
	sqlx::query("INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?, ?)")
		.bind(group_id)
		.bind(user_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn remove_group_member(
	db: &SqlitePool,
	group_id: &str,
	user_id: &str,
) -> ClResult<()> {
	sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
		.bind(group_id)
		.bind(user_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
