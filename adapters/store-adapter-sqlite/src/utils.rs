//! Shared utilities for the SQLite adapter
//!
//! Error mapping and query-building helpers used by the domain modules.

use sqlx::sqlite::SqliteRow;
use trellis_types::prelude::*;

/// Build an IN clause with parameterized values
pub(crate) fn push_in<'a>(
	query: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>,
	values: &'a [impl AsRef<str>],
) {
	query.push("(");
	for (i, value) in values.iter().enumerate() {
		if i > 0 {
			query.push(", ");
		}
		query.push_bind(value.as_ref());
	}
	query.push(")");
}

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a single-row query result, translating SQL errors to ClResult
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(SqliteRow) -> ClResult<T>,
{
	match row {
		Ok(row) => f(row),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Collect an iterator of row conversions, stopping at the first error
pub(crate) fn collect_res<T>(iter: impl Iterator<Item = ClResult<T>>) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item?);
	}
	Ok(items)
}

// vim: ts=4
