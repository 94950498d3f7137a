//! Resource instance storage
//!
//! Instances live in a single `records` table. `id` and `name` are real
//! columns; every other field is kept in the `data` JSON object and compared
//! through `json_extract`, which keeps SQLite's cross-type ordering (NULL
//! before numbers, numbers before text).

use std::collections::BTreeMap;

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use trellis_types::prelude::*;
use trellis_types::record::{CmpOp, Cond, FieldValue, Filter, ListOptions, Record};

const SELECT_RECORD: &str = "SELECT id, name, data FROM records WHERE type = ";

fn check_field(field: &str) -> ClResult<()> {
	if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return Err(Error::ValidationError(format!("invalid field name '{}'", field)));
	}
	Ok(())
}

/// Push the SQL expression reading `field`
fn push_field(query: &mut QueryBuilder<'_, Sqlite>, field: &str) {
	match field {
		"id" => {
			query.push("id");
		}
		"name" => {
			query.push("name");
		}
		_ => {
			query.push("json_extract(data, ");
			query.push_bind(format!("$.\"{}\"", field));
			query.push(")");
		}
	}
}

fn push_value(query: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
	match value {
		FieldValue::Null => {
			query.push("NULL");
		}
		FieldValue::Bool(b) => {
			query.push_bind(i64::from(*b));
		}
		FieldValue::Int(i) => {
			query.push_bind(*i);
		}
		FieldValue::Real(r) => {
			query.push_bind(*r);
		}
		FieldValue::Text(s) => {
			query.push_bind(s.to_string());
		}
	}
}

/// Push one comparison, treating NULL as smaller than every value
fn push_cond(query: &mut QueryBuilder<'_, Sqlite>, cond: &Cond) -> ClResult<()> {
	check_field(&cond.field)?;
	match (cond.op, cond.value.is_null()) {
		(CmpOp::Lt, true) => {
			query.push("0");
		}
		(CmpOp::Lt, false) => {
			query.push("(");
			push_field(query, &cond.field);
			query.push(" IS NULL OR ");
			push_field(query, &cond.field);
			query.push(" < ");
			push_value(query, &cond.value);
			query.push(")");
		}
		(CmpOp::Eq, true) => {
			push_field(query, &cond.field);
			query.push(" IS NULL");
		}
		(CmpOp::Gt, true) => {
			push_field(query, &cond.field);
			query.push(" IS NOT NULL");
		}
		(op, false) => {
			push_field(query, &cond.field);
			query.push(if op == CmpOp::Eq { " = " } else { " > " });
			push_value(query, &cond.value);
		}
	}
	Ok(())
}

/// Push a DNF filter; an empty filter matches nothing
fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> ClResult<()> {
	if filter.any_of.is_empty() {
		query.push("0");
		return Ok(());
	}
	query.push("(");
	for (i, branch) in filter.any_of.iter().enumerate() {
		if i > 0 {
			query.push(" OR ");
		}
		query.push("(");
		if branch.is_empty() {
			query.push("1");
		}
		for (j, cond) in branch.iter().enumerate() {
			if j > 0 {
				query.push(" AND ");
			}
			push_cond(query, cond)?;
		}
		query.push(")");
	}
	query.push(")");
	Ok(())
}

fn push_order(query: &mut QueryBuilder<'_, Sqlite>, order: &[OrderKey]) -> ClResult<()> {
	if order.is_empty() {
		query.push(" ORDER BY id");
		return Ok(());
	}
	query.push(" ORDER BY ");
	for (i, key) in order.iter().enumerate() {
		check_field(&key.field)?;
		if i > 0 {
			query.push(", ");
		}
		push_field(query, &key.field);
		query.push(match key.direction {
			Direction::Asc => " ASC",
			Direction::Desc => " DESC",
		});
	}
	Ok(())
}

fn json_to_field(value: serde_json::Value) -> FieldValue {
	match value {
		serde_json::Value::Null => FieldValue::Null,
		serde_json::Value::Bool(b) => FieldValue::Bool(b),
		serde_json::Value::Number(n) => {
			n.as_i64().map_or_else(|| FieldValue::Real(n.as_f64().unwrap_or(f64::NAN)), FieldValue::Int)
		}
		serde_json::Value::String(s) => FieldValue::Text(s.into()),
		other => FieldValue::Text(other.to_string().into()),
	}
}

fn field_to_json(value: &FieldValue) -> serde_json::Value {
	match value {
		FieldValue::Null => serde_json::Value::Null,
		FieldValue::Bool(b) => serde_json::Value::Bool(*b),
		FieldValue::Int(i) => serde_json::Value::from(*i),
		FieldValue::Real(r) => serde_json::Value::from(*r),
		FieldValue::Text(s) => serde_json::Value::from(s.as_ref()),
	}
}

fn row_to_record(row: SqliteRow) -> ClResult<Record> {
	let id: i64 = row.try_get("id").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let name: Option<String> = row.try_get("name").inspect_err(inspect).map_err(|_| Error::DbError)?;
	let data: String = row.try_get("data").inspect_err(inspect).map_err(|_| Error::DbError)?;

	let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&data)
		.inspect_err(|err| warn!("Invalid record data for {}: {}", id, err))
		.map_err(|_| Error::DbError)?;
	let fields: BTreeMap<Box<str>, FieldValue> =
		data.into_iter().map(|(k, v)| (k.into_boxed_str(), json_to_field(v))).collect();

	Ok(Record { id, name: name.map(String::into_boxed_str), fields })
}

pub(crate) async fn get_by_id(db: &SqlitePool, resource_type: &str, id: i64) -> ClResult<Record> {
	let res = sqlx::query("SELECT id, name, data FROM records WHERE type = ? AND id = ?")
		.bind(resource_type)
		.bind(id)
		.fetch_one(db)
		.await;

	map_res(res, row_to_record)
}

pub(crate) async fn get_by_name(
	db: &SqlitePool,
	resource_type: &str,
	name: &str,
) -> ClResult<Record> {
	let res = sqlx::query("SELECT id, name, data FROM records WHERE type = ? AND name = ?")
		.bind(resource_type)
		.bind(name)
		.fetch_one(db)
		.await;

	map_res(res, row_to_record)
}

pub(crate) async fn list(
	db: &SqlitePool,
	resource_type: &str,
	opts: &ListOptions,
) -> ClResult<Vec<Record>> {
	let mut query = QueryBuilder::<Sqlite>::new(SELECT_RECORD);
	query.push_bind(resource_type);
	if let Some(filter) = &opts.filter {
		query.push(" AND ");
		push_filter(&mut query, filter)?;
	}
	push_order(&mut query, &opts.order)?;

	let limit = opts.limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1);
	let offset = i64::try_from(opts.offset)
		.map_err(|_| Error::ValidationError("offset out of range".into()))?;
	query.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.into_iter().map(row_to_record))
}

pub(crate) async fn count(
	db: &SqlitePool,
	resource_type: &str,
	filter: Option<&Filter>,
) -> ClResult<u64> {
	let mut query = QueryBuilder::<Sqlite>::new("SELECT count(*) AS cnt FROM records WHERE type = ");
	query.push_bind(resource_type);
	if let Some(filter) = filter {
		query.push(" AND ");
		push_filter(&mut query, filter)?;
	}

	let res = query.build().fetch_one(db).await;
	map_res(res, |row| {
		let cnt: i64 = row.try_get("cnt").inspect_err(inspect).map_err(|_| Error::DbError)?;
		Ok(u64::try_from(cnt).unwrap_or_default())
	})
}

/// Insert a record; a non-positive id lets SQLite assign one
///
/// Numeric or empty names are rejected as they would read back as ids.
pub(crate) async fn create(db: &SqlitePool, resource_type: &str, record: &Record) -> ClResult<i64> {
	for field in record.fields.keys() {
		check_field(field)?;
	}
	if let Some(name) = record.name.as_deref().filter(|name| !Handle::is_valid_name(name)) {
		return Err(Error::ValidationError(format!("invalid {} name '{}'", resource_type, name)));
	}
	let data: serde_json::Map<String, serde_json::Value> =
		record.fields.iter().map(|(k, v)| (k.to_string(), field_to_json(v))).collect();
	let data = serde_json::Value::Object(data).to_string();

	let res = sqlx::query(
		"INSERT INTO records (id, type, name, data) VALUES (?, ?, ?, ?) RETURNING id",
	)
	.bind((record.id > 0).then_some(record.id))
	.bind(resource_type)
	.bind(record.name.as_deref())
	.bind(data)
	.fetch_one(db)
	.await;

	match res {
		Ok(row) => row.try_get("id").inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			Err(Error::ValidationError(format!("duplicate {} record", resource_type)))
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) async fn delete(db: &SqlitePool, resource_type: &str, id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM records WHERE type = ? AND id = ?")
		.bind(resource_type)
		.bind(id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}


// vim: ts=4
