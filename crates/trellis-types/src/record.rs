//! Persisted resource instances as seen by the core, and the query shapes
//! the core asks the persistence layer for.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{cmp::Ordering, collections::BTreeMap};

use crate::types::OrderKey;

/// Field value types
///
/// Compared with SQLite's cross-type ordering: NULL sorts before numbers,
/// numbers before text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	Null,
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	Real(f64),
	Text(Box<str>),
}

impl FieldValue {
	fn type_rank(&self) -> u8 {
		match self {
			FieldValue::Null => 0,
			FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Real(_) => 1,
			FieldValue::Text(_) => 2,
		}
	}

	fn as_f64(&self) -> Option<f64> {
		match self {
			FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
			#[allow(clippy::cast_precision_loss)]
			FieldValue::Int(i) => Some(*i as f64),
			FieldValue::Real(r) => Some(*r),
			_ => None,
		}
	}

	/// Total order used for sorting and for "strictly before" comparisons
	pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
		match (self, other) {
			(FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
			(FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
			_ => match (self.as_f64(), other.as_f64()) {
				(Some(a), Some(b)) => a.total_cmp(&b),
				_ => self.type_rank().cmp(&other.type_rank()),
			},
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, FieldValue::Null)
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		FieldValue::Int(value)
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.into())
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		FieldValue::Bool(value)
	}
}

// Record //
//********//
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	pub id: i64,
	/// Unique name within the resource type, if the type has one
	///
	/// Never numeric: names share the URL handle slot with ids (see
	/// `Handle::is_valid_name`).
	pub name: Option<Box<str>>,
	#[serde(default)]
	pub fields: BTreeMap<Box<str>, FieldValue>,
}

impl Record {
	pub fn new(id: i64) -> Self {
		Self { id, name: None, fields: BTreeMap::new() }
	}

	pub fn with_name(mut self, name: impl Into<Box<str>>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_field(mut self, field: impl Into<Box<str>>, value: impl Into<FieldValue>) -> Self {
		self.fields.insert(field.into(), value.into());
		self
	}

	/// Read a field; `id` and `name` are pseudo-fields, missing fields are NULL
	pub fn value(&self, field: &str) -> FieldValue {
		match field {
			"id" => FieldValue::Int(self.id),
			"name" => self.name.as_deref().map_or(FieldValue::Null, FieldValue::from),
			_ => self.fields.get(field).cloned().unwrap_or(FieldValue::Null),
		}
	}

	/// Compare two records under an ordering
	pub fn order_cmp(&self, other: &Record, order: &[OrderKey]) -> Ordering {
		for key in order {
			let ord = self.value(&key.field).sort_cmp(&other.value(&key.field));
			let ord = match key.direction {
				crate::types::Direction::Asc => ord,
				crate::types::Direction::Desc => ord.reverse(),
			};
			if ord != Ordering::Equal {
				return ord;
			}
		}
		Ordering::Equal
	}
}

// Filter //
//********//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
	Lt,
	Eq,
	Gt,
}

/// Single comparison `field <op> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
	pub field: Box<str>,
	pub op: CmpOp,
	pub value: FieldValue,
}

impl Cond {
	pub fn new(field: impl Into<Box<str>>, op: CmpOp, value: FieldValue) -> Self {
		Self { field: field.into(), op, value }
	}

	pub fn matches(&self, record: &Record) -> bool {
		let ord = record.value(&self.field).sort_cmp(&self.value);
		match self.op {
			CmpOp::Lt => ord == Ordering::Less,
			CmpOp::Eq => ord == Ordering::Equal,
			CmpOp::Gt => ord == Ordering::Greater,
		}
	}
}

/// Row filter in disjunctive normal form: a row matches when every
/// condition of at least one branch holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
	pub any_of: Vec<Vec<Cond>>,
}

impl Filter {
	pub fn matches(&self, record: &Record) -> bool {
		self.any_of.iter().any(|branch| branch.iter().all(|cond| cond.matches(record)))
	}
}

/// Options for `StoreAdapter::list`
///
/// The filter is applied before the `offset`/`limit` window.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
	pub filter: Option<Filter>,
	pub order: Vec<OrderKey>,
	pub offset: u64,
	pub limit: Option<u64>,
}


// vim: ts=4
