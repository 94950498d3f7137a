//! Record storage against a temporary SQLite database
#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use tempfile::TempDir;

use trellis_core::catalog::{TypeCatalog, TypeCatalogBuilder};
use trellis_core::paging::{Pagination, listing_page, offset_for_handle};
use trellis_store_adapter_sqlite::StoreAdapterSqlite;
use trellis_types::prelude::*;
use trellis_types::record::{CmpOp, Cond, FieldValue, Filter, ListOptions, Record};
use trellis_types::store_adapter::StoreAdapter;

async fn open() -> (StoreAdapterSqlite, TempDir) {
	let dir = TempDir::new().unwrap();
	let store = StoreAdapterSqlite::new(dir.path().join("db/trellis.db")).await.unwrap();
	(store, dir)
}

fn catalog() -> TypeCatalog {
	let mut builder = TypeCatalogBuilder::new();
	builder
		.register(
			ResourceType::builder("page")
				.standard_modes()
				.order_by("created", Direction::Desc)
				.build()
				.unwrap(),
		)
		.unwrap();
	builder
		.register(
			ResourceType::builder("tag")
				.standard_modes()
				.order_by("name", Direction::Asc)
				.build()
				.unwrap(),
		)
		.unwrap();
	builder.freeze().unwrap()
}

async fn with_pages(store: &StoreAdapterSqlite, count: i64) {
	for id in 1..=count {
		let record = Record::new(id).with_field("created", 1_700_000_000 + id);
		store.create_record("page", &record).await.unwrap();
	}
}

#[tokio::test]
async fn test_create_and_load() {
	let (store, _dir) = open().await;

	let record = Record::new(0).with_name("home").with_field("title", "Home").with_field("draft", false);
	let id = store.create_record("page", &record).await.unwrap();
	assert!(id > 0);

	let loaded = store.get_by_id("page", id).await.unwrap();
	assert_eq!(loaded.name.as_deref(), Some("home"));
	assert_eq!(loaded.value("title"), FieldValue::from("Home"));
	assert_eq!(loaded.value("draft"), FieldValue::Bool(false));

	let by_name = store.get_by_handle("page", &Handle::from("home")).await.unwrap();
	assert_eq!(by_name.id, id);
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
	let (store, _dir) = open().await;
	store.create_record("page", &Record::new(1).with_name("home")).await.unwrap();

	assert!(matches!(store.get_by_id("page", 2).await, Err(Error::NotFound)));
	assert!(matches!(store.get_by_id("tag", 1).await, Err(Error::NotFound)));
	assert!(matches!(store.get_by_unique_name("page", "about").await, Err(Error::NotFound)));
	assert!(matches!(store.delete_record("page", 2).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_names_are_unique_per_type() {
	let (store, _dir) = open().await;
	store.create_record("page", &Record::new(0).with_name("home")).await.unwrap();
	store.create_record("tag", &Record::new(0).with_name("home")).await.unwrap();

	let res = store.create_record("page", &Record::new(0).with_name("home")).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_numeric_names_are_rejected() {
	let (store, _dir) = open().await;
	for name in ["7", "-3", ""] {
		let res = store.create_record("page", &Record::new(0).with_name(name)).await;
		assert!(matches!(res, Err(Error::ValidationError(_))), "{:?}", name);
	}
	assert_eq!(store.count("page", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_name_handle_reloads_same_record() {
	let (store, _dir) = open().await;
	let named = store.create_record("page", &Record::new(1).with_name("7a")).await.unwrap();
	store.create_record("page", &Record::new(7).with_name("other")).await.unwrap();

	let url_segment = Handle::Name("7a".into()).to_string();
	let loaded = store.get_by_handle("page", &Handle::parse(&url_segment)).await.unwrap();
	assert_eq!(loaded.id, named);

	let loaded = store.get_by_handle("page", &Handle::parse(&Handle::Id(7).to_string())).await.unwrap();
	assert_eq!(loaded.name.as_deref(), Some("other"));
}

#[tokio::test]
async fn test_list_order_and_window() {
	let (store, _dir) = open().await;
	with_pages(&store, 7).await;

	let opts = ListOptions {
		order: vec![OrderKey::desc("created")],
		offset: 2,
		limit: Some(3),
		..Default::default()
	};
	let ids: Vec<i64> = store.list("page", &opts).await.unwrap().iter().map(|r| r.id).collect();
	assert_eq!(ids, [5, 4, 3]);

	let opts = ListOptions { order: vec![OrderKey::asc("id")], offset: 5, ..Default::default() };
	let ids: Vec<i64> = store.list("page", &opts).await.unwrap().iter().map(|r| r.id).collect();
	assert_eq!(ids, [6, 7]);
}

#[tokio::test]
async fn test_list_applies_filter_before_window() {
	let (store, _dir) = open().await;
	for id in 1..=9_i64 {
		let tag = if id % 3 == 0 { "sqlite" } else { "rust" };
		let record = Record::new(id).with_field("created", 1_700_000_000 + id).with_field("tag", tag);
		store.create_record("page", &record).await.unwrap();
	}
	store.create_record("page", &Record::new(10)).await.unwrap();

	let tagged = |tag: &str| Filter { any_of: vec![vec![Cond::new("tag", CmpOp::Eq, tag.into())]] };
	let opts = ListOptions {
		filter: Some(tagged("sqlite")),
		order: vec![OrderKey::desc("created")],
		..Default::default()
	};
	let ids: Vec<i64> = store.list("page", &opts).await.unwrap().iter().map(|r| r.id).collect();
	assert_eq!(ids, [9, 6, 3]);

	let opts = ListOptions {
		filter: Some(tagged("rust")),
		order: vec![OrderKey::asc("id")],
		offset: 2,
		limit: Some(2),
	};
	let ids: Vec<i64> = store.list("page", &opts).await.unwrap().iter().map(|r| r.id).collect();
	assert_eq!(ids, [4, 5]);

	let opts = ListOptions { filter: Some(Filter::default()), ..Default::default() };
	assert!(store.list("page", &opts).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_count_treats_missing_fields_as_smallest() {
	let (store, _dir) = open().await;
	store.create_record("page", &Record::new(1).with_field("weight", 5)).await.unwrap();
	store.create_record("page", &Record::new(2)).await.unwrap();
	store.create_record("page", &Record::new(3).with_field("weight", 9)).await.unwrap();

	let filter = |op, value| Filter { any_of: vec![vec![Cond::new("weight", op, value)]] };

	assert_eq!(store.count("page", None).await.unwrap(), 3);
	assert_eq!(store.count("page", Some(&filter(CmpOp::Lt, FieldValue::Int(9)))).await.unwrap(), 2);
	assert_eq!(store.count("page", Some(&filter(CmpOp::Gt, FieldValue::Int(5)))).await.unwrap(), 1);
	assert_eq!(store.count("page", Some(&filter(CmpOp::Eq, FieldValue::Null))).await.unwrap(), 1);
	assert_eq!(store.count("page", Some(&filter(CmpOp::Gt, FieldValue::Null))).await.unwrap(), 2);
	assert_eq!(store.count("page", Some(&filter(CmpOp::Lt, FieldValue::Null))).await.unwrap(), 0);
	assert_eq!(store.count("page", Some(&Filter::default())).await.unwrap(), 0);
}

#[tokio::test]
async fn test_listing_offset_matches_page() {
	let (store, _dir) = open().await;
	let catalog = catalog();
	with_pages(&store, 25).await;

	// 10th newest is id 16, 11th newest is id 15
	let tenth = offset_for_handle(&store, &catalog, "page", &Handle::Id(16)).await.unwrap();
	let eleventh = offset_for_handle(&store, &catalog, "page", &Handle::Id(15)).await.unwrap();
	assert_eq!((tenth, eleventh), (9, 10));

	let (rows, pagination) = listing_page(&store, &catalog, "page", 2, 10).await.unwrap();
	assert_eq!(rows.first().map(|r| r.id), Some(15));
	assert_eq!(pagination, Pagination::new(25, 10, 10).unwrap());
}

#[tokio::test]
async fn test_listing_offset_by_name() {
	let (store, _dir) = open().await;
	let catalog = catalog();
	for name in ["rust", "go", "zig", "c"] {
		store.create_record("tag", &Record::new(0).with_name(name)).await.unwrap();
	}

	let offset = offset_for_handle(&store, &catalog, "tag", &Handle::from("rust")).await.unwrap();
	assert_eq!(offset, 2);
}

// vim: ts=4
