//! Listing offsets, pagination and listing URLs against an in-memory store
#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{MemStore, catalog, store_with_pages};
use trellis_core::paging::{Pagination, listing_page, offset_for_handle};
use trellis_core::registry::RegistryBuilder;
use trellis_core::url::UrlResolver;
use trellis_types::prelude::*;
use trellis_types::record::Record;

#[tokio::test]
async fn test_offset_in_descending_creation_order() {
	let catalog = catalog();
	let store = store_with_pages(25);

	// 10th newest is id 16, 11th newest is id 15
	let tenth = offset_for_handle(store.as_ref(), &catalog, "page", &Handle::Id(16))
		.await
		.expect("offset");
	let eleventh = offset_for_handle(store.as_ref(), &catalog, "page", &Handle::Id(15))
		.await
		.expect("offset");
	assert_eq!(tenth, 9);
	assert_eq!(eleventh, 10);

	let page = |offset| Pagination::new(25, 10, offset).expect("valid").current_page();
	assert_eq!(page(tenth), 1);
	assert_eq!(page(eleventh), 2);
}

#[tokio::test]
async fn test_offset_breaks_ties_by_id() {
	let catalog = catalog();
	let store = MemStore::default();
	for id in 1..=4 {
		store.insert("page", Record::new(id).with_field("created", 100));
	}
	store.insert("page", Record::new(5).with_field("created", 200));

	let offsets = [
		offset_for_handle(&store, &catalog, "page", &Handle::Id(5)).await.expect("offset"),
		offset_for_handle(&store, &catalog, "page", &Handle::Id(1)).await.expect("offset"),
		offset_for_handle(&store, &catalog, "page", &Handle::Id(4)).await.expect("offset"),
	];
	assert_eq!(offsets, [0, 1, 4]);
}

#[tokio::test]
async fn test_offset_by_unique_name() {
	let catalog = catalog();
	let store = MemStore::default();
	for (id, name) in [(1, "rust"), (2, "go"), (3, "zig"), (4, "c")] {
		store.insert("tag", Record::new(id).with_name(name));
	}
	let offset = offset_for_handle(&store, &catalog, "tag", &Handle::from("rust"))
		.await
		.expect("offset");
	assert_eq!(offset, 2);
}

#[tokio::test]
async fn test_offset_errors() {
	let catalog = catalog();
	let store = store_with_pages(3);
	assert!(matches!(
		offset_for_handle(store.as_ref(), &catalog, "page", &Handle::Id(99)).await,
		Err(Error::NotFound)
	));
	assert!(matches!(
		offset_for_handle(store.as_ref(), &catalog, "node", &Handle::Id(1)).await,
		Err(Error::ValidationError(_))
	));
}

#[tokio::test]
async fn test_listing_page_loads_ordered_rows() {
	let catalog = catalog();
	let store = store_with_pages(25);
	let (rows, pagination) = listing_page(store.as_ref(), &catalog, "page", 2, 10).await.expect("page");
	assert_eq!(pagination.page_count(), 3);
	assert_eq!(pagination.current_page(), 2);
	assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), (6..=15).rev().collect::<Vec<_>>());

	let (rows, _) = listing_page(store.as_ref(), &catalog, "page", 3, 10).await.expect("page");
	assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn test_listing_page_number_out_of_range() {
	let catalog = catalog();
	let store = store_with_pages(25);

	let res = listing_page(store.as_ref(), &catalog, "page", u64::MAX, 20).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	// Past the end but representable: an empty page
	let (rows, pagination) =
		listing_page(store.as_ref(), &catalog, "page", 1_000, 20).await.expect("page");
	assert!(rows.is_empty());
	assert_eq!(pagination.current_page(), 1_000);
}

#[tokio::test]
async fn test_listing_url_points_at_item_page() {
	let catalog = catalog();
	let store = store_with_pages(25);
	let mut reg = RegistryBuilder::new();
	reg.site().expect("site").register_listing("page", "list", None, false).expect("register");
	let registry = reg.freeze(&catalog).expect("freeze");

	let site = ScopeId::site();
	let urls = UrlResolver::new(&registry, &catalog, &site).with_store(store.as_ref()).with_page_size(10);
	assert_eq!(
		urls.get_url("page", Some("list"), Some(&Handle::Id(16))).await.expect("url"),
		"/page/list"
	);
	assert_eq!(
		urls.get_url("page", Some("list"), Some(&Handle::Id(15))).await.expect("url"),
		"/page/list?page=2"
	);
	assert_eq!(
		urls.get_url("page", Some("list"), Some(&Handle::Id(1))).await.expect("url"),
		"/page/list?page=3"
	);
}

#[tokio::test]
async fn test_pagination_control_urls() {
	let catalog = catalog();
	let mut reg = RegistryBuilder::new();
	reg.admin().expect("admin").register_listing("page", "list", None, false).expect("register");
	let registry = reg.freeze(&catalog).expect("freeze");
	let site = ScopeId::site();
	let urls = UrlResolver::new(&registry, &catalog, &site);

	let small = Pagination::new(5, 10, 0).expect("valid");
	assert!(urls.pagination_control("page", "list", &small).expect("control").is_none());

	let two = Pagination::new(11, 10, 0).expect("valid");
	let control = urls.pagination_control("page", "list", &two).expect("control").expect("some");
	let links: Vec<(&str, bool)> = control.pages.iter().map(|p| (p.url.as_str(), p.current)).collect();
	assert_eq!(links, [("/admin/page/list", true), ("/admin/page/list?page=2", false)]);
}

// vim: ts=4
