//! Listing offsets and pagination
//!
//! A handle is turned into a listing offset by counting the rows that sort
//! strictly before it under the type's effective ordering: the declared
//! ordering with an ascending `id` appended as tie-breaker.

use serde::Serialize;

use crate::catalog::TypeCatalog;
use crate::prelude::*;
use trellis_types::record::{CmpOp, Cond, Filter, ListOptions, Record};
use trellis_types::store_adapter::StoreAdapter;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Declared ordering plus the implicit `id` tie-breaker
pub fn effective_order(order: &[OrderKey]) -> Vec<OrderKey> {
	let mut effective = order.to_vec();
	if !effective.iter().any(|key| key.field.as_ref() == "id") {
		effective.push(OrderKey::asc("id"));
	}
	effective
}

/// Rows sorting strictly before `record`
///
/// Branch `i` requires equality on the first `i` keys and a strict
/// comparison on key `i`: `<` for ascending keys, `>` for descending ones.
pub fn before_filter(record: &Record, order: &[OrderKey]) -> Filter {
	let any_of = (0..order.len())
		.map(|i| {
			let mut branch: Vec<Cond> = order[..i]
				.iter()
				.map(|key| Cond::new(key.field.clone(), CmpOp::Eq, record.value(&key.field)))
				.collect();
			let key = &order[i];
			let op = match key.direction {
				Direction::Asc => CmpOp::Lt,
				Direction::Desc => CmpOp::Gt,
			};
			branch.push(Cond::new(key.field.clone(), op, record.value(&key.field)));
			branch
		})
		.collect();
	Filter { any_of }
}

/// Zero-based position of an instance in its type's ordered listing
pub async fn offset_for_handle(
	store: &dyn StoreAdapter,
	catalog: &TypeCatalog,
	resource_type: &str,
	handle: &Handle,
) -> ClResult<u64> {
	let rt = catalog.concrete(resource_type)?;
	let record = store.get_by_handle(resource_type, handle).await?;
	let order = effective_order(&rt.order);
	let offset = store.count(resource_type, Some(&before_filter(&record, &order))).await?;
	debug!(resource_type = resource_type, handle = %handle, offset = offset, "Resolved listing offset");
	Ok(offset)
}

/// Loads one page of a listing together with its pagination state
pub async fn listing_page(
	store: &dyn StoreAdapter,
	catalog: &TypeCatalog,
	resource_type: &str,
	page: u64,
	page_size: u64,
) -> ClResult<(Vec<Record>, Pagination)> {
	let rt = catalog.concrete(resource_type)?;
	let total_rows = store.count(resource_type, None).await?;
	let offset = page
		.saturating_sub(1)
		.checked_mul(page_size)
		.ok_or_else(|| Error::ValidationError(format!("page {} out of range", page)))?;
	let pagination = Pagination::new(total_rows, page_size, offset)?;
	let opts = ListOptions {
		order: effective_order(&rt.order),
		offset: pagination.offset,
		limit: Some(page_size),
		..Default::default()
	};
	let records = store.list(resource_type, &opts).await?;
	Ok((records, pagination))
}

// Pagination //
//************//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
	pub total_rows: u64,
	pub page_size: u64,
	pub offset: u64,
}

impl Pagination {
	pub fn new(total_rows: u64, page_size: u64, offset: u64) -> ClResult<Self> {
		if page_size == 0 {
			return Err(Error::ValidationError("page size must be at least 1".into()));
		}
		Ok(Self { total_rows, page_size, offset })
	}

	pub fn page_count(&self) -> u64 {
		self.total_rows.div_ceil(self.page_size)
	}

	/// One-based page containing `offset`
	pub fn current_page(&self) -> u64 {
		self.offset / self.page_size + 1
	}

	/// Builds the page links, or `None` when there is a single page or none
	pub fn control<F>(&self, mut url_for: F) -> ClResult<Option<PaginationControl>>
	where
		F: FnMut(u64) -> ClResult<String>,
	{
		let page_count = self.page_count();
		if page_count < 2 {
			return Ok(None);
		}

		let current = self.current_page();
		let pages = (1..=page_count)
			.map(|page| Ok(PageLink { page, url: url_for(page)?, current: page == current }))
			.collect::<ClResult<Vec<_>>>()?;
		Ok(Some(PaginationControl { page_count, current_page: current, pages }))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
	pub page: u64,
	pub url: String,
	pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationControl {
	pub page_count: u64,
	pub current_page: u64,
	pub pages: Vec<PageLink>,
}


// vim: ts=4
