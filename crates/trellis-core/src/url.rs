//! Cross-scope URL resolution
//!
//! A URL is looked up in the current scope first, then in every other scope
//! in the registry's priority order. Only `NoRegisteredEndpoint` moves the
//! lookup on to the next scope; any other failure is returned as is.

use itertools::Itertools;

use crate::catalog::TypeCatalog;
use crate::paging::{self, DEFAULT_PAGE_SIZE, Pagination, PaginationControl};
use crate::prelude::*;
use crate::registry::endpoint::HANDLE_PLACEHOLDER;
use crate::registry::{EndpointDescriptor, EndpointKey, Registry, ScopeRegistry};
use trellis_types::store_adapter::StoreAdapter;
use trellis_types::types::{LISTING_PREFIX, mode};

/// Builds URLs on behalf of a request in `current` scope
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
	registry: &'a Registry,
	catalog: &'a TypeCatalog,
	store: Option<&'a dyn StoreAdapter>,
	current: &'a ScopeId,
	page_size: u64,
}

impl<'a> UrlResolver<'a> {
	pub fn new(registry: &'a Registry, catalog: &'a TypeCatalog, current: &'a ScopeId) -> Self {
		Self { registry, catalog, store: None, current, page_size: DEFAULT_PAGE_SIZE }
	}

	/// Store used to place a handle on its listing page
	pub fn with_store(mut self, store: &'a dyn StoreAdapter) -> Self {
		self.store = Some(store);
		self
	}

	pub fn with_page_size(mut self, page_size: u64) -> Self {
		self.page_size = page_size;
		self
	}

	pub fn current_scope(&self) -> &ScopeId {
		self.current
	}

	/// URL of an instance (or of the add form) in a display mode
	pub fn get_view_url(
		&self,
		resource_type: &str,
		mode: &str,
		handle: Option<&Handle>,
	) -> ClResult<String> {
		let key = EndpointKey::view(resource_type, mode);
		self.with_fallback(&key, handle, |scope, endpoint| build_url(scope, endpoint, handle, None))
	}

	/// URL of a listing page; page 1 and `None` carry no page parameter
	pub fn get_listing_url(
		&self,
		resource_type: &str,
		mode: &str,
		page: Option<u64>,
	) -> ClResult<String> {
		let key = EndpointKey::listing(resource_type, mode);
		self.with_fallback(&key, None, |scope, endpoint| build_url(scope, endpoint, None, page))
	}

	/// URL listing the instances related to `handle` through `related_field`
	pub fn get_related_view_url(
		&self,
		resource_type: &str,
		related_field: &str,
		handle: &Handle,
	) -> ClResult<String> {
		let key = EndpointKey::related(resource_type, related_field);
		let handle = Some(handle);
		self.with_fallback(&key, handle, |scope, endpoint| build_url(scope, endpoint, handle, None))
	}

	/// Resolve a URL for a resource type, choosing between view and listing
	///
	/// A view is used for the `add` mode, and when a handle is given with no
	/// mode or a mode outside the listing prefix. Otherwise a listing is
	/// used; with a handle it points at the page containing that instance.
	pub async fn get_url(
		&self,
		resource_type: &str,
		mode: Option<&str>,
		handle: Option<&Handle>,
	) -> ClResult<String> {
		let is_view = mode == Some(mode::ADD)
			|| (handle.is_some() && !mode.is_some_and(|m| m.starts_with(LISTING_PREFIX)));

		if is_view {
			return self.get_view_url(resource_type, mode.unwrap_or(mode::FULL), handle);
		}

		let mode = mode.unwrap_or(mode::LIST);
		let page = match handle {
			Some(handle) => {
				let offset = self.offset_for_handle(resource_type, handle).await?;
				Some(Pagination::new(0, self.page_size, offset)?.current_page())
			}
			None => None,
		};
		self.get_listing_url(resource_type, mode, page)
	}

	/// Zero-based listing offset of an instance
	pub async fn offset_for_handle(&self, resource_type: &str, handle: &Handle) -> ClResult<u64> {
		let store = self
			.store
			.ok_or_else(|| Error::Internal("URL resolver has no store adapter".into()))?;
		paging::offset_for_handle(store, self.catalog, resource_type, handle).await
	}

	/// Page links for a listing, `None` when it fits on one page
	pub fn pagination_control(
		&self,
		resource_type: &str,
		mode: &str,
		pagination: &Pagination,
	) -> ClResult<Option<PaginationControl>> {
		pagination.control(|page| self.get_listing_url(resource_type, mode, Some(page)))
	}

	fn with_fallback<F>(&self, key: &EndpointKey, handle: Option<&Handle>, build: F) -> ClResult<String>
	where
		F: Fn(&ScopeRegistry, &EndpointDescriptor) -> ClResult<String>,
	{
		let mut tried = Vec::new();
		for scope in self.registry.fallback_order(self.current) {
			match scope.resolve(key) {
				Ok(endpoint) => {
					if !tried.is_empty() {
						debug!(
							"Resolved {} in scope '{}' after trying {}",
							key,
							scope.id(),
							tried.iter().join(", ")
						);
					}
					return build(scope, endpoint);
				}
				Err(Error::NoRegisteredEndpoint { .. }) => tried.push(scope.id().as_str()),
				Err(err) => return Err(err),
			}
		}

		let handle = handle.map_or_else(|| "-".to_string(), ToString::to_string);
		warn!("No URL for {} (handle {}) in any scope", key, handle);
		Err(Error::LookupError {
			resource_type: key.resource_type.clone(),
			handle: handle.into(),
			mode: key.name.clone(),
			tried: tried.iter().join(", ").into(),
		})
	}
}

/// Scope prefix + route, `{handle}` substituted, `page=N` appended when N > 1
fn build_url(
	scope: &ScopeRegistry,
	endpoint: &EndpointDescriptor,
	handle: Option<&Handle>,
	page: Option<u64>,
) -> ClResult<String> {
	let route = if endpoint.needs_handle() {
		let Some(handle) = handle else {
			return Err(Error::ValidationError(format!(
				"endpoint '{}' needs a handle",
				endpoint.id
			)));
		};
		endpoint.route.replace(HANDLE_PLACEHOLDER, &urlencoding::encode(&handle.to_string()))
	} else {
		endpoint.route.to_string()
	};

	let mut url = format!("{}{}", scope.prefix(), route);
	if let Some(page) = page.filter(|&p| p > 1) {
		url.push(if url.contains('?') { '&' } else { '?' });
		url.push_str(&format!("page={}", page));
	}
	Ok(url)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::TypeCatalogBuilder;
	use crate::registry::{EndpointDef, RegistryBuilder};

	fn setup() -> (Registry, TypeCatalog) {
		let mut catalog = TypeCatalogBuilder::new();
		for name in ["page", "comment"] {
			catalog
				.register(ResourceType::builder(name).standard_modes().build().expect("valid"))
				.expect("register");
		}
		let catalog = catalog.freeze().expect("freeze");

		let mut reg = RegistryBuilder::new();
		let site = reg.site().expect("site");
		site.register_view("page", "full", None, true).expect("register");
		site.register_view("page", "add", None, false).expect("register");
		site.register_listing("page", "list", None, false).expect("register");
		site.register_related_view("comment", "page", None).expect("register");
		let admin = reg.admin().expect("admin");
		admin.register_view("page", "edit", None, false).expect("register");
		admin
			.register(EndpointDef::listing("page", "list").id("admin_pages").route("/content"))
			.expect("register");
		let blog = reg.add_scope(ScopeId::new("blog"), "/blog").expect("blog");
		blog.register_view("comment", "full", None, false).expect("register");
		(reg.freeze(&catalog).expect("freeze"), catalog)
	}

	#[test]
	fn test_current_scope_wins() {
		let (registry, catalog) = setup();
		let admin = ScopeId::admin();
		let urls = UrlResolver::new(&registry, &catalog, &admin);
		assert_eq!(urls.get_listing_url("page", "list", None).ok().as_deref(), Some("/admin/content"));

		let site = ScopeId::site();
		let urls = UrlResolver::new(&registry, &catalog, &site);
		assert_eq!(urls.get_listing_url("page", "list", Some(3)).ok().as_deref(), Some("/page/list?page=3"));
		assert_eq!(urls.get_listing_url("page", "list", Some(1)).ok().as_deref(), Some("/page/list"));
	}

	#[test]
	fn test_falls_back_in_priority_order() {
		let (registry, catalog) = setup();
		let blog = ScopeId::new("blog");
		let urls = UrlResolver::new(&registry, &catalog, &blog);
		let handle = Handle::from(7);
		assert_eq!(urls.get_view_url("page", "full", Some(&handle)).ok().as_deref(), Some("/page/7/full"));
		assert_eq!(
			urls.get_view_url("page", "edit", Some(&handle)).ok().as_deref(),
			Some("/admin/page/7/edit")
		);
		assert_eq!(
			urls.get_related_view_url("comment", "page", &Handle::from("about us")).ok().as_deref(),
			Some("/comment/page/about%20us")
		);
	}

	#[test]
	fn test_lookup_error_lists_scopes_in_order() {
		let (registry, catalog) = setup();
		let blog = ScopeId::new("blog");
		let urls = UrlResolver::new(&registry, &catalog, &blog);
		let err = urls.get_view_url("page", "teaser", Some(&Handle::from(1))).expect_err("no endpoint");
		match err {
			Error::LookupError { tried, handle, mode, .. } => {
				assert_eq!(tried.as_ref(), "blog, site, admin");
				assert_eq!(handle.as_ref(), "1");
				assert_eq!(mode.as_ref(), "teaser");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_missing_handle_is_not_a_fallback() {
		let (registry, catalog) = setup();
		let site = ScopeId::site();
		let urls = UrlResolver::new(&registry, &catalog, &site);
		assert!(matches!(urls.get_view_url("page", "full", None), Err(Error::ValidationError(_))));
		assert_eq!(urls.get_view_url("page", "add", None).ok().as_deref(), Some("/page/add"));
	}

	#[tokio::test]
	async fn test_get_url_dispatch_without_store() {
		let (registry, catalog) = setup();
		let site = ScopeId::site();
		let urls = UrlResolver::new(&registry, &catalog, &site);
		let handle = Handle::from(3);

		assert_eq!(urls.get_url("page", None, Some(&handle)).await.ok().as_deref(), Some("/page/3/full"));
		assert_eq!(urls.get_url("page", Some("add"), None).await.ok().as_deref(), Some("/page/add"));
		assert_eq!(urls.get_url("page", None, None).await.ok().as_deref(), Some("/page/list"));
		assert_eq!(urls.get_url("page", Some("list"), None).await.ok().as_deref(), Some("/page/list"));
		// Listing with a handle needs the store
		assert!(matches!(
			urls.get_url("page", Some("list"), Some(&handle)).await,
			Err(Error::Internal(_))
		));
	}
}

// vim: ts=4
