//! App state type

use std::sync::Arc;

use crate::acl::PermissionResolver;
use crate::catalog::TypeCatalog;
use crate::extract::PrincipalResolver;
use crate::paging::DEFAULT_PAGE_SIZE;
use crate::prelude::*;
use crate::registry::Registry;
use crate::url::UrlResolver;

use trellis_types::perm_adapter::PermAdapter;
use trellis_types::render_adapter::RenderAdapter;
use trellis_types::store_adapter::StoreAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub registry: Arc<Registry>,
	pub catalog: Arc<TypeCatalog>,
	pub permissions: PermissionResolver,

	pub store_adapter: Arc<dyn StoreAdapter>,
	pub perm_adapter: Arc<dyn PermAdapter>,
	pub render_adapter: Option<Arc<dyn RenderAdapter>>,
	pub principal_resolver: Option<Arc<dyn PrincipalResolver>>,
}

impl AppState {
	/// Assemble the frozen state. The store and rule adapters are mandatory.
	pub fn new(
		opts: AppBuilderOpts,
		registry: Registry,
		catalog: TypeCatalog,
		adapters: Adapters,
	) -> ClResult<App> {
		let store_adapter = adapters
			.store_adapter
			.ok_or_else(|| Error::ConfigError("no store adapter configured".into()))?;
		let perm_adapter = adapters
			.perm_adapter
			.ok_or_else(|| Error::ConfigError("no permission adapter configured".into()))?;
		if opts.page_size == 0 {
			return Err(Error::ConfigError("page_size must be at least 1".into()));
		}

		let catalog = Arc::new(catalog);
		let permissions = PermissionResolver::new(catalog.clone(), perm_adapter.clone());

		Ok(Arc::new(AppState {
			opts,
			registry: Arc::new(registry),
			catalog,
			permissions,
			store_adapter,
			perm_adapter,
			render_adapter: adapters.render_adapter,
			principal_resolver: adapters.principal_resolver,
		}))
	}

	/// URL resolver for a request served in `scope`
	pub fn urls<'a>(&'a self, scope: &'a ScopeId) -> UrlResolver<'a> {
		UrlResolver::new(&self.registry, &self.catalog, scope)
			.with_store(self.store_adapter.as_ref())
			.with_page_size(self.opts.page_size)
	}

	pub fn render_adapter(&self) -> ClResult<&dyn RenderAdapter> {
		self.render_adapter
			.as_deref()
			.ok_or_else(|| Error::Internal("no render adapter configured".into()))
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("opts", &self.opts)
			.field("scopes", &self.registry.scopes().len())
			.field("resource_types", &self.catalog.len())
			.finish_non_exhaustive()
	}
}

pub type App = Arc<AppState>;

#[derive(Default)]
pub struct Adapters {
	pub store_adapter: Option<Arc<dyn StoreAdapter>>,
	pub perm_adapter: Option<Arc<dyn PermAdapter>>,
	pub render_adapter: Option<Arc<dyn RenderAdapter>>,
	pub principal_resolver: Option<Arc<dyn PrincipalResolver>>,
}

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Rows per listing page, at least 1
	pub page_size: u64,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self { listen: "127.0.0.1:8080".into(), page_size: DEFAULT_PAGE_SIZE }
	}
}

// vim: ts=4
