//! App builder - runs the bootstrap registration pass and serves the app

use std::{future::Future, pin::Pin, sync::Arc};

use axum::Router;

use crate::config::Config;
use crate::prelude::*;
pub use trellis_core::app::{Adapters, App, AppBuilderOpts, AppState, VERSION};
use trellis_core::catalog::TypeCatalogBuilder;
use trellis_core::extract::PrincipalResolver;
use trellis_core::registry::RegistryBuilder;
use trellis_types::perm_adapter::PermAdapter;
use trellis_types::render_adapter::RenderAdapter;
use trellis_types::store_adapter::StoreAdapter;

type TypeCallback = Box<dyn FnOnce(&mut TypeCatalogBuilder) -> ClResult<()> + Send>;
type EndpointCallback = Box<dyn FnOnce(&mut RegistryBuilder) -> ClResult<()> + Send>;

/// Type alias for async initialization callbacks
type InitCallback =
	Box<dyn FnOnce(App) -> Pin<Box<dyn Future<Output = ClResult<()>> + Send>> + Send>;

/// Initialise the global tracing subscriber once; later calls are no-ops
pub fn init_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	adapters: Adapters,
	scopes: Vec<(ScopeId, Box<str>)>,
	types: Vec<TypeCallback>,
	endpoints: Vec<EndpointCallback>,
	on_init: Vec<InitCallback>,
}

impl AppBuilder {
	pub fn new() -> Self {
		init_logging();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			adapters: Adapters::default(),
			scopes: Vec::new(),
			types: Vec::new(),
			endpoints: Vec::new(),
			on_init: Vec::new(),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn page_size(&mut self, page_size: u64) -> &mut Self {
		self.opts.page_size = page_size;
		self
	}
	/// Declare a scope, or move a reserved one, before endpoints register
	pub fn scope(&mut self, scope: impl Into<ScopeId>, prefix: impl Into<Box<str>>) -> &mut Self {
		self.scopes.push((scope.into(), prefix.into()));
		self
	}
	/// Apply listen address, page size and scope prefixes from a config file
	pub fn config(&mut self, config: &Config) -> &mut Self {
		self.opts.listen = config.listen.clone();
		self.opts.page_size = config.page_size;
		for scope in &config.scopes {
			self.scopes.push((ScopeId::new(scope.id.clone()), scope.prefix.clone()));
		}
		self
	}

	// Adapters
	pub fn store_adapter(&mut self, store_adapter: Arc<dyn StoreAdapter>) -> &mut Self {
		self.adapters.store_adapter = Some(store_adapter);
		self
	}
	pub fn perm_adapter(&mut self, perm_adapter: Arc<dyn PermAdapter>) -> &mut Self {
		self.adapters.perm_adapter = Some(perm_adapter);
		self
	}
	pub fn render_adapter(&mut self, render_adapter: Arc<dyn RenderAdapter>) -> &mut Self {
		self.adapters.render_adapter = Some(render_adapter);
		self
	}
	pub fn principal_resolver(&mut self, resolver: Arc<dyn PrincipalResolver>) -> &mut Self {
		self.adapters.principal_resolver = Some(resolver);
		self
	}

	// Registration
	/// Register resource types during the bootstrap pass
	pub fn register_types<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&mut TypeCatalogBuilder) -> ClResult<()> + Send + 'static,
	{
		self.types.push(Box::new(f));
		self
	}

	/// Register endpoints during the bootstrap pass, after every type is known
	pub fn register_endpoints<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&mut RegistryBuilder) -> ClResult<()> + Send + 'static,
	{
		self.endpoints.push(Box::new(f));
		self
	}

	/// Register an async initialization callback that runs after App is created
	/// but before the server starts listening
	pub fn on_init<F, Fut>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(App) -> Fut + Send + 'static,
		Fut: Future<Output = ClResult<()>> + Send + 'static,
	{
		self.on_init.push(Box::new(move |app| Box::pin(f(app))));
		self
	}

	/// Run the registration pass and freeze everything into an `App`
	pub async fn build(self) -> ClResult<App> {
		info!("Trellis V{}", VERSION);

		let mut types = TypeCatalogBuilder::new();
		for callback in self.types {
			callback(&mut types)?;
		}
		let catalog = types.freeze().inspect_err(|e| error!("FATAL: Invalid resource types: {}", e))?;

		let mut registry = RegistryBuilder::new();
		for (scope, prefix) in self.scopes {
			if scope.reserved_rank().is_some() {
				registry.set_prefix(scope.as_str(), &prefix)?;
			} else {
				registry.add_scope(scope, &prefix)?;
			}
		}
		for callback in self.endpoints {
			callback(&mut registry)?;
		}
		let registry =
			registry.freeze(&catalog).inspect_err(|e| error!("FATAL: Invalid endpoints: {}", e))?;

		let app = AppState::new(self.opts, registry, catalog, self.adapters)
			.inspect_err(|e| error!("FATAL: {}", e))?;

		// Run custom init callbacks
		for callback in self.on_init {
			callback(app.clone()).await?;
		}

		Ok(app)
	}

	/// Build the app and serve the router returned by `routes`
	pub async fn run<F>(self, routes: F) -> ClResult<()>
	where
		F: FnOnce(App) -> Router,
	{
		let app = self.build().await?;
		let router = routes(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			e
		})?;
		info!("Listening on HTTP {}", app.opts.listen);
		axum::serve(listener, router).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
