//! Example Trellis site
//!
//! Serves pages and tags from a SQLite database. Environment:
//! - `TRELLIS_CONFIG`: YAML configuration file (default `./trellis.yaml`,
//!   built-in defaults when missing)
//! - `TRELLIS_TOKENS`: bearer tokens as `token=user,...`

mod handler;
mod principal;
mod render;

use std::{env, path::Path, sync::Arc};

use trellis::catalog::TypeCatalogBuilder;
use trellis::perm_adapter::PermAdapter;
use trellis::prelude::*;
use trellis::principal::EVERYONE_GROUP;
use trellis::record::Record;
use trellis::registry::RegistryBuilder;
use trellis::store_adapter::StoreAdapter;
use trellis::types::mode;
use trellis::{AppBuilder, Config};
use trellis_store_adapter_sqlite::StoreAdapterSqlite;

fn register_types(types: &mut TypeCatalogBuilder) -> ClResult<()> {
	types.register(
		ResourceType::builder("page")
			.standard_modes()
			.order_by("created", Direction::Desc)
			.build()?,
	)?;
	types.register(
		ResourceType::builder("tag").standard_modes().order_by("name", Direction::Asc).build()?,
	)?;
	Ok(())
}

fn register_endpoints(registry: &mut RegistryBuilder) -> ClResult<()> {
	let site = registry.site()?;
	site.register_view("page", mode::FULL, Some("page_full"), true)?;
	site.register_listing("page", mode::LIST, Some("page_list"), true)?;
	site.register_view("tag", mode::FULL, None, true)?;
	site.register_related_view("page", "tag", None)?;

	let admin = registry.admin()?;
	admin.register_view("page", mode::EDIT, Some("page_edit"), true)?;
	admin.register_listing("page", mode::LIST, Some("admin_page_list"), true)?;
	Ok(())
}

/// Seeds an empty database with a few pages, tags and rules
async fn seed(store: Arc<StoreAdapterSqlite>) -> ClResult<()> {
	if store.count("page", None).await? > 0 {
		return Ok(());
	}
	info!("Seeding empty database");

	for name in ["rust", "sqlite"] {
		store.create_record("tag", &Record::new(0).with_name(name)).await?;
	}
	for i in 1..=45_i64 {
		let record = Record::new(0)
			.with_field("title", format!("Page {}", i).as_str())
			.with_field("body", "Lorem ipsum")
			.with_field("created", 1_700_000_000 + i * 3600)
			.with_field("tag", if i % 3 == 0 { "sqlite" } else { "rust" });
		store.create_record("page", &record).await?;
	}

	let everyone = PrincipalRef::Group(EVERYONE_GROUP.into());
	let editors = PrincipalRef::Group("editors".into());
	for (resource_type, operation) in [("page", "read"), ("page", "list"), ("tag", "read")] {
		store.write_rule(&PermissionRule::grant(everyone.clone(), resource_type, operation)).await?;
	}
	for operation in ["update", "create", "delete", "list"] {
		store.write_rule(&PermissionRule::grant(editors.clone(), "page", operation)).await?;
	}
	store.add_group_member("editors", "alice").await?;
	Ok(())
}

#[tokio::main]
async fn main() -> ClResult<()> {
	trellis::app::init_logging();

	let config_path = env::var("TRELLIS_CONFIG").unwrap_or_else(|_| "./trellis.yaml".into());
	let config = if Path::new(&config_path).exists() {
		Config::load(&config_path).await?
	} else {
		warn!("No configuration at {}, using defaults", config_path);
		Config::default()
	};

	let store = Arc::new(StoreAdapterSqlite::new(&config.db_path).await?);
	let tokens = env::var("TRELLIS_TOKENS").unwrap_or_default();
	let principals = principal::TokenPrincipals::new(&tokens, store.clone());

	let mut builder = AppBuilder::new();
	builder
		.config(&config)
		.store_adapter(store.clone())
		.perm_adapter(store.clone())
		.render_adapter(Arc::new(render::HandlebarsRender::new()?))
		.principal_resolver(Arc::new(principals))
		.register_types(register_types)
		.register_endpoints(register_endpoints)
		.on_init(move |_app| seed(store));
	builder.run(handler::routes).await
}

// vim: ts=4
