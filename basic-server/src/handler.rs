//! HTTP handlers and router

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	middleware::{from_fn, from_fn_with_state},
	response::Html,
	routing::get,
};
use serde::{Deserialize, Serialize};

use trellis::extract::{Authorizer, CurrentScope};
use trellis::middleware::{check_perm, optional_auth, require_auth, with_scope};
use trellis::paging::{PaginationControl, effective_order, listing_page};
use trellis::prelude::*;
use trellis::record::{CmpOp, Cond, FieldValue, Filter, ListOptions};
use trellis::types::mode;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
	page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
	#[serde(rename = "type")]
	resource_type: String,
	mode: Option<String>,
	handle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
	items: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pagination: Option<PaginationControl>,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
	url: String,
}

async fn render_view(
	app: &App,
	resource_type: &str,
	handle: &str,
	mode: &str,
) -> ClResult<Html<String>> {
	let record = app.store_adapter.get_by_handle(resource_type, &Handle::parse(handle)).await?;
	let html = app.render_adapter()?.render(resource_type, &record, mode).await?;
	Ok(Html(html))
}

/// GET /page/{handle}/full
pub async fn get_page(State(app): State<App>, Path(handle): Path<String>) -> ClResult<Html<String>> {
	render_view(&app, "page", &handle, mode::FULL).await
}

/// GET /page/{handle}/edit
pub async fn edit_page(State(app): State<App>, Path(handle): Path<String>) -> ClResult<Html<String>> {
	render_view(&app, "page", &handle, mode::EDIT).await
}

/// GET /tag/{handle}/full - the tag followed by a link to its pages
pub async fn get_tag(
	State(app): State<App>,
	CurrentScope(scope): CurrentScope,
	Path(handle): Path<String>,
) -> ClResult<Html<String>> {
	let Html(mut html) = render_view(&app, "tag", &handle, mode::FULL).await?;
	let related = app.urls(&scope).get_related_view_url("page", "tag", &Handle::parse(&handle))?;
	html.push_str(&format!("<a href=\"{}\">pages</a>", related));
	Ok(Html(html))
}

/// GET /page/list?page=N
///
/// Teasers of one listing page, with page links when there is more than one
pub async fn list_pages(
	State(app): State<App>,
	CurrentScope(scope): CurrentScope,
	Query(query): Query<ListQuery>,
) -> ClResult<Json<ListingResponse>> {
	let page = query.page.unwrap_or(1).max(1);
	let (records, pagination) =
		listing_page(app.store_adapter.as_ref(), &app.catalog, "page", page, app.opts.page_size)
			.await?;

	let render = app.render_adapter()?;
	let mut items = Vec::with_capacity(records.len());
	for record in &records {
		items.push(render.render("page", record, mode::TEASER).await?);
	}
	let pagination = app.urls(&scope).pagination_control("page", mode::LIST, &pagination)?;

	Ok(Json(ListingResponse { items, pagination }))
}

/// GET /page/tag/{handle} - teasers of the pages carrying a tag
pub async fn list_tagged(
	State(app): State<App>,
	Path(handle): Path<String>,
	authz: Authorizer,
) -> ClResult<Json<ListingResponse>> {
	authz.require_mode("tag", mode::FULL).await?;
	let tag = app.store_adapter.get_by_handle("tag", &Handle::parse(&handle)).await?;
	let Some(tag_name) = tag.name else {
		return Ok(Json(ListingResponse { items: Vec::new(), pagination: None }));
	};

	let tagged = Cond::new("tag", CmpOp::Eq, FieldValue::Text(tag_name));
	let opts = ListOptions {
		filter: Some(Filter { any_of: vec![vec![tagged]] }),
		order: effective_order(&app.catalog.concrete("page")?.order),
		..Default::default()
	};
	let render = app.render_adapter()?;
	let mut items = Vec::new();
	for record in app.store_adapter.list("page", &opts).await? {
		items.push(render.render("page", &record, mode::TEASER).await?);
	}

	Ok(Json(ListingResponse { items, pagination: None }))
}

/// GET /url?type=T&mode=M&handle=H
///
/// Resolves a URL from the scope serving the request, falling back to the
/// other scopes
pub async fn resolve_url(
	State(app): State<App>,
	CurrentScope(scope): CurrentScope,
	Query(query): Query<UrlQuery>,
) -> ClResult<Json<UrlResponse>> {
	let handle = query.handle.as_deref().map(Handle::parse);
	let url = app
		.urls(&scope)
		.get_url(&query.resource_type, query.mode.as_deref(), handle.as_ref())
		.await?;
	Ok(Json(UrlResponse { url }))
}

fn mount(router: Router<App>, prefix: &str, scoped: Router<App>) -> Router<App> {
	if prefix.is_empty() { router.merge(scoped) } else { router.nest(prefix, scoped) }
}

pub fn routes(app: App) -> Router {
	let site = Router::new()
		.route(
			"/page/{handle}/full",
			get(get_page).layer(from_fn_with_state(app.clone(), check_perm("page", mode::FULL))),
		)
		.route(
			"/page/list",
			get(list_pages).layer(from_fn_with_state(app.clone(), check_perm("page", mode::LIST))),
		)
		.route(
			"/page/tag/{handle}",
			get(list_tagged).layer(from_fn_with_state(app.clone(), check_perm("page", mode::LIST))),
		)
		.route(
			"/tag/{handle}/full",
			get(get_tag).layer(from_fn_with_state(app.clone(), check_perm("tag", mode::FULL))),
		)
		.route("/url", get(resolve_url))
		.layer(from_fn(with_scope(ScopeId::site())));

	let admin = Router::new()
		.route(
			"/page/{handle}/edit",
			get(edit_page).layer(from_fn_with_state(app.clone(), check_perm("page", mode::EDIT))),
		)
		.route(
			"/page/list",
			get(list_pages).layer(from_fn_with_state(app.clone(), check_perm("page", mode::LIST))),
		)
		.route("/url", get(resolve_url))
		.layer(from_fn_with_state(app.clone(), require_auth))
		.layer(from_fn(with_scope(ScopeId::admin())));

	let prefix = |scope: ScopeId| {
		app.registry.scope(scope.as_str()).map(|s| s.prefix().to_string()).unwrap_or_default()
	};
	let site_prefix = prefix(ScopeId::site());
	let admin_prefix = prefix(ScopeId::admin());

	let router = mount(Router::new(), &admin_prefix, admin);
	mount(router, &site_prefix, site)
		.layer(from_fn_with_state(app.clone(), optional_auth))
		.with_state(app)
}

// vim: ts=4
