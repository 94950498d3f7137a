//! Request middlewares: principal resolution, scope tagging and permission checks

use axum::{
	extract::{Request, State},
	http::header,
	middleware::Next,
	response::Response,
};
use std::{future::Future, pin::Pin};

use crate::extract::{Auth, Authorizer, CurrentScope};
use crate::prelude::*;

/// Return type of the middleware factories in this module
pub type PermissionCheckOutput = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send>>;

fn bearer_token(req: &Request) -> Option<String> {
	req.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(|token| token.trim().to_string())
}

/// Resolves the bearer token, if any, into an `Auth` extension
///
/// Requests without a token, or with one the resolver rejects, continue as
/// anonymous.
pub async fn optional_auth(State(app): State<App>, mut req: Request, next: Next) -> Response {
	if let (Some(token), Some(resolver)) = (bearer_token(&req), app.principal_resolver.as_ref()) {
		match resolver.resolve_principal(&token).await {
			Ok(principal) => {
				req.extensions_mut().insert(Auth(principal));
			}
			Err(err) => debug!("Ignoring invalid bearer token: {}", err),
		}
	}

	next.run(req).await
}

/// Like `optional_auth`, but refuses requests without a valid token
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> Result<Response, Error> {
	let token = bearer_token(&req).ok_or(Error::PermissionDenied)?;
	let resolver = app.principal_resolver.as_ref().ok_or(Error::PermissionDenied)?;
	let principal = resolver.resolve_principal(&token).await.map_err(|err| {
		warn!("Rejected bearer token: {}", err);
		Error::PermissionDenied
	})?;

	req.extensions_mut().insert(Auth(principal));
	Ok(next.run(req).await)
}

/// Middleware factory tagging requests with the scope serving them
pub fn with_scope(
	scope: ScopeId,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
	move |mut req, next| {
		req.extensions_mut().insert(CurrentScope(scope.clone()));
		Box::pin(next.run(req))
	}
}

/// Middleware factory for display mode permission checks
///
/// Authorizes the request's principal (anonymous when unauthenticated) for
/// `mode` of `resource_type` and refuses with `PermissionDenied` otherwise.
///
/// # Returns
/// A cloneable middleware function with return type `PermissionCheckOutput`
pub fn check_perm(
	resource_type: &'static str,
	mode: &'static str,
) -> impl Fn(State<App>, Request, Next) -> PermissionCheckOutput + Clone {
	move |state, req, next| Box::pin(check_mode_permission(state, req, next, resource_type, mode))
}

async fn check_mode_permission(
	State(app): State<App>,
	mut req: Request,
	next: Next,
	resource_type: &str,
	mode: &str,
) -> Result<Response, Error> {
	let authorizer = Authorizer::from_extensions(req.extensions_mut(), &app);

	if let crate::acl::Decision::Deny(reason) = authorizer.authorize_mode(resource_type, mode).await? {
		warn!(
			principal = %authorizer.principal(),
			resource_type = resource_type,
			mode = mode,
			reason = %reason,
			"Permission denied"
		);
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
