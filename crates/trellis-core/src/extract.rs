//! Custom extractors for Trellis-specific request data

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};

use crate::acl::RequestAuthorizer;
use crate::app::App;
use crate::prelude::*;
use trellis_types::principal::EVERYONE_GROUP;

/// Turns a bearer token into a principal
///
/// Implemented by the host; the core never validates credentials itself.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
	async fn resolve_principal(&self, token: &str) -> ClResult<Principal>;
}

/// Blanket impl for `Arc<T>` so shared resolvers can be handed around
#[async_trait]
impl<T: PrincipalResolver> PrincipalResolver for Arc<T> {
	async fn resolve_principal(&self, token: &str) -> ClResult<Principal> {
		(**self).resolve_principal(token).await
	}
}

/// Principal of visitors who present no credentials
pub fn anonymous() -> Principal {
	Principal::anonymous([EVERYONE_GROUP])
}

// Auth //
//******//
/// Authenticated principal, set by the auth middleware
#[derive(Debug, Clone)]
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// OptionalAuth //
//**************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<Principal>);

impl OptionalAuth {
	/// The authenticated principal, or the anonymous one
	pub fn principal(self) -> Principal {
		self.0.unwrap_or_else(anonymous)
	}
}

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// CurrentScope //
//**************//
/// Routing scope serving the request, `site` unless a scope layer set one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentScope(pub ScopeId);

impl<S> FromRequestParts<S> for CurrentScope
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<CurrentScope>().cloned().unwrap_or(CurrentScope(ScopeId::site())))
	}
}

// Authorizer //
//************//
/// Request-scoped authorizer for the request's principal
///
/// Created on first extraction and stored in the request extensions, so a
/// permission middleware and the handler behind it share one decision memo.
#[derive(Debug, Clone)]
pub struct Authorizer(pub Arc<RequestAuthorizer>);

impl Authorizer {
	pub(crate) fn from_extensions(extensions: &mut Extensions, app: &App) -> Self {
		if let Some(authorizer) = extensions.get::<Authorizer>() {
			return authorizer.clone();
		}
		let principal = extensions.get::<Auth>().map_or_else(anonymous, |a| a.0.clone());
		let authorizer = Authorizer(Arc::new(app.permissions.for_request(principal)));
		extensions.insert(authorizer.clone());
		authorizer
	}
}

impl std::ops::Deref for Authorizer {
	type Target = RequestAuthorizer;

	fn deref(&self) -> &RequestAuthorizer {
		&self.0
	}
}

impl FromRequestParts<App> for Authorizer {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
		Ok(Authorizer::from_extensions(&mut parts.extensions, app))
	}
}

// vim: ts=4
