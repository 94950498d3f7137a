//! Static bearer tokens mapped to users
//!
//! Tokens come from `TRELLIS_TOKENS` as `token=user` pairs separated by
//! commas. Group memberships are read from the rule store on every request.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

use trellis::extract::PrincipalResolver;
use trellis::perm_adapter::PermAdapter;
use trellis::prelude::*;
use trellis::principal::EVERYONE_GROUP;

#[derive(Debug)]
pub struct TokenPrincipals {
	tokens: HashMap<Box<str>, Box<str>>,
	perms: Arc<dyn PermAdapter>,
}

impl TokenPrincipals {
	pub fn new(pairs: &str, perms: Arc<dyn PermAdapter>) -> Self {
		let tokens = pairs
			.split(',')
			.filter_map(|pair| pair.split_once('='))
			.map(|(token, user)| (token.trim(), user.trim()))
			.filter(|(token, user)| !token.is_empty() && !user.is_empty())
			.map(|(token, user)| (Box::from(token), Box::from(user)))
			.collect::<HashMap<Box<str>, Box<str>>>();
		info!("Loaded {} bearer tokens", tokens.len());
		Self { tokens, perms }
	}
}

#[async_trait]
impl PrincipalResolver for TokenPrincipals {
	async fn resolve_principal(&self, token: &str) -> ClResult<Principal> {
		let user_id = self.tokens.get(token).ok_or(Error::PermissionDenied)?;
		let mut groups = self.perms.list_user_groups(user_id).await?;
		groups.push(EVERYONE_GROUP.into());
		Ok(Principal::user(user_id.clone(), groups))
	}
}

// vim: ts=4
