//! Permission resolver against an in-memory rule store
#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{MemPerms, catalog};
use trellis_core::acl::{Decision, DenyReason, PermissionResolver};
use trellis_types::perm_adapter::PermAdapter;
use trellis_types::prelude::*;

fn user(id: &str) -> PrincipalRef {
	PrincipalRef::User(id.into())
}

fn group(id: &str) -> PrincipalRef {
	PrincipalRef::Group(id.into())
}

fn resolver(perms: &Arc<MemPerms>) -> PermissionResolver {
	PermissionResolver::new(Arc::new(catalog()), perms.clone())
}

#[tokio::test]
async fn test_precedence_through_the_store() {
	let perms = Arc::new(MemPerms::with_rules([
		PermissionRule::grant(group("editors"), "page", "update"),
		PermissionRule::deny(user("alice"), "page", "update"),
		PermissionRule::deny(group("trolls"), "page", "update"),
	]));
	let resolver = resolver(&perms);

	let alice = Principal::user("alice", ["editors"]);
	let bob = Principal::user("bob", ["editors"]);
	let carol = Principal::user("carol", ["editors", "trolls"]);
	let dave = Principal::user("dave", ["everyone"]);

	let decide = |p: Principal| {
		let resolver = resolver.clone();
		async move { resolver.authorize(&p, "page", "update").await.expect("authorize") }
	};
	assert_eq!(decide(alice).await, Decision::Deny(DenyReason::UserOverride));
	assert_eq!(decide(bob).await, Decision::Grant);
	assert_eq!(decide(carol).await, Decision::Deny(DenyReason::GroupRule { group: "trolls".into() }));
	assert_eq!(decide(dave).await, Decision::Deny(DenyReason::NoMatchingRule));
}

#[tokio::test]
async fn test_writes_apply_to_next_check() {
	let perms = Arc::new(MemPerms::default());
	let resolver = resolver(&perms);
	let bob = Principal::user("bob", ["everyone"]);

	assert!(!resolver.authorize(&bob, "page", "read").await.expect("authorize").is_granted());
	perms
		.write_rule(&PermissionRule::grant(group("everyone"), "page", "read"))
		.await
		.expect("write");
	assert!(resolver.authorize(&bob, "page", "read").await.expect("authorize").is_granted());

	perms.write_rule(&PermissionRule::deny(user("bob"), "page", "read")).await.expect("write");
	assert!(matches!(resolver.require(&bob, "page", "read").await, Err(Error::PermissionDenied)));

	perms.delete_rule("page", "read", &user("bob")).await.expect("delete");
	assert!(resolver.require(&bob, "page", "read").await.is_ok());
}

#[tokio::test]
async fn test_abstract_and_unknown_types_never_read_rules() {
	let perms = Arc::new(MemPerms::with_rules([PermissionRule::grant(
		group("everyone"),
		"node",
		"read",
	)]));
	let resolver = resolver(&perms);
	let anon = Principal::anonymous(["everyone"]);

	assert_eq!(
		resolver.authorize(&anon, "node", "read").await.expect("authorize"),
		Decision::Deny(DenyReason::AbstractType)
	);
	assert_eq!(
		resolver.authorize(&anon, "ghost", "read").await.expect("authorize"),
		Decision::Deny(DenyReason::UnknownResourceType)
	);
	assert_eq!(perms.reads(), 0);
}

#[tokio::test]
async fn test_rules_stay_with_the_concrete_type() {
	let perms = Arc::new(MemPerms::with_rules([PermissionRule::grant(
		group("everyone"),
		"page",
		"update",
	)]));
	let resolver = resolver(&perms);
	let anon = Principal::anonymous(["everyone"]);

	assert!(resolver.authorize_mode(&anon, "page", "edit").await.expect("authorize").is_granted());
	assert!(!resolver.authorize_mode(&anon, "article", "edit").await.expect("authorize").is_granted());
}

#[tokio::test]
async fn test_authorize_mode_maps_through_operation_table() {
	let perms = Arc::new(MemPerms::with_rules([PermissionRule::grant(
		group("everyone"),
		"page",
		"read",
	)]));
	let resolver = resolver(&perms);
	let anon = Principal::anonymous(["everyone"]);

	// full, teaser and raw all map to read
	for mode in ["full", "teaser", "raw"] {
		assert!(resolver.authorize_mode(&anon, "page", mode).await.expect("authorize").is_granted());
	}
	assert_eq!(
		resolver.authorize_mode(&anon, "page", "print").await.expect("authorize"),
		Decision::Deny(DenyReason::UnknownMode)
	);
	assert!(resolver.require_mode(&anon, "page", "delete").await.is_err());
}

#[tokio::test]
async fn test_store_failure_is_an_error_not_a_decision() {
	let perms = Arc::new(MemPerms::default());
	perms.broken.store(true, Ordering::SeqCst);
	let resolver = resolver(&perms);
	let anon = Principal::anonymous(["everyone"]);
	assert!(matches!(resolver.authorize(&anon, "page", "read").await, Err(Error::DbError)));
}

#[tokio::test]
async fn test_request_authorizer_memoizes() {
	let perms = Arc::new(MemPerms::with_rules([PermissionRule::grant(
		group("everyone"),
		"page",
		"read",
	)]));
	let resolver = resolver(&perms);

	let request = resolver.for_request(Principal::anonymous(["everyone"]));
	for mode in ["full", "teaser", "raw"] {
		assert!(request.authorize_mode("page", mode).await.expect("authorize").is_granted());
	}
	assert!(request.require("page", "update").await.is_err());
	assert_eq!(perms.reads(), 2);
	assert_eq!(request.cached(), 2);

	// A new request reads the rows again
	let next = resolver.for_request(Principal::anonymous(["everyone"]));
	next.require_mode("page", "full").await.expect("granted");
	assert_eq!(perms.reads(), 3);
}

#[tokio::test]
async fn test_group_membership_rows() {
	let perms = MemPerms::default();
	perms.add_group_member("editors", "alice").await.expect("add");
	perms.add_group_member("editors", "alice").await.expect("add twice");
	perms.add_group_member("admins", "alice").await.expect("add");
	assert_eq!(perms.list_user_groups("alice").await.expect("groups").len(), 2);
	perms.remove_group_member("admins", "alice").await.expect("remove");
	assert_eq!(perms.list_user_groups("alice").await.expect("groups"), vec![Box::from("editors")]);
}

// vim: ts=4
