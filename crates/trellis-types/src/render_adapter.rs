//! Adapter that renders a resource instance in a display mode.
//!
//! The core never parses templates; it only hands over `(record, mode)`.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::record::Record;

#[async_trait]
pub trait RenderAdapter: Debug + Send + Sync {
	async fn render(&self, resource_type: &str, record: &Record, mode: &str) -> ClResult<String>;
}

// vim: ts=4
