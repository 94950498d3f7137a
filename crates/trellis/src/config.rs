//! YAML configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::prelude::*;
use trellis_core::paging::DEFAULT_PAGE_SIZE;

fn default_listen() -> Box<str> {
	"127.0.0.1:8080".into()
}

fn default_page_size() -> u64 {
	DEFAULT_PAGE_SIZE
}

fn default_db_path() -> PathBuf {
	PathBuf::from("./data/trellis.db")
}

/// URL prefix of a routing scope
///
/// Entries naming `site` or `admin` move a reserved scope; any other id adds
/// an ordinary scope, in the order listed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScopeConfig {
	pub id: Box<str>,
	#[serde(default)]
	pub prefix: Box<str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	#[serde(default = "default_listen")]
	pub listen: Box<str>,
	#[serde(default = "default_page_size")]
	pub page_size: u64,
	#[serde(default = "default_db_path")]
	pub db_path: PathBuf,
	#[serde(default)]
	pub scopes: Vec<ScopeConfig>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			listen: default_listen(),
			page_size: default_page_size(),
			db_path: default_db_path(),
			scopes: Vec::new(),
		}
	}
}

impl Config {
	pub fn from_yaml(yaml: &str) -> ClResult<Self> {
		let config: Config = serde_yaml::from_str(yaml)
			.map_err(|err| Error::ConfigError(format!("invalid configuration: {}", err)))?;
		config.validate()?;
		Ok(config)
	}

	pub async fn load(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		let yaml = tokio::fs::read_to_string(path).await.map_err(|err| {
			error!("Cannot read configuration {}: {}", path.display(), err);
			Error::ConfigError(format!("cannot read {}: {}", path.display(), err))
		})?;
		info!("Loaded configuration from {}", path.display());
		Self::from_yaml(&yaml)
	}

	pub fn validate(&self) -> ClResult<()> {
		if self.page_size == 0 {
			return Err(Error::ConfigError("page_size must be at least 1".into()));
		}
		for (i, scope) in self.scopes.iter().enumerate() {
			if scope.id.is_empty() {
				return Err(Error::ConfigError("scope id must not be empty".into()));
			}
			if self.scopes[..i].iter().any(|other| other.id == scope.id) {
				return Err(Error::ConfigError(format!("scope '{}' is configured twice", scope.id)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::from_yaml("{}").unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.page_size, 20);
	}

	#[test]
	fn test_full_config() {
		let config = Config::from_yaml(
			"listen: 0.0.0.0:9000\n\
			 page_size: 10\n\
			 db_path: /var/lib/trellis/site.db\n\
			 scopes:\n\
			 - id: admin\n\
			 \x20 prefix: /manage\n\
			 - id: blog\n\
			 \x20 prefix: /blog\n",
		)
		.unwrap();
		assert_eq!(config.listen.as_ref(), "0.0.0.0:9000");
		assert_eq!(config.page_size, 10);
		assert_eq!(config.db_path, PathBuf::from("/var/lib/trellis/site.db"));
		assert_eq!(config.scopes.len(), 2);
		assert_eq!(config.scopes[1].prefix.as_ref(), "/blog");
	}

	#[test]
	fn test_invalid_values() {
		assert!(matches!(Config::from_yaml("page_size: 0"), Err(Error::ConfigError(_))));
		assert!(Config::from_yaml("page_size: -3").is_err());
		assert!(Config::from_yaml("bogus: 1").is_err());
		assert!(Config::from_yaml("scopes: [{id: blog}, {id: blog}]").is_err());
	}
}

// vim: ts=4
