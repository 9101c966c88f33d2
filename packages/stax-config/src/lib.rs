mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CatalogProviderConfig, Config, EmbeddingProviderConfig, Ingest, Postgres, Providers, Search,
	Service, Storage,
};

use std::{fs, path::Path};

/// Lower bound accepted for a per-query `ef_search` hint.
pub const EF_SEARCH_MIN: u32 = 8;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.postgres.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.postgres.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.catalog.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.catalog.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.catalog.page_size == 0 {
		return Err(Error::Validation {
			message: "providers.catalog.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.top_k_default == 0 || cfg.search.top_k_max == 0 {
		return Err(Error::Validation {
			message: "search.top_k_default and search.top_k_max must be greater than zero."
				.to_string(),
		});
	}
	if cfg.search.top_k_default > cfg.search.top_k_max {
		return Err(Error::Validation {
			message: "search.top_k_default must not exceed search.top_k_max.".to_string(),
		});
	}
	if cfg.search.ef_search_default < EF_SEARCH_MIN {
		return Err(Error::Validation {
			message: format!("search.ef_search_default must be at least {EF_SEARCH_MIN}."),
		});
	}
	if cfg.search.ef_search_default > cfg.search.ef_search_max {
		return Err(Error::Validation {
			message: "search.ef_search_default must not exceed search.ef_search_max.".to_string(),
		});
	}
	if cfg.ingest.batch_size == 0 || cfg.ingest.isbn_batch_size == 0 {
		return Err(Error::Validation {
			message: "ingest batch sizes must be greater than zero.".to_string(),
		});
	}
	if cfg.ingest.backfill_commit_every == 0 {
		return Err(Error::Validation {
			message: "ingest.backfill_commit_every must be greater than zero.".to_string(),
		});
	}
	if cfg.ingest.reembed_batch_size == 0 {
		return Err(Error::Validation {
			message: "ingest.reembed_batch_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.catalog
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.catalog.api_key = None;
	}
	if cfg
		.providers
		.catalog
		.lang_restrict
		.as_deref()
		.map(|lang| lang.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.catalog.lang_restrict = None;
	}
}
