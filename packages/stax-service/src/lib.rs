pub mod ingest;
pub mod maintenance;
pub mod search;

use std::{future::Future, pin::Pin, sync::Arc};

use stax_config::{CatalogProviderConfig, Config, EmbeddingProviderConfig};
use stax_domain::CatalogRecord;
use stax_providers::{catalog, embedding};
use stax_storage::db::Db;

pub use ingest::{IngestReport, IsbnReport};
pub use maintenance::{BackfillReport, ReembedReport};
pub use search::{ScoredBook, SearchRequest};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<stax_storage::Error> for Error {
	fn from(err: stax_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<stax_providers::Error> for Error {
	fn from(err: stax_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, stax_providers::Result<Vec<Vec<f32>>>>;
}

pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn fetch_volume<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		external_id: &'a str,
	) -> BoxFuture<'a, stax_providers::Result<CatalogRecord>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub catalog: Arc<dyn CatalogProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, catalog: Arc<dyn CatalogProvider>) -> Self {
		Self { embedding, catalog }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), catalog: provider }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, stax_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl CatalogProvider for DefaultProviders {
	fn fetch_volume<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		external_id: &'a str,
	) -> BoxFuture<'a, stax_providers::Result<CatalogRecord>> {
		Box::pin(async move {
			let client = catalog::client(cfg)?;

			catalog::fetch_volume(cfg, &client, external_id).await
		})
	}
}

/// The one context every entry point runs against: configuration, the
/// connection pool, and the external providers, constructed once at process
/// start and passed down. No global lookup anywhere.
pub struct CatalogService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl CatalogService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Embeds one text and enforces the configured dimensionality before the
	/// vector can reach the store.
	pub(crate) async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[text.to_string()])
			.await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.postgres.vector_dim as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension {} does not match configured vector_dim {}.",
					vector.len(),
					self.cfg.storage.postgres.vector_dim
				),
			});
		}

		Ok(vector)
	}
}
