use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ingest: Ingest,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	/// Dimensionality of the `embedding` vector column. Must match
	/// `providers.embedding.dimensions`.
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub catalog: CatalogProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_embedding_path")]
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_embedding_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogProviderConfig {
	pub api_base: String,
	pub api_key: Option<String>,
	#[serde(default = "default_catalog_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	pub lang_restrict: Option<String>,
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Search {
	pub top_k_default: u32,
	pub top_k_max: u32,
	pub ef_search_default: u32,
	pub ef_search_max: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k_default: 10, top_k_max: 50, ef_search_default: 64, ef_search_max: 256 }
	}
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Ingest {
	/// Records between batch commits on the upsert path.
	pub batch_size: u32,
	/// Records between batch commits on the ISBN-only path.
	pub isbn_batch_size: u32,
	/// Pause between keywords during a crawl, to stay under upstream rate
	/// limits.
	pub keyword_delay_ms: u64,
	pub backfill_commit_every: u32,
	pub backfill_delay_ms: u64,
	pub reembed_batch_size: u32,
	pub keywords: Vec<String>,
}
impl Default for Ingest {
	fn default() -> Self {
		Self {
			batch_size: 50,
			isbn_batch_size: 100,
			keyword_delay_ms: 1_000,
			backfill_commit_every: 50,
			backfill_delay_ms: 200,
			reembed_batch_size: 200,
			keywords: Vec::new(),
		}
	}
}

fn default_embedding_path() -> String {
	"/embeddings".to_string()
}

fn default_embedding_timeout_ms() -> u64 {
	30_000
}

fn default_catalog_timeout_ms() -> u64 {
	10_000
}

fn default_page_size() -> u32 {
	40
}

fn default_user_agent() -> String {
	format!("StaxCrawler/{} (+https://github.com/stax-dev/stax)", env!("CARGO_PKG_VERSION"))
}
