use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use stax_providers::catalog;
use stax_service::CatalogService;
use stax_storage::db::Db;
use tokio::time;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	version = stax_cli::VERSION,
	rename_all = "kebab",
	styles = stax_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Crawl the catalog by keyword and upsert the results.
	Crawl {
		/// Keywords to crawl; defaults to the configured list.
		keywords: Vec<String>,
		/// Upper bound of records fetched per keyword.
		#[arg(long, default_value_t = 120)]
		max_total: usize,
		/// Crawl only the first N keywords of the list.
		#[arg(long)]
		keyword_limit: Option<usize>,
		/// Backfill ISBNs from the search results instead of full upserts.
		#[arg(long)]
		isbn_only: bool,
	},
	/// Fetch volumes one by one to fill in missing ISBNs.
	BackfillIsbn {
		/// Cap on how many missing rows to process.
		#[arg(long)]
		max_missing: Option<u32>,
		/// Pause between catalog calls; defaults to the configured value.
		#[arg(long)]
		delay_ms: Option<u64>,
	},
	/// Recompute every embedding with the current model.
	Reembed {
		/// Rows per commit; defaults to the configured value.
		#[arg(long)]
		batch_size: Option<u32>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = stax_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.postgres.vector_dim).await?;

	let service = CatalogService::new(config, db);

	match args.command {
		Command::Crawl { keywords, max_total, keyword_limit, isbn_only } =>
			crawl(&service, keywords, max_total, keyword_limit, isbn_only).await,
		Command::BackfillIsbn { max_missing, delay_ms } => {
			let delay = Duration::from_millis(
				delay_ms.unwrap_or(service.cfg.ingest.backfill_delay_ms),
			);
			let report = service.backfill_isbn(max_missing, delay).await?;

			info!(updated = report.updated, failed = report.failed, "ISBN backfill done.");

			Ok(())
		},
		Command::Reembed { batch_size } => {
			let report = service.reembed_all(batch_size).await?;

			info!(updated = report.updated, failed = report.failed, "Re-embedding done.");

			Ok(())
		},
	}
}

async fn crawl(
	service: &CatalogService,
	keywords: Vec<String>,
	max_total: usize,
	keyword_limit: Option<usize>,
	isbn_only: bool,
) -> color_eyre::Result<()> {
	let mut keywords =
		if keywords.is_empty() { service.cfg.ingest.keywords.clone() } else { keywords };

	if let Some(limit) = keyword_limit {
		keywords.truncate(limit);
	}
	if keywords.is_empty() {
		return Err(eyre::eyre!(
			"No keywords to crawl. Pass them on the command line or set ingest.keywords."
		));
	}

	let catalog_cfg = &service.cfg.providers.catalog;
	let client = catalog::client(catalog_cfg)?;
	let delay = Duration::from_millis(service.cfg.ingest.keyword_delay_ms);

	for keyword in &keywords {
		info!(%keyword, "Crawling catalog.");

		let records = catalog::fetch_volumes(catalog_cfg, &client, keyword, max_total).await;

		info!(%keyword, fetched = records.len(), "Fetched catalog records.");

		if isbn_only {
			let report = service.upsert_isbn_only(&records).await?;

			info!(
				updated = report.updated,
				skipped = report.skipped,
				failed = report.failed,
				"ISBN update done."
			);
		} else {
			let report = service.upsert_batch(&records).await?;

			info!(
				inserted = report.inserted,
				updated = report.updated,
				failed = report.failed,
				"Crawl batch done."
			);
		}

		// Pause between keywords to stay under the API's rate limits.
		time::sleep(delay).await;
	}

	Ok(())
}
