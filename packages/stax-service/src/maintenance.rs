use std::time::Duration;

use serde::Serialize;
use sqlx::Acquire;
use stax_domain::text;
use stax_storage::queries;
use tokio::time;
use tracing::{info, warn};

use crate::{CatalogService, Result};

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BackfillReport {
	pub updated: u64,
	pub failed: u64,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ReembedReport {
	pub updated: u64,
	pub failed: u64,
}

impl CatalogService {
	/// Fills in `isbn` for rows that still lack one, fetching each volume
	/// from the catalog through the shared retry policy. Per-item failures
	/// (fetch errors, volumes without a resolvable ISBN) are counted and
	/// skipped; the job itself only fails on batch-level store errors.
	/// Commits every `ingest.backfill_commit_every` successful updates and
	/// sleeps `inter_item_delay` between external calls.
	pub async fn backfill_isbn(
		&self,
		max_missing: Option<u32>,
		inter_item_delay: Duration,
	) -> Result<BackfillReport> {
		let rows =
			queries::select_missing_isbn(&self.db, max_missing.map(|max| max as i64)).await?;
		let commit_every = self.cfg.ingest.backfill_commit_every as u64;
		let mut report = BackfillReport::default();
		let mut tx = self.db.pool.begin().await?;

		info!(missing = rows.len(), "Backfilling ISBNs.");

		for row in rows {
			let record = match self
				.providers
				.catalog
				.fetch_volume(&self.cfg.providers.catalog, &row.external_id)
				.await
			{
				Ok(record) => record,
				Err(err) => {
					warn!(external_id = %row.external_id, error = %err, "Failed to fetch volume. Skipping.");

					report.failed += 1;
					time::sleep(inter_item_delay).await;

					continue;
				},
			};
			let Some(isbn) = record.preferred_isbn() else {
				report.failed += 1;
				time::sleep(inter_item_delay).await;

				continue;
			};
			let mut savepoint = tx.begin().await?;

			match queries::update_isbn_by_id(&mut *savepoint, row.id, &isbn).await {
				Ok(_) => {
					savepoint.commit().await?;

					report.updated += 1;

					if report.updated % commit_every == 0 {
						tx.commit().await?;

						tx = self.db.pool.begin().await?;
					}
				},
				Err(err) => {
					savepoint.rollback().await?;

					warn!(external_id = %row.external_id, error = %err, "Failed to write ISBN. Skipping.");

					report.failed += 1;
				},
			}

			time::sleep(inter_item_delay).await;
		}

		tx.commit().await?;

		Ok(report)
	}

	/// Recomputes every row's embedding from its current title and
	/// description. Run after switching the embedding model; idempotent per
	/// row, so an interrupted run is safe to restart from the beginning.
	/// Commits every `batch_size` rows (default from config).
	pub async fn reembed_all(&self, batch_size: Option<u32>) -> Result<ReembedReport> {
		let batch_size = batch_size.unwrap_or(self.cfg.ingest.reembed_batch_size) as u64;
		let rows = queries::select_all_for_reembedding(&self.db).await?;
		let mut report = ReembedReport::default();
		let mut tx = self.db.pool.begin().await?;

		info!(total = rows.len(), "Re-embedding catalog.");

		for row in rows {
			let embeddable =
				text::embeddable_text(&row.title, row.description.as_deref().unwrap_or_default());
			let embedding = match self.embed_one(&embeddable).await {
				Ok(embedding) => embedding,
				Err(err) => {
					warn!(id = row.id, error = %err, "Failed to re-embed book. Skipping.");

					report.failed += 1;

					continue;
				},
			};

			queries::update_embedding(&mut *tx, row.id, &embedding).await?;

			report.updated += 1;

			if report.updated % batch_size == 0 {
				tx.commit().await?;

				tx = self.db.pool.begin().await?;

				info!(updated = report.updated, "Re-embedding progress.");
			}
		}

		tx.commit().await?;

		Ok(report)
	}
}
