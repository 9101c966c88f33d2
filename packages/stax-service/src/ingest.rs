use serde::Serialize;
use sqlx::Acquire;
use stax_domain::{CatalogRecord, text};
use stax_storage::{models::NewBook, queries};
use tracing::warn;

use crate::{CatalogService, Result};

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct IngestReport {
	pub inserted: u64,
	pub updated: u64,
	pub failed: u64,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct IsbnReport {
	pub updated: u64,
	pub skipped: u64,
	pub failed: u64,
}

impl CatalogService {
	/// Writes a batch of fetched records through the idempotent upsert path.
	///
	/// Records lacking a title or external id are dropped silently. Every other
	/// record is embedded and then upserted inside its own savepoint, so one
	/// bad record rolls back alone and the batch keeps going. The enclosing
	/// transaction commits every `ingest.batch_size` processed records and
	/// once at the end.
	pub async fn upsert_batch(&self, records: &[CatalogRecord]) -> Result<IngestReport> {
		let batch_size = self.cfg.ingest.batch_size as u64;
		let mut report = IngestReport::default();
		let mut processed = 0_u64;
		let mut tx = self.db.pool.begin().await?;

		for record in records {
			if !record.is_complete() {
				continue;
			}

			let title = record.title.as_deref().unwrap_or_default();
			let description =
				text::strip_markup(record.description_html.as_deref().unwrap_or_default());
			let embeddable = text::embeddable_text(title, &description);
			let embedding = match self.embed_one(&embeddable).await {
				Ok(embedding) => embedding,
				Err(err) => {
					warn!(%title, error = %err, "Failed to embed book. Skipping record.");

					report.failed += 1;
					processed += 1;

					continue;
				},
			};
			let book = NewBook {
				external_id: record.external_id.clone(),
				title: title.to_string(),
				author: record.author(),
				description,
				image_url: record.thumbnail_url.clone().unwrap_or_default(),
				published_date: record.published_date.clone().unwrap_or_default(),
				isbn: record.preferred_isbn(),
				embedding,
			};
			// Scoped sub-unit-of-work: a store failure rolls back this record
			// only, never the records already written in this batch.
			let mut savepoint = tx.begin().await?;

			match queries::upsert_book(&mut *savepoint, &book).await {
				Ok(inserted) => {
					savepoint.commit().await?;

					if inserted {
						report.inserted += 1;
					} else {
						report.updated += 1;
					}
				},
				Err(err) => {
					savepoint.rollback().await?;

					warn!(title = %book.title, error = %err, "Failed to save book. Continuing.");

					report.failed += 1;
				},
			}

			processed += 1;

			if processed % batch_size == 0 {
				tx.commit().await?;

				tx = self.db.pool.begin().await?;
			}
		}

		tx.commit().await?;

		Ok(report)
	}

	/// Lighter write path used when only backfilling identifiers from search
	/// results: updates `isbn` for rows matching the record's external id,
	/// never touching embeddings. Rows that already carry an ISBN, records
	/// without a resolvable ISBN, and unknown external ids are all skipped.
	pub async fn upsert_isbn_only(&self, records: &[CatalogRecord]) -> Result<IsbnReport> {
		let batch_size = self.cfg.ingest.isbn_batch_size as u64;
		let mut report = IsbnReport::default();
		let mut processed = 0_u64;
		let mut tx = self.db.pool.begin().await?;

		for record in records {
			if record.external_id.trim().is_empty() {
				report.skipped += 1;

				continue;
			}

			let Some(isbn) = record.preferred_isbn() else {
				report.skipped += 1;

				continue;
			};
			let mut savepoint = tx.begin().await?;

			match queries::update_isbn_by_external_id(&mut *savepoint, &record.external_id, &isbn).await
			{
				Ok(rows) => {
					savepoint.commit().await?;

					if rows > 0 {
						report.updated += 1;
					} else {
						report.skipped += 1;
					}
				},
				Err(err) => {
					savepoint.rollback().await?;

					warn!(external_id = %record.external_id, error = %err, "Failed to update ISBN. Continuing.");

					report.failed += 1;
				},
			}

			processed += 1;

			if processed % batch_size == 0 {
				tx.commit().await?;

				tx = self.db.pool.begin().await?;
			}
		}

		tx.commit().await?;

		Ok(report)
	}
}
