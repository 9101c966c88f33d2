use std::{collections::HashMap, time::Duration};

use stax_storage::queries;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn isbn_only_updates_never_clobber_existing_isbns() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping isbn_only_updates_never_clobber_existing_isbns; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let seeded = vec![
		super::record("vol-1", Some("With Isbn"), None, Some("9780000000111")),
		super::record("vol-2", Some("Without Isbn"), None, None),
	];

	service.upsert_batch(&seeded).await.expect("Seeding upsert failed.");

	let updates = vec![
		super::record("vol-1", Some("With Isbn"), None, Some("9780000000999")),
		super::record("vol-2", Some("Without Isbn"), None, Some("9780000000222")),
		super::record("vol-404", Some("Unknown"), None, Some("9780000000333")),
		super::record("vol-3", Some("No Identifier"), None, None),
	];
	let report = service.upsert_isbn_only(&updates).await.expect("ISBN update failed.");

	// vol-1 already carries an ISBN and vol-404 matches no row; both are
	// skipped alongside the identifier-less record.
	assert_eq!(report.updated, 1);
	assert_eq!(report.skipped, 3);
	assert_eq!(report.failed, 0);

	let with_isbn = queries::fetch_book_by_external_id(&service.db, "vol-1")
		.await
		.expect("Lookup failed.")
		.expect("Book must exist.");
	let without_isbn = queries::fetch_book_by_external_id(&service.db, "vol-2")
		.await
		.expect("Lookup failed.")
		.expect("Book must exist.");

	assert_eq!(with_isbn.isbn.as_deref(), Some("9780000000111"));
	assert_eq!(without_isbn.isbn.as_deref(), Some("9780000000222"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn backfill_fills_missing_isbns_and_counts_failures() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping backfill_fills_missing_isbns_and_counts_failures; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let mut volumes = HashMap::new();

	volumes.insert(
		"vol-2".to_string(),
		super::record("vol-2", Some("Without Isbn"), None, Some("9780000000333")),
	);

	let service = super::build_service(cfg, super::providers_with_catalog(volumes)).await;
	let seeded = vec![
		super::record("vol-1", Some("With Isbn"), None, Some("9780000000111")),
		super::record("vol-2", Some("Without Isbn"), None, None),
		super::record("vol-3", Some("Gone Upstream"), None, None),
	];

	service.upsert_batch(&seeded).await.expect("Seeding upsert failed.");

	let report =
		service.backfill_isbn(None, Duration::ZERO).await.expect("Backfill failed.");

	// vol-2 resolves upstream; vol-3 404s. vol-1 is never scanned at all.
	assert_eq!(report.updated, 1);
	assert_eq!(report.failed, 1);

	let filled = queries::fetch_book_by_external_id(&service.db, "vol-2")
		.await
		.expect("Lookup failed.")
		.expect("Book must exist.");
	let untouched = queries::fetch_book_by_external_id(&service.db, "vol-1")
		.await
		.expect("Lookup failed.")
		.expect("Book must exist.");

	assert_eq!(filled.isbn.as_deref(), Some("9780000000333"));
	assert_eq!(untouched.isbn.as_deref(), Some("9780000000111"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
