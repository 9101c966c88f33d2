use stax_storage::queries;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn reingesting_a_record_updates_in_place() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping reingesting_a_record_updates_in_place; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let mut record = super::record("vol-1", Some("Dune"), Some("<p>A desert planet.</p>"), None);
	let first = service
		.upsert_batch(std::slice::from_ref(&record))
		.await
		.expect("First upsert failed.");

	assert_eq!(first.inserted, 1);
	assert_eq!(first.updated, 0);
	assert_eq!(first.failed, 0);

	// Lending owns the copy counters after insert; re-ingestion must not
	// reset them.
	sqlx::query("UPDATE books SET total_copies = 7, available_copies = 3 WHERE external_id = $1")
		.bind("vol-1")
		.execute(&service.db.pool)
		.await
		.expect("Failed to adjust copies.");

	record.title = Some("Dune (Revised)".to_string());

	let second = service
		.upsert_batch(std::slice::from_ref(&record))
		.await
		.expect("Second upsert failed.");

	assert_eq!(second.inserted, 0);
	assert_eq!(second.updated, 1);
	assert_eq!(second.failed, 0);

	let book = queries::fetch_book_by_external_id(&service.db, "vol-1")
		.await
		.expect("Lookup failed.")
		.expect("Book must exist.");

	assert_eq!(book.title, "Dune (Revised)");
	assert_eq!(book.description.as_deref(), Some("A desert planet."));
	assert_eq!(book.author.as_deref(), Some("Test Author"));
	assert_eq!(book.total_copies, 7);
	assert_eq!(book.available_copies, 3);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn incomplete_records_are_dropped_silently() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping incomplete_records_are_dropped_silently; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let records = vec![
		super::record("vol-1", None, None, None),
		super::record("", Some("No Source"), None, None),
		super::record("vol-2", Some("Kept"), None, None),
	];
	let report = service.upsert_batch(&records).await.expect("Upsert failed.");

	assert_eq!(report.inserted, 1);
	assert_eq!(report.updated, 0);
	assert_eq!(report.failed, 0, "Dropped records must not count as failures.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
