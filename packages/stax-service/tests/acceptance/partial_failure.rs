use stax_storage::queries;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn one_bad_record_does_not_abort_the_batch() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping one_bad_record_does_not_abort_the_batch; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let poisoned = format!("Broken {}", super::POISON_MARKER);
	let records = vec![
		super::record("vol-1", Some("First"), None, None),
		super::record("vol-2", Some(&poisoned), None, None),
		super::record("vol-3", Some("Third"), None, None),
	];
	let report = service.upsert_batch(&records).await.expect("Upsert failed.");

	assert_eq!(report.inserted, 2);
	assert_eq!(report.updated, 0);
	assert_eq!(report.failed, 1);

	let first = queries::fetch_book_by_external_id(&service.db, "vol-1")
		.await
		.expect("Lookup failed.");
	let second = queries::fetch_book_by_external_id(&service.db, "vol-2")
		.await
		.expect("Lookup failed.");
	let third = queries::fetch_book_by_external_id(&service.db, "vol-3")
		.await
		.expect("Lookup failed.");

	assert!(first.is_some_and(|book| book.title == "First"));
	assert!(second.is_none(), "The failing record must be rolled back alone.");
	assert!(third.is_some_and(|book| book.title == "Third"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
