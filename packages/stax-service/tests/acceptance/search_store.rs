use stax_service::SearchRequest;
use stax_storage::{queries, vector};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn search_ranks_by_distance_and_skips_unembedded_rows() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping search_ranks_by_distance_and_skips_unembedded_rows; set STAX_PG_DSN to run."
		);

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	// No descriptions: each book embeds exactly its title, so a query equal
	// to one title lands at distance zero deterministically.
	let records = vec![
		super::record("vol-1", Some("Dune"), None, None),
		super::record("vol-2", Some("Cooking Basics"), None, None),
		super::record("vol-3", Some("Garden Birds"), None, None),
	];

	service.upsert_batch(&records).await.expect("Seeding upsert failed.");

	// A row that never got embedded must stay invisible to search.
	sqlx::query("INSERT INTO books (external_id, title) VALUES ($1, $2)")
		.bind("vol-unembedded")
		.bind("Invisible")
		.execute(&service.db.pool)
		.await
		.expect("Failed to insert unembedded row.");

	let request = SearchRequest { query: "Dune".to_string(), top_k: Some(10), ef_search: None };
	let results = service.search(request).await.expect("Search failed.");

	assert_eq!(results.len(), 3, "The unembedded row must be excluded.");
	assert!(results.iter().all(|result| result.external_id != "vol-unembedded"));
	assert_eq!(results[0].external_id, "vol-1", "The query title must rank first.");
	assert!(results[0].score > 0.99, "Identical text embeds at distance ~0.");

	for pair in results.windows(2) {
		assert!(pair[0].score >= pair[1].score, "Scores must descend with rank.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn persisted_embeddings_have_configured_dimension_and_unit_norm() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping persisted_embeddings_have_configured_dimension_and_unit_norm; set STAX_PG_DSN to run."
		);

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let records = vec![
		super::record("vol-1", Some("Dune"), Some("A desert planet."), None),
		super::record("vol-2", Some("Cooking Basics"), None, None),
	];

	service.upsert_batch(&records).await.expect("Seeding upsert failed.");

	for external_id in ["vol-1", "vol-2"] {
		let book = queries::fetch_book_by_external_id(&service.db, external_id)
			.await
			.expect("Lookup failed.")
			.expect("Book must exist.");
		let text = queries::fetch_embedding_text(&service.db, book.id)
			.await
			.expect("Embedding lookup failed.")
			.expect("Embedding must be present.");
		let vec = vector::parse_pg(&text).expect("Embedding text must parse.");
		let norm = vec.iter().map(|value| value * value).sum::<f32>().sqrt();

		assert_eq!(vec.len(), super::VECTOR_DIM as usize, "{external_id}");
		assert!((norm - 1.0).abs() < 1e-3, "{external_id} norm was {norm}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set STAX_PG_DSN to run."]
async fn reembedding_rewrites_every_row() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping reembedding_rewrites_every_row; set STAX_PG_DSN to run.");

		return;
	};
	let cfg = super::test_config(test_db.dsn().to_string());
	let service = super::build_service(cfg, super::providers()).await;
	let records = vec![
		super::record("vol-1", Some("Dune"), Some("A desert planet."), None),
		super::record("vol-2", Some("Cooking Basics"), None, None),
		super::record("vol-3", Some("Garden Birds"), None, None),
	];

	service.upsert_batch(&records).await.expect("Seeding upsert failed.");

	// Wipe one embedding to simulate a model change mid-fleet; the job must
	// leave every row embedded again.
	sqlx::query("UPDATE books SET embedding = NULL WHERE external_id = $1")
		.bind("vol-2")
		.execute(&service.db.pool)
		.await
		.expect("Failed to clear embedding.");

	let report = service.reembed_all(Some(2)).await.expect("Re-embedding failed.");

	assert_eq!(report.updated, 3);
	assert_eq!(report.failed, 0);

	for external_id in ["vol-1", "vol-2", "vol-3"] {
		let book = queries::fetch_book_by_external_id(&service.db, external_id)
			.await
			.expect("Lookup failed.")
			.expect("Book must exist.");
		let text = queries::fetch_embedding_text(&service.db, book.id)
			.await
			.expect("Embedding lookup failed.");

		assert!(text.is_some(), "{external_id} must be embedded after the job.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
