use sqlx::{Executor, Postgres};

use crate::{
	Result,
	db::Db,
	models::{Book, BookHit, MissingIsbnRow, NewBook, ReembedRow},
	vector,
};

/// Atomic create-or-replace keyed on the `external_id` uniqueness constraint.
/// Returns `true` when the row was inserted, `false` when an existing row was
/// updated. `total_copies`/`available_copies` are only written by the insert
/// arm; lending manages them afterwards.
pub async fn upsert_book<'e, E>(executor: E, book: &NewBook) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let vec_text = vector::to_pg(&book.embedding);
	let inserted: bool = sqlx::query_scalar(
		"\
INSERT INTO books (
	external_id,
	title,
	author,
	description,
	image_url,
	published_date,
	isbn,
	embedding
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8::text::vector)
ON CONFLICT (external_id) DO UPDATE
SET
	title = EXCLUDED.title,
	author = EXCLUDED.author,
	description = EXCLUDED.description,
	image_url = EXCLUDED.image_url,
	published_date = EXCLUDED.published_date,
	isbn = EXCLUDED.isbn,
	embedding = EXCLUDED.embedding,
	updated_at = now()
RETURNING (xmax = 0) AS inserted",
	)
	.bind(book.external_id.as_str())
	.bind(book.title.as_str())
	.bind(book.author.as_str())
	.bind(book.description.as_str())
	.bind(book.image_url.as_str())
	.bind(book.published_date.as_str())
	.bind(book.isbn.as_deref())
	.bind(vec_text.as_str())
	.fetch_one(executor)
	.await?;

	Ok(inserted)
}

/// Sets `isbn` for the row matching `external_id`, only when it is still null.
/// Returns rows affected: 0 means no such row, or the row already carries an
/// ISBN.
pub async fn update_isbn_by_external_id<'e, E>(
	executor: E,
	external_id: &str,
	isbn: &str,
) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let result =
		sqlx::query("UPDATE books SET isbn = $1, updated_at = now() WHERE external_id = $2 AND isbn IS NULL")
			.bind(isbn)
			.bind(external_id)
			.execute(executor)
			.await?;

	Ok(result.rows_affected())
}

pub async fn update_isbn_by_id<'e, E>(executor: E, id: i64, isbn: &str) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let result =
		sqlx::query("UPDATE books SET isbn = $1, updated_at = now() WHERE id = $2 AND isbn IS NULL")
			.bind(isbn)
			.bind(id)
			.execute(executor)
			.await?;

	Ok(result.rows_affected())
}

pub async fn update_embedding<'e, E>(executor: E, id: i64, vec: &[f32]) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let vec_text = vector::to_pg(vec);

	sqlx::query("UPDATE books SET embedding = $1::text::vector, updated_at = now() WHERE id = $2")
		.bind(vec_text.as_str())
		.bind(id)
		.execute(executor)
		.await?;

	Ok(())
}

/// Top-`k` rows by ascending cosine distance to `query_vec`, scanning with
/// the given per-query `ef_search` effort. Rows without an embedding never
/// match.
pub async fn nearest_neighbors(
	db: &Db,
	query_vec: &[f32],
	k: u32,
	ef_search: u32,
) -> Result<Vec<BookHit>> {
	let vec_text = vector::to_pg(query_vec);
	let mut tx = db.pool.begin().await?;

	// SET LOCAL takes no bind parameters; ef_search is a validated integer.
	sqlx::query(&format!("SET LOCAL hnsw.ef_search = {ef_search}")).execute(&mut *tx).await?;

	let hits: Vec<BookHit> = sqlx::query_as(
		"\
SELECT
	id,
	external_id,
	title,
	author,
	description,
	image_url,
	published_date,
	(embedding <=> $1::text::vector)::float8 AS distance
FROM books
WHERE embedding IS NOT NULL
ORDER BY embedding <=> $1::text::vector
LIMIT $2",
	)
	.bind(vec_text.as_str())
	.bind(k as i64)
	.fetch_all(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(hits)
}

/// Rows still lacking an ISBN, ordered by id for deterministic, resumable
/// iteration.
pub async fn select_missing_isbn(db: &Db, limit: Option<i64>) -> Result<Vec<MissingIsbnRow>> {
	let rows: Vec<MissingIsbnRow> = sqlx::query_as(
		"\
SELECT id, external_id
FROM books
WHERE isbn IS NULL
ORDER BY id
LIMIT $1",
	)
	.bind(limit.unwrap_or(i64::MAX))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn select_all_for_reembedding(db: &Db) -> Result<Vec<ReembedRow>> {
	let rows: Vec<ReembedRow> =
		sqlx::query_as("SELECT id, title, description FROM books ORDER BY id")
			.fetch_all(&db.pool)
			.await?;

	Ok(rows)
}

pub async fn fetch_book_by_external_id(db: &Db, external_id: &str) -> Result<Option<Book>> {
	let book: Option<Book> = sqlx::query_as(
		"\
SELECT
	id,
	external_id,
	title,
	author,
	description,
	image_url,
	published_date,
	isbn,
	total_copies,
	available_copies,
	created_at,
	updated_at
FROM books
WHERE external_id = $1",
	)
	.bind(external_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(book)
}

/// Embedding rendered as its pgvector text literal, or none when the row has
/// not been embedded yet.
pub async fn fetch_embedding_text(db: &Db, id: i64) -> Result<Option<String>> {
	let text: Option<Option<String>> =
		sqlx::query_scalar("SELECT embedding::text FROM books WHERE id = $1")
			.bind(id)
			.fetch_optional(&db.pool)
			.await?;

	Ok(text.flatten())
}
