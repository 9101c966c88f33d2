use time::OffsetDateTime;

/// A persisted catalog row, without the embedding column (vectors are only
/// ever read back through distance expressions).
#[derive(Debug, sqlx::FromRow)]
pub struct Book {
	pub id: i64,
	pub external_id: String,
	pub title: String,
	pub author: Option<String>,
	pub description: Option<String>,
	pub image_url: Option<String>,
	pub published_date: Option<String>,
	pub isbn: Option<String>,
	pub total_copies: i32,
	pub available_copies: i32,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// Field set written by the ingestion upsert. Copies apply to new rows only;
/// the conflict arm leaves them untouched.
#[derive(Debug, Clone)]
pub struct NewBook {
	pub external_id: String,
	pub title: String,
	pub author: String,
	pub description: String,
	pub image_url: String,
	pub published_date: String,
	pub isbn: Option<String>,
	pub embedding: Vec<f32>,
}

/// One nearest-neighbor hit, ordered by ascending cosine distance.
#[derive(Debug, sqlx::FromRow)]
pub struct BookHit {
	pub id: i64,
	pub external_id: String,
	pub title: String,
	pub author: Option<String>,
	pub description: Option<String>,
	pub image_url: Option<String>,
	pub published_date: Option<String>,
	pub distance: f64,
}

/// Row subset scanned by the re-embedding job.
#[derive(Debug, sqlx::FromRow)]
pub struct ReembedRow {
	pub id: i64,
	pub title: String,
	pub description: Option<String>,
}

/// Row subset scanned by the ISBN backfill job.
#[derive(Debug, sqlx::FromRow)]
pub struct MissingIsbnRow {
	pub id: i64,
	pub external_id: String,
}
