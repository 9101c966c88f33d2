use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierKind {
	Isbn10,
	Isbn13,
	Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
	pub kind: IdentifierKind,
	pub value: String,
}

/// One item fetched from the external catalog, already lifted out of the wire
/// envelope. Ephemeral; only persisted through the upsert path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
	pub external_id: String,
	pub title: Option<String>,
	pub authors: Vec<String>,
	pub description_html: Option<String>,
	pub thumbnail_url: Option<String>,
	pub published_date: Option<String>,
	pub identifiers: Vec<Identifier>,
}
impl CatalogRecord {
	/// Records without a title cannot be embedded or listed and are dropped
	/// silently by ingestion.
	pub fn is_complete(&self) -> bool {
		!self.external_id.trim().is_empty()
			&& self.title.as_deref().map(|title| !title.trim().is_empty()).unwrap_or(false)
	}

	pub fn preferred_isbn(&self) -> Option<String> {
		preferred_isbn(&self.identifiers)
	}

	pub fn author(&self) -> String {
		join_authors(&self.authors)
	}
}

/// ISBN-13 wins over ISBN-10; anything else resolves to no ISBN at all.
pub fn preferred_isbn(identifiers: &[Identifier]) -> Option<String> {
	let mut isbn_10 = None;
	let mut isbn_13 = None;

	for identifier in identifiers {
		if identifier.value.trim().is_empty() {
			continue;
		}

		match identifier.kind {
			IdentifierKind::Isbn13 => isbn_13 = Some(identifier.value.clone()),
			IdentifierKind::Isbn10 => isbn_10 = Some(identifier.value.clone()),
			IdentifierKind::Other => {},
		}
	}

	isbn_13.or(isbn_10)
}

pub fn join_authors(authors: &[String]) -> String {
	if authors.is_empty() {
		return "Unknown".to_string();
	}

	authors.join(", ")
}
