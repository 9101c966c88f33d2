pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Request failed with status {status}: {context}")]
	Status { status: u16, context: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
