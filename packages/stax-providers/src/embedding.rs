use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use stax_config::EmbeddingProviderConfig;

use crate::{Error, Result};

/// Embeds `texts` against an OpenAI-compatible embeddings endpoint and
/// returns one unit-norm vector per input, in input order.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client.post(url).bearer_auth(&cfg.api_key).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;
	let mut vectors = parse_embedding_response(json)?;

	for vector in &mut vectors {
		l2_normalize(vector);
	}

	Ok(vectors)
}

/// Scales `vec` to unit L2 norm. A zero vector is left untouched; persisting
/// it would violate the norm invariant upstream, and callers treat that as a
/// provider failure.
pub fn l2_normalize(vec: &mut [f32]) {
	let norm = vec.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in vec.iter_mut() {
			*value /= norm;
		}
	}
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
