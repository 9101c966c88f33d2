use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use stax_config::CatalogProviderConfig;
use stax_domain::{CatalogRecord, Identifier, IdentifierKind};
use tokio::time;
use tracing::warn;

use crate::{
	Error, Result,
	retry::{AttemptOutcome, RetryPolicy},
};

#[derive(Debug, Deserialize)]
struct VolumesPage {
	#[serde(default)]
	items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
	id: Option<String>,
	#[serde(default, rename = "volumeInfo")]
	volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
	title: Option<String>,
	#[serde(default)]
	authors: Vec<String>,
	description: Option<String>,
	image_links: Option<ImageLinks>,
	published_date: Option<String>,
	#[serde(default)]
	industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
	thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
	#[serde(rename = "type")]
	kind: Option<String>,
	identifier: Option<String>,
}

pub fn client(cfg: &CatalogProviderConfig) -> Result<Client> {
	Ok(Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.user_agent(cfg.user_agent.clone())
		.build()?)
}

/// Pages through the volumes API for `keyword`, accumulating records until a
/// page comes back empty or `max_total` records have been collected.
///
/// Page-level failures (exhausted retries, non-success statuses, unparsable
/// bodies) stop pagination for this keyword and return whatever was
/// accumulated so far. Per-record problems are not this layer's concern; the
/// upsert path accounts for those strictly.
pub async fn fetch_volumes(
	cfg: &CatalogProviderConfig,
	client: &Client,
	keyword: &str,
	max_total: usize,
) -> Vec<CatalogRecord> {
	let policy = RetryPolicy::default();
	let url = format!("{}/volumes", cfg.api_base.trim_end_matches('/'));
	let page_size = cfg.page_size as usize;
	let mut records = Vec::new();
	let mut start_index = 0_usize;

	while records.len() < max_total {
		let max_results = cfg.page_size.to_string();
		let start = start_index.to_string();
		let mut request = client.get(&url).query(&[
			("q", keyword),
			("maxResults", max_results.as_str()),
			("startIndex", start.as_str()),
			("printType", "books"),
		]);

		if let Some(lang) = cfg.lang_restrict.as_deref() {
			request = request.query(&[("langRestrict", lang)]);
		}
		if let Some(key) = cfg.api_key.as_deref() {
			request = request.query(&[("key", key)]);
		}

		let response = match send_with_retry(&policy, request).await {
			Ok(response) => response,
			Err(err) => {
				warn!(%keyword, error = %err, "Catalog page fetch failed. Stopping pagination.");

				break;
			},
		};
		let status = response.status();

		if !status.is_success() {
			warn!(%keyword, status = status.as_u16(), "Catalog page returned an error status. Stopping pagination.");

			break;
		}

		let page: VolumesPage = match response.json().await {
			Ok(page) => page,
			Err(err) => {
				warn!(%keyword, error = %err, "Catalog page body was unparsable. Stopping pagination.");

				break;
			},
		};

		if page.items.is_empty() {
			break;
		}

		records.extend(page.items.into_iter().map(map_volume));

		start_index += page_size;
	}

	records.truncate(max_total);

	records
}

/// Fetches a single volume by its catalog id. Used by the ISBN backfill job;
/// failures here are strict (the job counts them), unlike keyword pagination.
pub async fn fetch_volume(
	cfg: &CatalogProviderConfig,
	client: &Client,
	external_id: &str,
) -> Result<CatalogRecord> {
	let policy = RetryPolicy::default();
	let url = format!("{}/volumes/{external_id}", cfg.api_base.trim_end_matches('/'));
	let mut request = client.get(&url);

	if let Some(key) = cfg.api_key.as_deref() {
		request = request.query(&[("key", key)]);
	}

	let response = send_with_retry(&policy, request).await?;
	let status = response.status();

	if !status.is_success() {
		return Err(Error::Status {
			status: status.as_u16(),
			context: format!("volume {external_id}"),
		});
	}

	let volume: Volume = response.json().await?;

	Ok(map_volume(volume))
}

/// Sends `request`, retrying transient outcomes per `policy`. The last
/// response or transport error is always surfaced to the caller, never
/// swallowed: a still-failing status after the final retry comes back as the
/// response itself.
async fn send_with_retry(policy: &RetryPolicy, request: RequestBuilder) -> Result<Response> {
	let mut attempt = 0_u32;

	loop {
		let cloned = request
			.try_clone()
			.ok_or_else(|| Error::InvalidResponse {
				message: "Catalog request is not retryable.".to_string(),
			})?;

		match cloned.send().await {
			Ok(response) => {
				let outcome = AttemptOutcome::Status(response.status().as_u16());

				if policy.should_retry(attempt, outcome) {
					time::sleep(policy.delay_for(attempt)).await;

					attempt += 1;

					continue;
				}

				return Ok(response);
			},
			Err(err) => {
				if policy.should_retry(attempt, AttemptOutcome::Transport) {
					time::sleep(policy.delay_for(attempt)).await;

					attempt += 1;

					continue;
				}

				return Err(err.into());
			},
		}
	}
}

fn map_volume(volume: Volume) -> CatalogRecord {
	let info = volume.volume_info;

	CatalogRecord {
		external_id: volume.id.unwrap_or_default(),
		title: info.title,
		authors: info.authors,
		description_html: info.description,
		thumbnail_url: info.image_links.and_then(|links| links.thumbnail),
		published_date: info.published_date,
		identifiers: info
			.industry_identifiers
			.into_iter()
			.filter_map(|identifier| {
				let value = identifier.identifier?;
				let kind = match identifier.kind.as_deref() {
					Some("ISBN_13") => IdentifierKind::Isbn13,
					Some("ISBN_10") => IdentifierKind::Isbn10,
					_ => IdentifierKind::Other,
				};

				Some(Identifier { kind, value })
			})
			.collect(),
	}
}
