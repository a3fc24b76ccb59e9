//! Cloudinary uploads for photos, signatures and the media library.

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{config::Config, models::media::MediaType, services::metrics::UPLOADS_COUNTER};

const ROOT_FOLDER: &str = "taetae";

pub struct CloudStorage {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadOutcome {
    pub secure_url: String,
    pub public_id: String,
    pub resource_type: String,
    pub bytes: Option<u64>,
}

pub fn is_data_uri(payload: &str) -> bool {
    payload.starts_with("data:")
}

/// `image/png` from `data:image/png;base64,....`
pub fn data_uri_mime(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end]).filter(|m| !m.is_empty())
}

/// Best guess at what a payload holds: data URI MIME type, then well-known video
/// hosts, then the URL path extension.
pub fn infer_media_type(payload: &str) -> MediaType {
    if let Some(mime) = data_uri_mime(payload) {
        return MediaType::from_mime(mime);
    }
    let lower = payload.to_lowercase();
    if ["youtube.com/", "youtu.be/", "vimeo.com/"]
        .iter()
        .any(|host| lower.contains(host))
    {
        return MediaType::Video;
    }
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    mime_guess::from_path(path)
        .first()
        .map(|m| MediaType::from_mime(m.essence_str()))
        .unwrap_or(MediaType::Document)
}

/// Hex SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl CloudStorage {
    /// Returns None if Cloudinary credentials are not configured.
    pub fn new(config: &Config) -> Option<Self> {
        Some(Self {
            client: Client::new(),
            cloud_name: config.cloudinary_cloud_name.clone()?,
            api_key: config.cloudinary_api_key.clone()?,
            api_secret: config.cloudinary_api_secret.clone()?,
        })
    }

    /// Upload a base64 data URI or a remote URL and return the hosted copy.
    pub async fn upload(
        &self,
        payload: &str,
        folder: &str,
        tags: &[&str],
        media_type: MediaType,
    ) -> anyhow::Result<UploadOutcome> {
        let mut params: BTreeMap<&str, String> = BTreeMap::new();
        params.insert("folder", format!("{ROOT_FOLDER}/{folder}"));
        params.insert("timestamp", Utc::now().timestamp().to_string());
        if !tags.is_empty() {
            params.insert("tags", tags.join(","));
        }
        let signature = sign(&params, &self.api_secret);

        let mut form: Vec<(&str, String)> = params.into_iter().collect();
        form.push(("file", payload.to_string()));
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.cloud_name,
            media_type.resource_type()
        );

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .context("Cloudinary request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            UPLOADS_COUNTER.with_label_values(&["failed"]).inc();
            anyhow::bail!("Cloudinary upload failed ({status}): {text}");
        }

        let outcome: UploadOutcome = response
            .json()
            .await
            .context("Unexpected Cloudinary response")?;
        UPLOADS_COUNTER.with_label_values(&["ok"]).inc();
        tracing::info!("Uploaded {} to {}", outcome.public_id, folder);
        Ok(outcome)
    }
}

/// Turn a form payload into a URL worth storing.
///
/// Plain URLs are kept. Data URIs are uploaded when storage is configured;
/// otherwise they are kept inline so the submission is not lost.
pub async fn resolve_asset(
    storage: Option<&CloudStorage>,
    payload: &str,
    folder: &str,
    tags: &[&str],
) -> anyhow::Result<String> {
    if !is_data_uri(payload) {
        return Ok(payload.to_string());
    }
    match storage {
        Some(storage) => {
            let outcome = storage
                .upload(payload, folder, tags, infer_media_type(payload))
                .await?;
            Ok(outcome.secure_url)
        }
        None => {
            tracing::warn!("Cloud storage not configured, keeping {folder} payload inline");
            Ok(payload.to_string())
        }
    }
}
