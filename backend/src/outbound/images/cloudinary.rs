//! Reqwest-backed Cloudinary image host.
//!
//! This adapter owns transport details only: request signing, multipart
//! encoding and HTTP error mapping.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{HostedImage, ImageHost, ImageHostError, ImageUpload};

/// Public Cloudinary REST endpoint.
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SIGNATURE_ALGORITHM: &str = "sha256";
const UPLOAD_FILE_NAME: &str = "upload";

/// Account credentials for the Cloudinary REST API.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl CloudinaryCredentials {
    /// Credentials when all three parts are present and non-blank.
    pub fn from_parts(
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Option<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: present(cloud_name)?,
            api_key: present(api_key)?,
            api_secret: Zeroizing::new(present(api_secret)?),
        })
    }
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`ImageHost`] speaking the Cloudinary upload API.
///
/// Without credentials every call fails with
/// [`ImageHostError::NotConfigured`].
pub struct CloudinaryImageHost {
    client: Client,
    api_base: Url,
    credentials: Option<CloudinaryCredentials>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CloudinaryImageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryImageHost")
            .field("api_base", &self.api_base.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl CloudinaryImageHost {
    /// Build an adapter posting to `api_base`.
    ///
    /// ```rust,ignore
    /// let base = Url::parse(DEFAULT_CLOUDINARY_API_BASE)?;
    /// let host = CloudinaryImageHost::new(credentials, base, Arc::new(DefaultClock))?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        credentials: Option<CloudinaryCredentials>,
        api_base: Url,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        if credentials.is_none() {
            warn!("Cloudinary credentials not fully configured; image uploads disabled");
        }
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base,
            credentials,
            clock,
        })
    }

    fn credentials(&self) -> Result<&CloudinaryCredentials, ImageHostError> {
        self.credentials
            .as_ref()
            .ok_or(ImageHostError::NotConfigured)
    }

    fn endpoint(&self, cloud_name: &str, action: &str) -> Result<Url, ImageHostError> {
        self.api_base
            .join(&format!("{cloud_name}/image/{action}"))
            .map_err(|error| ImageHostError::transport(format!("invalid endpoint: {error}")))
    }

    fn timestamp(&self) -> String {
        self.clock.utc().timestamp().to_string()
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ImageHostError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

/// Hex SHA-256 over `key=value` pairs sorted by key and joined with `&`,
/// followed by the API secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<HostedImage, ImageHostError> {
        let credentials = self.credentials()?;
        let endpoint = self.endpoint(&credentials.cloud_name, "upload")?;
        let timestamp = self.timestamp();
        let signature = sign(
            &[("folder", image.folder.as_str()), ("timestamp", timestamp.as_str())],
            credentials.api_secret.as_str(),
        );
        let size = image.bytes.len();
        let file = Part::bytes(image.bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(&image.content_type)
            .map_err(|error| ImageHostError::rejected(format!("invalid content type: {error}")))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", credentials.api_key.clone())
            .text("folder", image.folder)
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM);

        let body = self.send(self.client.post(endpoint).multipart(form)).await?;
        let uploaded: UploadResponse = serde_json::from_slice(&body).map_err(|error| {
            ImageHostError::transport(format!("invalid upload response: {error}"))
        })?;
        debug!(public_id = %uploaded.public_id, bytes = size, "image uploaded");
        Ok(HostedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageHostError> {
        let credentials = self.credentials()?;
        let endpoint = self.endpoint(&credentials.cloud_name, "destroy")?;
        let timestamp = self.timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            credentials.api_secret.as_str(),
        );
        let form = [
            ("public_id", public_id),
            ("api_key", credentials.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", SIGNATURE_ALGORITHM),
        ];

        let body = self.send(self.client.post(endpoint).form(&form[..])).await?;
        let destroyed: DestroyResponse = serde_json::from_slice(&body).map_err(|error| {
            ImageHostError::transport(format!("invalid destroy response: {error}"))
        })?;
        match destroyed.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                debug!(public_id, "image already absent from host");
                Ok(())
            }
            other => Err(ImageHostError::rejected(format!("destroy returned {other}"))),
        }
    }

    fn public_id_from_url(&self, url: &str) -> Option<String> {
        public_id_from_url(url)
    }
}

/// Derive `<folder>/<name>` from `…/upload/[v123/]<folder>/<name>.<ext>`.
fn public_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.skip_while(|segment| *segment != "upload");
    segments.next()?;
    let mut rest: Vec<&str> = segments.collect();
    if rest.first().is_some_and(|segment| is_version(segment)) {
        rest.remove(0);
    }
    let last = rest.pop()?;
    let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
    if stem.is_empty() {
        return None;
    }
    rest.push(stem);
    Some(rest.join("/"))
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn map_transport_error(error: reqwest::Error) -> ImageHostError {
    ImageHostError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageHostError {
    let detail = serde_json::from_slice::<ErrorResponse>(body)
        .map(|response| response.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).chars().take(160).collect());
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };
    if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
        ImageHostError::rejected(message)
    } else {
        ImageHostError::transport(message)
    }
}

#[cfg(test)]
#[path = "cloudinary_tests.rs"]
mod tests;
