use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use crate::error::{MediaError, MediaResult};
use chrono::{DateTime, Utc};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

/// Playback links live for one hour.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(3600);

/// What to sign: one asset, in one format, for a bounded time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub public_id: String,
    pub format: String,
    pub resource_type: String,
    /// Delivery type of the stored asset (`upload`, `private`, `authenticated`)
    pub delivery_type: String,
    pub ttl: Duration,
}

impl DownloadRequest {
    /// MP4 download of an uploaded video, valid for [`DEFAULT_LINK_TTL`].
    pub fn video(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            format: "mp4".to_string(),
            resource_type: "video".to_string(),
            delivery_type: "upload".to_string(),
            ttl: DEFAULT_LINK_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Issues signed media links.
pub trait UrlSigner: Send + Sync {
    fn signed_download_url(&self, request: &DownloadRequest) -> MediaResult<String>;
}

#[derive(Clone, Debug)]
pub struct CloudinarySigner {
    config: CloudinaryConfig,
}

impl CloudinarySigner {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self { config }
    }

    /// Same as [`UrlSigner::signed_download_url`] with an explicit clock.
    pub fn signed_download_url_at(
        &self,
        request: &DownloadRequest,
        now: DateTime<Utc>,
    ) -> MediaResult<String> {
        if request.public_id.trim().is_empty() {
            return Err(MediaError::EmptyPublicId);
        }
        let ttl = chrono::Duration::from_std(request.ttl)
            .map_err(|e| MediaError::InvalidTtl(e.to_string()))?;
        if ttl <= chrono::Duration::zero() {
            return Err(MediaError::InvalidTtl("must be positive".to_string()));
        }

        let mut params = BTreeMap::new();
        params.insert("expires_at", (now + ttl).timestamp().to_string());
        params.insert("format", request.format.clone());
        params.insert("public_id", request.public_id.clone());
        params.insert("timestamp", now.timestamp().to_string());
        params.insert("type", request.delivery_type.clone());

        let signature = api_sign(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        let query = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain([
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}/v1_1/{}/{}/download?{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            request.resource_type,
            query
        ))
    }
}

impl UrlSigner for CloudinarySigner {
    fn signed_download_url(&self, request: &DownloadRequest) -> MediaResult<String> {
        let url = self.signed_download_url_at(request, Utc::now())?;
        tracing::debug!(public_id = %request.public_id, ttl_secs = request.ttl.as_secs(), "Signed media download URL");
        Ok(url)
    }
}

/// Cloudinary request signature: digest of the sorted, non-empty `k=v` pairs
/// joined with `&`, immediately followed by the API secret.
pub fn api_sign(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{}{}", to_sign, api_secret);

    match algorithm {
        SignatureAlgorithm::Sha1 => const_hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => const_hex::encode(Sha256::digest(payload.as_bytes())),
    }
}
