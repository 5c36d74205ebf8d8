use serde::Serialize;
use thiserror::Error;

use kontak_server_domain::profile::{Profile, ProfileUpdate};

pub mod editor;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or a response that never arrived. The single round
    /// trip either resolves or rejects once; no retries.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response. `message` comes from the `{"error": …}` body,
    /// falling back to `HTTP {status}`.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    /// Operation not available in the session's current state.
    #[error("{0}")]
    Session(String),
}

/// The HTTP contract the editor and viewer operate against. Abstracted so
/// sessions can run against an in-process service in tests.
#[async_trait::async_trait]
pub trait ProfileTransport {
    async fn get_public_profile(&self, unique_code: &str) -> Result<Profile, ApiError>;
    async fn verify_by_id(&self, id: &str, pin: &str) -> Result<String, ApiError>;
    async fn update_profile(
        &self,
        unique_code: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError>;
    async fn upload_profile_photo(
        &self,
        unique_code: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError>;
}

#[derive(Debug, Serialize)]
struct VerifyPayload<'a> {
    id: &'a str,
    pin: &'a str,
}

#[derive(Clone)]
pub struct KontakApi {
    base_url: String,
    client: reqwest::Client,
}

impl KontakApi {
    /// `base_url` is the API root, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn server_origin(&self) -> &str {
        self.base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url)
    }

    /// Uploaded images are served under `/uploads` on the API's origin;
    /// absolute URLs pass through untouched.
    pub fn to_server_file_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with("/uploads") {
            return format!("{}{}", self.server_origin(), path);
        }
        path.to_string()
    }

    async fn error_from_response(res: reqwest::Response) -> ApiError {
        let status = res.status().as_u16();
        let message = res
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(|e| e.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));
        ApiError::Api { status, message }
    }
}

#[async_trait::async_trait]
impl ProfileTransport for KontakApi {
    async fn get_public_profile(&self, unique_code: &str) -> Result<Profile, ApiError> {
        let res = self
            .client
            .get(format!("{}/profiles/{}", self.base_url, unique_code))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_from_response(res).await);
        }
        Ok(res.json().await?)
    }

    async fn verify_by_id(&self, id: &str, pin: &str) -> Result<String, ApiError> {
        let res = self
            .client
            .post(format!("{}/profiles/verify", self.base_url))
            .json(&VerifyPayload { id, pin })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_from_response(res).await);
        }
        let body: serde_json::Value = res.json().await?;
        match body.get("uniqueCode").and_then(|c| c.as_str()) {
            Some(code) => Ok(code.to_string()),
            None => Err(ApiError::Api {
                status: 200,
                message: "Verification succeeded but no unique code returned".to_string(),
            }),
        }
    }

    async fn update_profile(
        &self,
        unique_code: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError> {
        let res = self
            .client
            .put(format!("{}/profiles/{}", self.base_url, unique_code))
            .json(update)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_from_response(res).await);
        }
        Ok(res.json().await?)
    }

    async fn upload_profile_photo(
        &self,
        unique_code: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("photo", part);
        let res = self
            .client
            .post(format!("{}/profiles/{}/upload", self.base_url, unique_code))
            .multipart(form)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_from_response(res).await);
        }
        let body: serde_json::Value = res.json().await?;
        match body.get("profilePhoto").and_then(|p| p.as_str()) {
            Some(path) => Ok(path.to_string()),
            None => Err(ApiError::Api {
                status: 200,
                message: "Upload succeeded but no photo path returned".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_server_file_url() {
        let api = KontakApi::new("http://localhost:3001/api");
        assert_eq!(
            api.to_server_file_url("/uploads/abc.png"),
            "http://localhost:3001/uploads/abc.png"
        );
        assert_eq!(
            api.to_server_file_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(api.to_server_file_url(""), "");
        assert_eq!(api.to_server_file_url("a.png"), "a.png");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = KontakApi::new("http://localhost:3001/api/");
        assert_eq!(api.server_origin(), "http://localhost:3001");
    }
}
