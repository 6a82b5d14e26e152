//! Google Drive upload with a service-account key.
//!
//! A short-lived RS256 assertion is signed with the key, exchanged at the
//! key's `token_uri` for an access token, and the PDF is sent as a
//! `multipart/related` upload (metadata part, then media part).
use crate::error::ReportError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tarnish_http::{Auth, HttpClient, RequestOpts};

pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_TTL_SECS: i64 = 3600;

/// The fields of a service-account JSON key this uploader needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| ReportError::Credentials(format!("{}: {e}", path.display())))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

pub struct DriveUploader {
    http: HttpClient,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    folder_id: String,
}

impl DriveUploader {
    pub fn new(key: ServiceAccountKey, folder_id: impl Into<String>) -> Result<Self, ReportError> {
        Self::with_upload_url(key, folder_id, DRIVE_UPLOAD_URL)
    }

    pub fn with_upload_url(
        key: ServiceAccountKey,
        folder_id: impl Into<String>,
        upload_url: &str,
    ) -> Result<Self, ReportError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ReportError::Credentials(format!("private_key: {e}")))?;
        let http = HttpClient::new(upload_url)?.with_timeout(Duration::from_secs(60));
        Ok(Self {
            http,
            key,
            signing_key,
            folder_id: folder_id.into(),
        })
    }

    fn assertion(&self) -> Result<String, ReportError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?)
    }

    async fn access_token(&self) -> Result<String, ReportError> {
        let assertion = self.assertion()?;
        let resp: TokenResponse = self
            .http
            .post_form(
                &self.key.token_uri,
                &[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", assertion.as_str()),
                ],
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(resp.access_token)
    }

    /// Upload a PDF into the configured folder and return its Drive id.
    pub async fn upload_pdf(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ReportError> {
        let token = self.access_token().await?;
        let boundary = format!("tarnish-{}", uuid::Uuid::new_v4().simple());
        let metadata = json!({ "name": file_name, "parents": [self.folder_id] });
        let body = multipart_related(&boundary, &metadata, "application/pdf", &bytes);

        let uploaded: UploadedFile = self
            .http
            .post_raw(
                "files?uploadType=multipart&fields=id",
                &format!("multipart/related; boundary={boundary}"),
                body,
                RequestOpts {
                    auth: Some(Auth::Bearer(&token)),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(file_name, file_id = %uploaded.id, folder = %self.folder_id, "report.drive.uploaded");
        Ok(uploaded.id)
    }
}

fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    media_type: &str,
    media: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
