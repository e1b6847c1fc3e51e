//! GitHub repository contents API client.
//!
//! Reads and conditionally writes single files through
//! `/repos/{owner}/{repo}/contents/{path}`. GitHub rejects a `PUT` whose `sha` is not the
//! file's current blob sha, which is what gives the store its compare-and-swap semantics.
//!
//! Files larger than 1 MB come back with an empty `content` and `encoding: "none"`; their
//! bytes are read again with the raw media type.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::*;
use provider_auth::http::HttpClient;
use provider_auth::oauth::providers::github::GITHUB_V3_MEDIA_TYPE;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::content_store::{ContentStore, StoredFile};
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};

/// Media type that makes `GET /contents/{path}` answer with the file bytes.
const GITHUB_RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// File object returned by `GET /contents/{path}`
#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
    sha: String,
}

/// Body of `PUT /contents/{path}`
#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: PutContentsFile,
}

#[derive(Debug, Deserialize)]
struct PutContentsFile {
    sha: String,
}

/// Repository coordinates for the contents API.
#[derive(Debug, Clone)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

/// GitHub contents API client implementing [`ContentStore`].
pub struct GitHubContentsClient {
    client: HttpClient,
    api_base_url: String,
    repository: Repository,
    access_token: SecretString,
}

impl GitHubContentsClient {
    pub fn new(
        client: HttpClient,
        api_base_url: &str,
        repository: Repository,
        access_token: SecretString,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            repository,
            access_token,
        }
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded_path = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base_url,
            urlencoding::encode(&self.repository.owner),
            urlencoding::encode(&self.repository.name),
            encoded_path
        )
    }

    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(self.contents_url(path))
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, GITHUB_RAW_MEDIA_TYPE)
            .send()
            .await
            .map_err(provider_auth::Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::unexpected_status("raw read", status, &body));
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn unexpected_status(action: &str, status: StatusCode, body: &str) -> Error {
        warn!("GitHub contents {} failed with {}: {}", action, status, body);
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
                "GitHub contents {action} returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl ContentStore for GitHubContentsClient {
    async fn fetch(&self, path: &str) -> Result<Option<StoredFile>, Error> {
        let response = self
            .client
            .get(self.contents_url(path))
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, GITHUB_V3_MEDIA_TYPE)
            .send()
            .await
            .map_err(provider_auth::Error::from)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{} does not exist yet", path);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::unexpected_status("read", status, &body));
        }

        let file: ContentsFile = response.json().await?;
        let content = match file.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps the base64 payload at 60 columns.
                let compact: String = file
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                STANDARD.decode(compact)?
            }
            encoding => {
                debug!(
                    "{} served with encoding {:?}, reading raw content",
                    path, encoding
                );
                self.fetch_raw(path).await?
            }
        };

        Ok(Some(StoredFile {
            content,
            revision: file.sha,
        }))
    }

    async fn compare_and_swap(
        &self,
        path: &str,
        content: &[u8],
        expected_revision: Option<&str>,
        message: &str,
    ) -> Result<String, Error> {
        let request = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            sha: expected_revision,
        };

        let response = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, GITHUB_V3_MEDIA_TYPE)
            .json(&request)
            .send()
            .await
            .map_err(provider_auth::Error::from)?;

        let status = response.status();
        match status {
            // 409: sha does not match; 422: sha missing for an existing file
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                info!(
                    "Conditional write of {} rejected ({}), revision moved on",
                    path, status
                );
                Err(Error {
                    source: Some(format!("contents PUT returned {status}").into()),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Conflict),
                })
            }
            s if s.is_success() => {
                let written: PutContentsResponse = response.json().await?;
                debug!("Wrote {} at revision {}", path, written.content.sha);
                Ok(written.content.sha)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(Self::unexpected_status("write", status, &body))
            }
        }
    }
}
