//! Azure storage accounts behind the blob connector
//!
//! `object_store` reads and writes blobs but has no container management, so
//! container creation and existence checks go straight to the Blob REST API
//! with Shared Key authorization.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use object_store::ObjectStore;
use object_store::azure::MicrosoftAzureBuilder;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use sha2::Sha256;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::{ConnectorError, Result};

type HmacSha256 = Hmac<Sha256>;

const EMULATOR_ACCOUNT: &str = "devstoreaccount1";
/// Well-known key of the local storage emulator
const EMULATOR_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const EMULATOR_ENDPOINT: &str = "http://127.0.0.1:10000";
const API_VERSION: &str = "2021-08-06";

#[derive(Debug)]
pub(super) struct AzureAccount {
    pub(super) name: String,
    access_key: Option<String>,
    endpoint: Option<String>,
    emulator: bool,
    http: Client,
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
    ensured: RwLock<HashSet<String>>,
}

impl AzureAccount {
    /// Parse `AccountName=..;AccountKey=..[;BlobEndpoint=..]` or
    /// `UseDevelopmentStorage=true`
    pub(super) fn parse(connection_string: &str) -> Result<Self> {
        let mut name = None;
        let mut access_key = None;
        let mut endpoint = None;
        let mut emulator = false;

        for segment in connection_string.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ConnectorError::InvalidConnectionString("expected key=value segments".to_string())
            })?;
            match key.trim() {
                "AccountName" => name = Some(value.trim().to_string()),
                "AccountKey" => access_key = Some(value.trim().to_string()),
                "BlobEndpoint" => endpoint = Some(value.trim().trim_end_matches('/').to_string()),
                "UseDevelopmentStorage" => emulator = value.trim().eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        let name = match (name, emulator) {
            (Some(name), _) => name,
            (None, true) => EMULATOR_ACCOUNT.to_string(),
            (None, false) => {
                return Err(ConnectorError::InvalidConnectionString(
                    "AccountName is required".to_string(),
                ));
            }
        };

        Ok(Self {
            name,
            access_key,
            endpoint,
            emulator,
            http: Client::new(),
            stores: RwLock::new(HashMap::new()),
            ensured: RwLock::new(HashSet::new()),
        })
    }

    fn blob_endpoint(&self) -> String {
        match (&self.endpoint, self.emulator) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, true) => format!("{EMULATOR_ENDPOINT}/{}", self.name),
            (None, false) => format!("https://{}.blob.core.windows.net", self.name),
        }
    }

    fn signing_key(&self) -> Option<&str> {
        match (&self.access_key, self.emulator) {
            (Some(key), _) => Some(key),
            (None, true) => Some(EMULATOR_KEY),
            (None, false) => None,
        }
    }

    /// Store scoped to one container, built once per container
    pub(super) async fn store(&self, container: &str) -> Result<Arc<dyn ObjectStore>> {
        if let Some(store) = self.stores.read().await.get(container) {
            return Ok(store.clone());
        }

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(&self.name)
            .with_container_name(container)
            .with_use_emulator(self.emulator);
        if let Some(key) = &self.access_key {
            builder = builder.with_access_key(key);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"));
        }
        let store: Arc<dyn ObjectStore> = Arc::new(builder.build()?);

        tracing::info!(account = %self.name, container, "Opened blob container");
        Ok(self
            .stores
            .write()
            .await
            .entry(container.to_string())
            .or_insert(store)
            .clone())
    }

    /// Create `container` unless this account already did or saw it
    ///
    /// An existing container (`409 Conflict`) counts as success. Without a
    /// signing key the container is assumed to exist.
    pub(super) async fn ensure_container(&self, container: &str) -> Result<()> {
        if self.ensured.read().await.contains(container) {
            return Ok(());
        }
        let Some(key) = self.signing_key() else {
            tracing::debug!(container, "No account key, not creating container");
            return Ok(());
        };

        let response = self
            .container_request(Method::PUT, container, key)?
            .header(CONTENT_LENGTH, 0)
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED => {
                tracing::info!(account = %self.name, container, "Created blob container");
            }
            StatusCode::CONFLICT => tracing::debug!(container, "Blob container already exists"),
            status => {
                return Err(ConnectorError::ContainerRequest {
                    container: container.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        self.ensured.write().await.insert(container.to_string());
        Ok(())
    }

    /// `false` only when the service reports the container missing
    pub(super) async fn container_exists(&self, container: &str) -> Result<bool> {
        if self.ensured.read().await.contains(container) {
            return Ok(true);
        }
        let Some(key) = self.signing_key() else {
            return Ok(true);
        };

        let response = self.container_request(Method::HEAD, container, key)?.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ConnectorError::ContainerRequest {
                container: container.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    fn container_request(
        &self,
        method: Method,
        container: &str,
        key: &str,
    ) -> Result<RequestBuilder> {
        let url = Url::parse(&format!("{}/{container}?restype=container", self.blob_endpoint()))
            .map_err(|e| ConnectorError::InvalidConnectionString(e.to_string()))?;
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let to_sign = string_to_sign(method.as_str(), &date, &self.name, url.path());
        let signature = sign(key, &to_sign)?;

        Ok(self
            .http
            .request(method, url)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header("Authorization", format!("SharedKey {}:{signature}", self.name)))
    }
}

/// Shared Key string-to-sign for a `?restype=container` request without a body
fn string_to_sign(verb: &str, date: &str, account: &str, path: &str) -> String {
    // Content-Encoding through Range are all empty
    let mut s = format!("{verb}\n");
    s.push_str(&"\n".repeat(11));
    s.push_str(&format!("x-ms-date:{date}\nx-ms-version:{API_VERSION}\n"));
    s.push_str(&format!("/{account}{path}\nrestype:container"));
    s
}

fn sign(key: &str, data: &str) -> Result<String> {
    let key = STANDARD
        .decode(key)
        .map_err(|e| ConnectorError::InvalidConnectionString(format!("AccountKey: {e}")))?;
    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| ConnectorError::InvalidConnectionString(format!("AccountKey: {e}")))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request per status on a local port, returning the request heads
    async fn blob_service(statuses: &[u16]) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/{EMULATOR_ACCOUNT}", listener.local_addr().unwrap());
        let statuses = statuses.to_vec();

        let handle = tokio::spawn(async move {
            let mut heads = Vec::new();
            for status in statuses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                heads.push(String::from_utf8_lossy(&buf).to_string());

                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            heads
        });
        (endpoint, handle)
    }

    fn account_at(endpoint: &str) -> AzureAccount {
        AzureAccount::parse(&format!(
            "AccountName={EMULATOR_ACCOUNT};AccountKey={EMULATOR_KEY};BlobEndpoint={endpoint}"
        ))
        .unwrap()
    }

    #[test]
    fn test_parse_connection_string() {
        let account = AzureAccount::parse(
            "DefaultEndpointsProtocol=https;AccountName=contoso;AccountKey=a2V5;",
        )
        .unwrap();

        assert_eq!(account.name, "contoso");
        assert_eq!(account.access_key.as_deref(), Some("a2V5"));
        assert!(!account.emulator);
        assert_eq!(account.blob_endpoint(), "https://contoso.blob.core.windows.net");
    }

    #[test]
    fn test_parse_emulator_connection_string() {
        let account = AzureAccount::parse("UseDevelopmentStorage=true").unwrap();

        assert_eq!(account.name, EMULATOR_ACCOUNT);
        assert!(account.emulator);
        assert_eq!(account.blob_endpoint(), "http://127.0.0.1:10000/devstoreaccount1");
        assert_eq!(account.signing_key(), Some(EMULATOR_KEY));
    }

    #[test]
    fn test_parse_rejects_missing_account() {
        assert!(matches!(
            AzureAccount::parse("AccountKey=abc"),
            Err(ConnectorError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            AzureAccount::parse("garbage"),
            Err(ConnectorError::InvalidConnectionString(_))
        ));
    }

    #[test]
    fn test_string_to_sign_layout() {
        let s = string_to_sign("PUT", "Fri, 16 Oct 2026 10:00:00 GMT", "contoso", "/templates");

        let lines: Vec<&str> = s.split('\n').collect();
        assert_eq!(lines[0], "PUT");
        assert!(lines[1..12].iter().all(|l| l.is_empty()));
        assert_eq!(lines[12], "x-ms-date:Fri, 16 Oct 2026 10:00:00 GMT");
        assert_eq!(lines[13], format!("x-ms-version:{API_VERSION}"));
        assert_eq!(lines[14], "/contoso/templates");
        assert_eq!(lines[15], "restype:container");
    }

    #[test]
    fn test_sign_is_hmac_sha256() {
        let signature = sign("SmVmZQ==", "what do ya want for nothing?").unwrap();
        assert_eq!(signature, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");

        assert!(matches!(
            sign("not base64!", "x"),
            Err(ConnectorError::InvalidConnectionString(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_container_creates_once() {
        let (endpoint, service) = blob_service(&[201]).await;
        let account = account_at(&endpoint);

        account.ensure_container("templates").await.unwrap();
        // no second request: the service only answers once
        account.ensure_container("templates").await.unwrap();

        let heads = service.await.unwrap();
        assert_eq!(heads.len(), 1);
        assert!(heads[0].starts_with("PUT /devstoreaccount1/templates?restype=container "));
        let lower = heads[0].to_ascii_lowercase();
        assert!(lower.contains("authorization: sharedkey devstoreaccount1:"));
        assert!(lower.contains(&format!("x-ms-version: {API_VERSION}")));
        assert!(lower.contains("x-ms-date: "));
    }

    #[tokio::test]
    async fn test_ensure_existing_container_succeeds() {
        let (endpoint, service) = blob_service(&[409]).await;
        let account = account_at(&endpoint);

        account.ensure_container("templates").await.unwrap();
        assert!(account.container_exists("templates").await.unwrap());
        service.await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_container_surfaces_rejection() {
        let (endpoint, service) = blob_service(&[403]).await;
        let account = account_at(&endpoint);

        let err = account.ensure_container("templates").await.unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::ContainerRequest { ref container, status: 403 }
                if container == "templates"
        ));
        service.await.unwrap();
    }

    #[tokio::test]
    async fn test_container_exists() {
        let (endpoint, service) = blob_service(&[404, 200]).await;
        let account = account_at(&endpoint);

        assert!(!account.container_exists("missing").await.unwrap());
        assert!(account.container_exists("present").await.unwrap());

        let heads = service.await.unwrap();
        assert!(heads[0].starts_with("HEAD /devstoreaccount1/missing?restype=container "));
    }
}
