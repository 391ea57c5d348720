//! IPFS pinning services and the local daemon.
//!
//! Nothing in here touches the container pipeline: callers upload a finished
//! blob after `encode` or fetch one before `decode`. Clients are built from an
//! explicit [`RemoteConfig`]; credentials never come from globals.

use crate::error::{PpcError, Result};
use crate::fsio::write_atomic;
use reqwest::blocking::{multipart, Client};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const WEB3_ENDPOINT: &str = "https://api.web3.storage/upload";
pub const WEB3_GATEWAY: &str = "https://w3s.link";
pub const PINATA_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const PINATA_GATEWAY: &str = "https://gateway.pinata.cloud";
pub const DEFAULT_DAEMON_API: &str = "http://127.0.0.1:5001";
pub const DEFAULT_DAEMON_GATEWAY: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const WEB3_TOKEN_ENV: &str = "WEB3_STORAGE_TOKEN";
pub const PINATA_JWT_ENV: &str = "PINATA_JWT";

/// Remote storage backend options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Web3,
    Pinata,
    Daemon,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Web3 => "web3",
            Backend::Pinata => "pinata",
            Backend::Daemon => "daemon",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = PpcError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "web3" => Ok(Self::Web3),
            "pinata" => Ok(Self::Pinata),
            "daemon" | "local" => Ok(Self::Daemon),
            _ => Err(PpcError::UnknownBackend(s.to_string())),
        }
    }
}

/// Content-addressed upload target
pub trait PinningService {
    /// Backend name used in diagnostics
    fn name(&self) -> &'static str;

    /// Upload `data` under `filename`, returning its content id
    fn upload(&self, data: &[u8], filename: &str) -> Result<String>;

    /// Public URL for a content id
    fn gateway_url(&self, cid: &str) -> String;
}

/// Connection settings and credentials for every backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub web3_token: Option<String>,
    pub pinata_jwt: Option<String>,
    pub daemon_api: String,
    pub daemon_gateway: String,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            web3_token: None,
            pinata_jwt: None,
            daemon_api: DEFAULT_DAEMON_API.into(),
            daemon_gateway: DEFAULT_DAEMON_GATEWAY.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    /// Build the client for `backend`, failing if its credential is missing
    pub fn service(&self, backend: Backend) -> Result<Box<dyn PinningService>> {
        match backend {
            Backend::Web3 => {
                let token = require(&self.web3_token, "web3", WEB3_TOKEN_ENV)?;
                Ok(Box::new(Web3Storage::new(token, self.timeout)?))
            }
            Backend::Pinata => {
                let jwt = require(&self.pinata_jwt, "pinata", PINATA_JWT_ENV)?;
                Ok(Box::new(Pinata::new(jwt, self.timeout)?))
            }
            Backend::Daemon => Ok(Box::new(self.daemon()?)),
        }
    }

    pub fn daemon(&self) -> Result<LocalDaemon> {
        LocalDaemon::new(&self.daemon_api, &self.daemon_gateway, self.timeout)
    }

    /// Gateway URL without building a client (no credential needed)
    pub fn gateway_url(&self, backend: Backend, cid: &str) -> String {
        match backend {
            Backend::Web3 => ipfs_url(WEB3_GATEWAY, cid),
            Backend::Pinata => ipfs_url(PINATA_GATEWAY, cid),
            Backend::Daemon => ipfs_url(&self.daemon_gateway, cid),
        }
    }
}

fn require(
    value: &Option<String>,
    backend: &'static str,
    env_var: &'static str,
) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(PpcError::CredentialMissing { backend, env_var }),
    }
}

fn ipfs_url(gateway: &str, cid: &str) -> String {
    format!("{}/ipfs/{}", gateway.trim_end_matches('/'), cid)
}

fn http_client(backend: &'static str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(network(backend))
}

fn network(backend: &'static str) -> impl Fn(reqwest::Error) -> PpcError {
    move |e| PpcError::Network {
        backend,
        message: e.to_string(),
    }
}

fn unexpected(backend: &'static str, body: &Value) -> PpcError {
    PpcError::Network {
        backend,
        message: format!("unexpected response: {}", body),
    }
}

fn file_form(data: &[u8], filename: &str) -> multipart::Form {
    let part = multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
    multipart::Form::new().part("file", part)
}

/// POST a multipart upload and return the JSON body
fn post_file(
    client: &Client,
    backend: &'static str,
    url: &str,
    bearer: Option<&str>,
    data: &[u8],
    filename: &str,
) -> Result<Value> {
    let mut request = client.post(url).multipart(file_form(data, filename));
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    tracing::info!(backend, bytes = data.len(), filename, "uploading");
    request
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.json::<Value>())
        .map_err(network(backend))
}

/// Content ids are multibase strings; anything else is refused before it
/// reaches a URL
pub fn validate_cid(cid: &str) -> Result<()> {
    if !cid.is_empty() && cid.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(PpcError::InvalidContentId(cid.to_string()))
    }
}

/// `{"cid": "..."}`, `{"cid": {"/": "..."}}` or `{"value": {"cid": "..."}}`
pub fn parse_web3_response(body: &Value) -> Result<String> {
    fn cid_of(v: &Value) -> Option<&str> {
        v.as_str().or_else(|| v.get("/").and_then(Value::as_str))
    }
    body.get("cid")
        .and_then(cid_of)
        .or_else(|| body.get("value").and_then(|v| v.get("cid")).and_then(cid_of))
        .map(str::to_string)
        .ok_or_else(|| unexpected("web3", body))
}

/// `{"IpfsHash": "...", ...}`
pub fn parse_pinata_response(body: &Value) -> Result<String> {
    body.get("IpfsHash")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unexpected("pinata", body))
}

/// `{"Name": "...", "Hash": "...", "Size": "..."}`
pub fn parse_daemon_add_response(body: &Value) -> Result<String> {
    body.get("Hash")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unexpected("daemon", body))
}

/// web3.storage upload API
pub struct Web3Storage {
    token: String,
    endpoint: String,
    client: Client,
}

impl Web3Storage {
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            token,
            endpoint: WEB3_ENDPOINT.into(),
            client: http_client("web3", timeout)?,
        })
    }
}

impl PinningService for Web3Storage {
    fn name(&self) -> &'static str {
        "web3"
    }

    fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        let body = post_file(
            &self.client,
            self.name(),
            &self.endpoint,
            Some(self.token.as_str()),
            data,
            filename,
        )?;
        parse_web3_response(&body)
    }

    fn gateway_url(&self, cid: &str) -> String {
        ipfs_url(WEB3_GATEWAY, cid)
    }
}

/// Pinata pinning API
pub struct Pinata {
    jwt: String,
    endpoint: String,
    client: Client,
}

impl Pinata {
    pub fn new(jwt: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            jwt,
            endpoint: PINATA_ENDPOINT.into(),
            client: http_client("pinata", timeout)?,
        })
    }
}

impl PinningService for Pinata {
    fn name(&self) -> &'static str {
        "pinata"
    }

    fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        let body = post_file(
            &self.client,
            self.name(),
            &self.endpoint,
            Some(self.jwt.as_str()),
            data,
            filename,
        )?;
        parse_pinata_response(&body)
    }

    fn gateway_url(&self, cid: &str) -> String {
        ipfs_url(PINATA_GATEWAY, cid)
    }
}

/// Local IPFS daemon (Kubo RPC API)
pub struct LocalDaemon {
    api: String,
    gateway: String,
    client: Client,
}

impl LocalDaemon {
    pub fn new(api: &str, gateway: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: api.trim_end_matches('/').to_string(),
            gateway: gateway.to_string(),
            client: http_client("daemon", timeout)?,
        })
    }

    /// Add a file from disk to the daemon
    pub fn upload_local(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "container.ppc".into());
        self.upload(&data, &filename)
    }

    /// Fetch `cid` from the daemon into `dest`
    pub fn download_local(&self, cid: &str, dest: &Path) -> Result<()> {
        validate_cid(cid)?;
        let url = format!("{}/api/v0/cat?arg={}", self.api, cid);
        tracing::info!(cid, "downloading");
        let bytes = self
            .client
            .post(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(network("daemon"))?;
        write_atomic(dest, &bytes)
    }
}

impl PinningService for LocalDaemon {
    fn name(&self) -> &'static str {
        "daemon"
    }

    fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        let url = format!("{}/api/v0/add", self.api);
        let body = post_file(&self.client, self.name(), &url, None, data, filename)?;
        parse_daemon_add_response(&body)
    }

    fn gateway_url(&self, cid: &str) -> String {
        ipfs_url(&self.gateway, cid)
    }
}
