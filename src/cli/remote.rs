use crate::container::has_magic;
use crate::error::{PpcError, Result};
use crate::remote::{validate_cid, Backend, PinningService, RemoteConfig};
use std::path::Path;

/// Result of pushing a container to the local daemon
#[derive(Debug, Clone)]
pub struct PushReport {
    pub cid: String,
    pub url: String,
}

/// Public gateway URL for a content id
pub fn gateway_for(cid: &str, backend: Backend, config: &RemoteConfig) -> Result<String> {
    validate_cid(cid)?;
    Ok(config.gateway_url(backend, cid))
}

/// Upload a container file to the local daemon.
/// Files without the container magic are refused.
pub fn push_file(path: &Path, config: &RemoteConfig) -> Result<PushReport> {
    if !has_magic(path)? {
        return Err(PpcError::NotAContainer);
    }
    let daemon = config.daemon()?;
    let cid = daemon.upload_local(path)?;
    Ok(PushReport {
        url: daemon.gateway_url(&cid),
        cid,
    })
}

/// Download a content id from the local daemon into `output`
pub fn pull_file(cid: &str, output: &Path, config: &RemoteConfig) -> Result<()> {
    validate_cid(cid)?;
    config.daemon()?.download_local(cid, output)
}
