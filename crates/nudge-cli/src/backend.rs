//! Backend selection.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

use nudge_core::types::BackendKind;
use nudge_core::{Backend, BackendUrl};
use nudge_file::FileBackend;
use nudge_http::{HttpBackend, HttpConfig};
use nudge_sync::SyncConfig;

/// Default per-call timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Backend URL: file:///dir, firebase://<project> or http(s)://gateway
    #[arg(long, env = "NUDGE_BACKEND")]
    pub backend: String,

    /// Web API key for the REST backend
    #[arg(long, env = "NUDGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Project id when the backend is a gateway URL
    #[arg(long, env = "NUDGE_PROJECT")]
    pub project: Option<String>,

    /// Storage bucket (defaults to <project>.appspot.com)
    #[arg(long, env = "NUDGE_BUCKET")]
    pub bucket: Option<String>,

    /// Limit for each remote call, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Everything needed to reopen a backend, persisted with the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub timeout_secs: u64,
}

impl From<BackendArgs> for BackendSettings {
    fn from(args: BackendArgs) -> Self {
        Self {
            url: args.backend,
            api_key: args.api_key,
            project: args.project,
            bucket: args.bucket,
            timeout_secs: args.timeout_secs,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sync settings using this backend's timeout.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default().with_remote_timeout(self.timeout())
    }

    /// Construct the auth, document and blob stores.
    pub fn open(&self) -> Result<Backend> {
        let url = BackendUrl::new(&self.url).context("Invalid backend URL")?;

        match url.kind() {
            BackendKind::File(root) => Ok(FileBackend::new(root).into_backend()),
            BackendKind::Firebase { project } => {
                let config = HttpConfig::new(self.require_api_key()?, project);
                self.http(config)
            }
            BackendKind::Rest(base) => {
                let Some(project) = self.project.clone() else {
                    bail!("A gateway backend needs --project (or NUDGE_PROJECT)");
                };
                let config = HttpConfig::new(self.api_key.clone().unwrap_or_default(), project)
                    .with_base_url(base);
                self.http(config)
            }
        }
    }

    fn http(&self, mut config: HttpConfig) -> Result<Backend> {
        if let Some(bucket) = &self.bucket {
            config = config.with_bucket(bucket);
        }
        let config = config.with_request_timeout(self.timeout());
        let backend = HttpBackend::new(config).context("Failed to set up HTTP client")?;
        Ok(backend.into_backend())
    }

    fn require_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .context("The hosted backend needs --api-key (or NUDGE_API_KEY)")
    }
}
