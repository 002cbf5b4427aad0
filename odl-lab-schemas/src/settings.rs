use std::fmt;
use std::fmt::Formatter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use crate::cli_models::ConnectionArgs;
use crate::DEFAULT_CONFIG_FILE;

/// Everything needed to talk to the lab, read from `odl-lab.json`. Any value missing from the
/// file falls back to the defaults of a stock OpenDaylight install.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct LabConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Connection details for the controller's Restconf API. Once a controller client has been built
/// from this it is never changed.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ControllerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_credential")]
    pub username: String,
    #[serde(default = "default_credential")]
    pub password: String,
    /// applied to every request, no timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DiscoveryConfig {
    #[serde(default = "default_discovery_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_host() -> String {"opendaylight".to_string()}
fn default_port() -> u16 {8181}
fn default_credential() -> String {"admin".to_string()}
fn default_discovery_timeout() -> u64 {30}
fn default_poll_interval() -> u64 {2}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_credential(),
            password: default_credential(),
            request_timeout_secs: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_discovery_timeout(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl ControllerConfig {
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            request_timeout_secs: None,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}/restconf", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// keep the password out of logs
impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl fmt::Display for LabConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut redacted = self.clone();
        redacted.controller.password = "<redacted>".into();
        let json = serde_json::to_string_pretty(&redacted).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl LabConfig {
    /// Read the lab config. With no explicit path the default file in the current folder is used
    /// if it exists, otherwise the defaults are returned. An explicit path must exist.
    pub async fn read(path: Option<&Path>) -> anyhow::Result<LabConfig> {
        Self::read_or_default(path, Path::new(DEFAULT_CONFIG_FILE)).await
    }

    async fn read_or_default(path: Option<&Path>, default: &Path) -> anyhow::Result<LabConfig> {
        let name: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => {
                if !default.is_file() {
                    tracing::debug!("no {} found, using default config", default.display());
                    return Ok(LabConfig::default());
                }
                default.to_path_buf()
            }
        };
        tracing::trace!("expected lab config json location: {:?}", name);
        if !name.is_file() {
            bail!("could not read lab config at {}", name.display());
        }
        let text = tokio::fs::read_to_string(&name).await
            .with_context(|| format!("reading {}", name.display()))?;
        let config: LabConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", name.display()))?;
        Ok(config)
    }

    /// Values given on the command line win over the config file
    pub fn apply_overrides(&mut self, args: &ConnectionArgs) {
        if let Some(host) = &args.host {
            self.controller.host = host.clone();
        }
        if let Some(port) = args.port {
            self.controller.port = port;
        }
        if let Some(username) = &args.username {
            self.controller.username = username.clone();
        }
        if let Some(password) = &args.password {
            self.controller.password = password.clone();
        }
        if let Some(timeout) = args.request_timeout {
            self.controller.request_timeout_secs = Some(timeout);
        }
    }
}
