//! Startup configuration for projdesk-web
//!
//! Command-line flags and environment variables are parsed by clap; anything
//! still unset is taken from the TOML file, then from compiled defaults.
//! The result is read once and never changes for the process lifetime.

use clap::Parser;
use projdesk_common::config::{resolve_optional, resolve_required, TomlConfig};
use projdesk_common::{Error, Result};
use std::fmt;
use std::path::PathBuf;

use crate::services::{BatchPolicy, CrmSettings};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_ASSOCIATION_TYPE: &str = "project_to_contact";
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Command-line arguments for projdesk-web
#[derive(Parser, Debug, Default)]
#[command(name = "projdesk-web")]
#[command(about = "Web front end for project records stored in HubSpot CRM")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// HubSpot private app access token
    #[arg(long, env = "HUBSPOT_API_KEY", hide_env_values = true)]
    pub hubspot_api_key: Option<String>,

    /// Custom object type holding projects (e.g. "2-1234567" or "p_projects")
    #[arg(long = "object-type", env = "HUBSPOT_PROJECT_OBJECT_TYPE")]
    pub project_object_type: Option<String>,

    /// HubSpot API base URL
    #[arg(long, env = "HUBSPOT_BASE_URL")]
    pub hubspot_base_url: Option<String>,

    /// Association type label for project → contact links
    #[arg(long, env = "HUBSPOT_ASSOCIATION_TYPE")]
    pub association_type: Option<String>,

    /// Contact batching for the listing: per-page or per-project
    #[arg(long, env = "PROJDESK_BATCH_POLICY")]
    pub batch_policy: Option<String>,

    /// Directory served under /public
    #[arg(long, env = "PROJDESK_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "PROJDESK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Resolved, immutable configuration
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub hubspot_api_key: String,
    pub hubspot_base_url: String,
    pub static_dir: PathBuf,
    pub crm: CrmSettings,
}

impl AppConfig {
    /// Merge arguments/environment over the TOML file and defaults
    pub fn resolve(args: Args, toml: TomlConfig) -> Result<Self> {
        let hubspot_api_key = resolve_required(
            "HubSpot api key",
            "--hubspot-api-key",
            "HUBSPOT_API_KEY",
            args.hubspot_api_key,
            toml.hubspot_api_key,
        )?;

        let project_object_type = resolve_required(
            "Project object type",
            "--object-type",
            "HUBSPOT_PROJECT_OBJECT_TYPE",
            args.project_object_type,
            toml.project_object_type,
        )?;

        let batch_policy = match resolve_optional("batch_policy", args.batch_policy, toml.batch_policy) {
            Some(policy) => policy.parse::<BatchPolicy>().map_err(Error::Config)?,
            None => BatchPolicy::default(),
        };

        Ok(Self {
            host: resolve_optional("host", args.host, toml.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            hubspot_api_key,
            hubspot_base_url: resolve_optional(
                "hubspot_base_url",
                args.hubspot_base_url,
                toml.hubspot_base_url,
            )
            .unwrap_or_else(|| DEFAULT_HUBSPOT_BASE_URL.to_string()),
            static_dir: args
                .static_dir
                .or(toml.static_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            crm: CrmSettings {
                project_object_type,
                association_type: resolve_optional(
                    "association_type",
                    args.association_type,
                    toml.association_type,
                )
                .unwrap_or_else(|| DEFAULT_ASSOCIATION_TYPE.to_string()),
                batch_policy,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// The access token stays out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("hubspot_api_key", &"<redacted>")
            .field("hubspot_base_url", &self.hubspot_base_url)
            .field("static_dir", &self.static_dir)
            .field("crm", &self.crm)
            .finish()
    }
}
