use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::session::SessionConfig;
use crate::editor::LinkFormat;

/// Environment variables with this prefix override the YAML file.
pub const ENV_PREFIX: &str = "ONLYOFFICE_PIPEDRIVE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
    pub crm: CrmConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// Load config from "config.yaml" in the current directory, with env overrides.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    match extract_config(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Extracts and validates a configuration from any figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, String> {
    let config = figment.extract::<Config>().map_err(|e| e.to_string())?;
    let Config::ConfigV1(c) = config;
    c.session.validate()?;
    Ok(c)
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error rendering schema: {}", e),
    }
}

/// The backend gateway that exchanges signed context tokens and builds editor configs.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GatewayConfig {
    pub base_url: String,
}

/// The company's CRM instance, e.g. "https://acme.pipedrive.com/".
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CrmConfig {
    pub base_url: String,
}

/// Stand-in values for the host extension runtime.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct SdkConfig {
    #[serde(default)]
    pub signed_token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct EditorConfig {
    #[serde(default = "default_editor_route")]
    pub route: String,
    #[serde(default)]
    pub link_format: LinkFormat,
    #[serde(default = "default_deal_id")]
    pub default_deal_id: String,
}

fn default_editor_route() -> String {
    "/editor".to_string()
}

fn default_deal_id() -> String {
    "1".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            route: default_editor_route(),
            link_format: LinkFormat::default(),
            default_deal_id: default_deal_id(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FilesConfig {
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_page_limit() -> u32 {
    50
}

fn default_sort() -> String {
    "add_time ASC".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            sort: default_sort(),
        }
    }
}
