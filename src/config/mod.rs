// config/mod.rs
use crate::{dispatcher::DEFAULT_FAULT_LIMIT, error::SettingsError, models::Endpoint};
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use validator::Validate;

pub const CONFIG_FILE: &str = "config/lamp";
pub const ENV_PREFIX: &str = "LAMP";

#[derive(Debug, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub connection: ConnectionSettings,
    #[validate(nested)]
    pub metrics: MetricsSettings,
    #[validate(nested)]
    pub status: StatusSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Ws,
    Tcp,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConnectionSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub transport: TransportKind,
    /// Websocket request path. Unused for raw TCP.
    #[validate(length(min = 1))]
    pub path: String,
    #[validate(range(min = 1))]
    pub max_consecutive_faults: u32,
}

impl ConnectionSettings {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MetricsSettings {
    pub enabled: bool,
    #[validate(range(min = 1))]
    pub port: u16,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusSettings {
    pub enabled: bool,
    #[validate(length(min = 1))]
    pub address: String,
}

impl Settings {
    /// Defaults, then `config/lamp.*` if present, then `LAMP_*` variables
    /// (for example `LAMP_CONNECTION__PORT=9000`).
    pub fn new() -> Result<Self, SettingsError> {
        let builder = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::build(builder)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        Self::build(defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
    let endpoint = Endpoint::default();
    Ok(Config::builder()
        .set_default("connection.host", endpoint.host)?
        .set_default("connection.port", i64::from(endpoint.port))?
        .set_default("connection.transport", "ws")?
        .set_default("connection.path", "/")?
        .set_default(
            "connection.max_consecutive_faults",
            i64::from(DEFAULT_FAULT_LIMIT),
        )?
        .set_default("metrics.enabled", false)?
        .set_default("metrics.port", 9000_i64)?
        .set_default("status.enabled", false)?
        .set_default("status.address", "127.0.0.1:8080")?)
}
