use config::{builder::DefaultState, ConfigBuilder};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub course_data_path: String,
}

impl Config {
    /// Defaults, then an optional `career-advisor.*` file, then `CAREER_*` env vars.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name("career-advisor").required(false))
            .add_source(config::Environment::with_prefix("CAREER").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5001)?
            .set_default("model_path", "ml_model/career_predictor_model.json")?
            .set_default(
                "course_data_path",
                "ml_model/course_suggestions_with_colleges.json",
            )
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
