use config::{Config, ConfigError, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub json_port: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub grpc_port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub create_if_missing: bool,
    // Deadline applied to every single store round-trip; on expiry the
    // operation is reported as a storage failure, never retried.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub operation_timeout_seconds: u64,
}

impl Settings {
    pub fn get_json_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.json_port)
    }

    pub fn get_grpc_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.grpc_port)
    }

    pub fn get_db_options(&self) -> SqliteConnectOptions {
        self.database.get_db_options()
    }

    pub fn get_operation_timeout(&self) -> Duration {
        self.database.get_operation_timeout()
    }

    pub fn set_json_port(&mut self, port: u16) {
        self.application.json_port = port;
    }

    pub fn set_grpc_port(&mut self, port: u16) {
        self.application.grpc_port = port;
    }

    pub fn set_db_path(&mut self, path: PathBuf) {
        self.database.path = path;
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> SqliteConnectOptions {
        let mut db_options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing);

        db_options.log_statements(tracing::log::LevelFilter::Trace);

        db_options
    }

    pub fn get_operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_seconds)
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_APPLICATION__JSON_PORT would set Settings.application.json_port
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
