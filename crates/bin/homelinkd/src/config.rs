//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homelink.toml` in the working directory. Every section is
//! optional; the defaults describe the reference device fleet (room light,
//! dorm device, pump, two climate sensors, two motion sensors). The token
//! secret has no default and must come from the file or the environment.

use std::collections::BTreeMap;

use serde::Deserialize;

use homelink_adapter_mqtt::MqttConfig;
use homelink_domain::error::ValidationError;
use homelink_domain::topics::{DeviceTopics, TopicMap};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// MQTT broker settings.
    pub mqtt: MqttConfig,
    /// Token and admin-seed settings.
    pub auth: AuthConfig,
    /// Transient-field decay settings.
    pub decay: DecayConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Actuator topic pairs, keyed by device id.
    #[serde(default = "default_devices")]
    pub devices: BTreeMap<String, DeviceTopics>,
    /// Sensor topics, keyed by sensor id.
    pub sensors: SensorsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Token issuance and admin seeding.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Required; no default.
    pub token_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
    /// Username of the admin seeded into an empty user store.
    pub admin_username: String,
    /// Password of the seeded admin. Leave empty to skip seeding.
    pub admin_password: String,
}

/// Transient-field decay configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Seconds a motion flag stays up without re-triggering.
    pub window_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Sensor topic tables, split by decay semantics.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Continuously-valued sensors.
    pub continuous: BTreeMap<String, String>,
    /// Transient (auto-expiring) sensors.
    pub transient: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from `homelink.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// merged configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homelink.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HOMELINK_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HOMELINK_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("HOMELINK_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("HOMELINK_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("HOMELINK_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Ok(val) = std::env::var("HOMELINK_MQTT_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.port = port;
            }
        }
        if let Ok(val) = std::env::var("HOMELINK_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Ok(val) = std::env::var("HOMELINK_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Ok(val) = std::env::var("HOMELINK_TOKEN_SECRET") {
            self.auth.token_secret = val;
        }
        if let Ok(val) = std::env::var("HOMELINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.auth.token_secret.is_empty() {
            return Err(ConfigError::Validation(
                "auth.token_secret must be set (file or HOMELINK_TOKEN_SECRET)".to_string(),
            ));
        }
        if self.devices.is_empty()
            && self.sensors.continuous.is_empty()
            && self.sensors.transient.is_empty()
        {
            return Err(ConfigError::Validation(
                "at least one device or sensor topic must be configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the immutable topic map from the configured tables.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTopicMap`] when no topics are
    /// configured (already rejected by [`Config::load`]).
    pub fn topic_map(&self) -> Result<TopicMap, ValidationError> {
        TopicMap::new(
            self.devices.clone(),
            self.sensors.continuous.clone(),
            self.sensors.transient.clone(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            mqtt: MqttConfig::default(),
            auth: AuthConfig::default(),
            decay: DecayConfig::default(),
            logging: LoggingConfig::default(),
            devices: default_devices(),
            sensors: SensorsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:homelink.db?mode=rwc".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_hours: 24,
            admin_username: "admin".to_string(),
            admin_password: String::new(),
        }
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self { window_secs: 3 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homelinkd=info,homelink=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        let mut continuous = BTreeMap::new();
        continuous.insert(
            "temperature".to_string(),
            "home/sensors/temperature".to_string(),
        );
        continuous.insert("humidity".to_string(), "home/sensors/humidity".to_string());

        let mut transient = BTreeMap::new();
        transient.insert("motionRoom".to_string(), "home/room/motion".to_string());
        transient.insert("motionDorm".to_string(), "home/dorm/motion".to_string());

        Self {
            continuous,
            transient,
        }
    }
}

fn default_devices() -> BTreeMap<String, DeviceTopics> {
    let mut devices = BTreeMap::new();
    devices.insert(
        "light".to_string(),
        DeviceTopics {
            control: "home/room/light/control".to_string(),
            status: "home/room/light/status".to_string(),
        },
    );
    devices.insert(
        "device".to_string(),
        DeviceTopics {
            control: "home/dorm/device/control".to_string(),
            status: "home/dorm/device/status".to_string(),
        },
    );
    devices.insert(
        "pump".to_string(),
        DeviceTopics {
            control: "home/pump/control".to_string(),
            status: "home/pump/status".to_string(),
        },
    );
    devices
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
