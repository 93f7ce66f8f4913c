use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,

    // Paths
    pub data_dir: PathBuf,

    // Reactor
    pub error_threshold: u32,
    #[serde(with = "humantime_serde_compat")]
    pub error_reset_window: Duration,
    #[serde(with = "humantime_serde_compat")]
    pub presence_grace: Duration,
    pub event_bus_capacity: usize,
}

/// Parámetros del reactor derivados de [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorTuning {
    /// Early-exit cuando los errores consecutivos superan este valor
    pub error_threshold: u32,
    /// Tiempo sin errores tras el último error que reinicia el contador
    pub error_reset_window: Duration,
    /// Espera tras TrackEnd antes de recalcular la presencia
    pub presence_grace: Duration,
}

impl Default for ReactorTuning {
    fn default() -> Self {
        Self {
            error_threshold: 5,
            error_reset_window: Duration::from_secs(10),
            presence_grace: Duration::from_secs(1),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN")?,

            // Paths
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "/app/data".to_string())
                .into(),

            // Reactor
            error_threshold: std::env::var("ERROR_THRESHOLD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            error_reset_window: humantime::parse_duration(
                &std::env::var("ERROR_RESET_WINDOW").unwrap_or_else(|_| "10s".to_string()),
            )?,
            presence_grace: humantime::parse_duration(
                &std::env::var("PRESENCE_GRACE").unwrap_or_else(|_| "1s".to_string()),
            )?,
            event_bus_capacity: std::env::var("EVENT_BUS_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()?,
        };

        std::fs::create_dir_all(&config.data_dir)?;

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Error threshold must be greater than 0
    /// - Error reset window must not be zero
    /// - Event bus capacity must be greater than 0
    pub fn validate(&self) -> Result<()> {
        if self.error_threshold == 0 {
            anyhow::bail!("Error threshold must be greater than 0");
        }

        if self.error_reset_window.is_zero() {
            anyhow::bail!("Error reset window must be greater than 0");
        }

        if self.event_bus_capacity == 0 {
            anyhow::bail!("Event bus capacity must be greater than 0");
        }

        Ok(())
    }

    pub fn tuning(&self) -> ReactorTuning {
        ReactorTuning {
            error_threshold: self.error_threshold,
            error_reset_window: self.error_reset_window,
            presence_grace: self.presence_grace,
        }
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// Excludes the Discord token.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Data: {}\n  \
            Errors: early-exit above {} consecutive, reset after {}\n  \
            Presence: grace {}\n  \
            Event bus: capacity {}",
            self.data_dir.display(),
            self.error_threshold,
            humantime::format_duration(self.error_reset_window),
            humantime::format_duration(self.presence_grace),
            self.event_bus_capacity,
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        let tuning = ReactorTuning::default();
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),

            // Path defaults
            data_dir: "/app/data".into(),

            // Reactor defaults
            error_threshold: tuning.error_threshold,
            error_reset_window: tuning.error_reset_window,
            presence_grace: tuning.presence_grace,
            event_bus_capacity: 256,
        }
    }
}

/// (De)serializa duraciones en formato humantime ("10s", "1m 30s").
mod humantime_serde_compat {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
