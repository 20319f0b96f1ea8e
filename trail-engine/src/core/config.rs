use std::path::PathBuf;

/// Engine configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/oficina/trail | Working directory (database, logs) |
/// | TRAIL_BUFFER_SIZE | 256 | Background worker channel capacity |
/// | TRAIL_DEFAULT_TZ | America/Sao_Paulo | Operating timezone for tenants without an explicit one |
/// | ENVIRONMENT | development | development \| staging \| production |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/trail TRAIL_DEFAULT_TZ=America/Recife cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// Capacity of the fire-and-forget action channel
    pub channel_buffer: usize,
    /// Operating timezone used when a tenant has not registered one
    pub default_timezone: chrono_tz::Tz,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the documented defaults; a malformed
    /// TRAIL_DEFAULT_TZ falls back to America/Sao_Paulo with a warning.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let default_timezone = std::env::var("TRAIL_DEFAULT_TZ")
            .ok()
            .and_then(|name| match name.parse::<chrono_tz::Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    tracing::warn!("Invalid TRAIL_DEFAULT_TZ '{}', using default", name);
                    None
                }
            })
            .unwrap_or(chrono_tz::America::Sao_Paulo);

        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/oficina/trail".into()),
            channel_buffer: std::env::var("TRAIL_BUFFER_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            default_timezone,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Path of the trail database file (work_dir/database/trail.redb)
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("trail.redb")
    }

    /// Directory for rolling log files (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/oficina/trail".into(),
            channel_buffer: 256,
            default_timezone: chrono_tz::America::Sao_Paulo,
            environment: "development".into(),
        }
    }
}
