//! Application configuration. Storage location, worker pool, logging.

use serde::Deserialize;

/// Lower bound for the default worker pool size.
pub const MIN_DEFAULT_WORKER_THREADS: usize = 4;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SERVICE_NAME: &str = "rating-service";
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding ratings.db. Read from RATING_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Max units of work running at once. Read from RATING_WORKER_THREADS or WORKER_THREADS.
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Default log filter when RUST_LOG is unset. Read from RATING_LOG_LEVEL or LOG_LEVEL.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Read from RATING_SERVICE_NAME.
    #[serde(default)]
    pub service_name: Option<String>,

    /// Deployment environment tag for logs. Read from RATING_ENVIRONMENT or ENVIRONMENT.
    #[serde(default)]
    pub environment: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("RATING").try_parsing(true));
        if let Ok(path) = std::env::var("RATING_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed names are honored for deployments that share one .env across services.
        if cfg.worker_threads.is_none() {
            if let Ok(s) = std::env::var("WORKER_THREADS") {
                if let Ok(n) = s.trim().parse::<usize>() {
                    cfg.worker_threads = Some(n);
                }
            }
        }
        if cfg.log_level.is_none() {
            cfg.log_level = std::env::var("LOG_LEVEL").ok();
        }
        if cfg.environment.is_none() {
            cfg.environment = std::env::var("ENVIRONMENT").ok();
        }
        Ok(cfg)
    }

    pub fn data_dir_or_default(&self) -> &str {
        non_blank(self.data_dir.as_deref()).unwrap_or(DEFAULT_DATA_DIR)
    }

    /// Worker pool size. Defaults to max(4, available parallelism); 0 counts as unset.
    pub fn worker_threads_or_default(&self) -> usize {
        match self.worker_threads {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .max(MIN_DEFAULT_WORKER_THREADS),
        }
    }

    pub fn log_level_or_default(&self) -> String {
        non_blank(self.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_lowercase()
    }

    pub fn service_name_or_default(&self) -> &str {
        non_blank(self.service_name.as_deref()).unwrap_or(DEFAULT_SERVICE_NAME)
    }

    pub fn environment_or_default(&self) -> &str {
        non_blank(self.environment.as_deref()).unwrap_or(DEFAULT_ENVIRONMENT)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
