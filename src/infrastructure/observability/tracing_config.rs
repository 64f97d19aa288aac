use tracing::level_filters::LevelFilter;

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Default filter directive when `RUST_LOG` is unset. Also caps what the
    /// in-memory log sink captures.
    pub level: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool, level: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            level: level.into(),
        }
    }

    pub fn capture_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            level: "info".to_string(),
        }
    }
}
