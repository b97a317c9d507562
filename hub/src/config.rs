// hub/src/config.rs
//
// Env-driven configuration, loaded once at startup. Mirrors the flat
// env::var-with-fallback style of the service binary this is grounded on,
// collected into one typed struct instead of scattered call sites so
// thresholds can be range-checked before the server binds a socket.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,

    pub entity_threshold: usize,
    pub time_window_seconds: i64,

    pub critical_threshold: usize,
    pub high_threshold: usize,
    pub medium_threshold: usize,

    pub confidence_high_participants: usize,
    pub confidence_high_span_seconds: i64,
    pub confidence_medium_participants: usize,
    pub confidence_medium_span_seconds: i64,

    pub max_graph_age_seconds: i64,
    pub prune_interval_seconds: u64,
    pub max_advisories: usize,
    pub max_clock_skew_seconds: i64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment, applying the defaults from §6,
    /// then validate threshold ordering invariants. Fails fast rather than
    /// starting a server whose escalation rules can never fire correctly.
    pub fn from_env() -> Result<Self> {
        let api_key = match std::env::var("API_KEY") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                if std::env::var("APP_ENV").as_deref() == Ok("production") {
                    bail!("API_KEY must be set when APP_ENV=production");
                }
                tracing::warn!(
                    "API_KEY not set, using development key. Set this for production!"
                );
                "development_only_api_key".to_string()
            }
        };

        let cfg = Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8000),
            api_key,

            entity_threshold: env_or("ENTITY_THRESHOLD", 2),
            time_window_seconds: env_or("TIME_WINDOW_SECONDS", 300),

            critical_threshold: env_or("CRITICAL_THRESHOLD", 4),
            high_threshold: env_or("HIGH_THRESHOLD", 3),
            medium_threshold: env_or("MEDIUM_THRESHOLD", 2),

            confidence_high_participants: env_or("CONFIDENCE_HIGH_PARTICIPANTS", 3),
            confidence_high_span_seconds: env_or("CONFIDENCE_HIGH_SPAN_SECONDS", 180),
            confidence_medium_participants: env_or("CONFIDENCE_MEDIUM_PARTICIPANTS", 2),
            confidence_medium_span_seconds: env_or("CONFIDENCE_MEDIUM_SPAN_SECONDS", 300),

            max_graph_age_seconds: env_or("MAX_GRAPH_AGE_SECONDS", 3600),
            prune_interval_seconds: env_or("PRUNE_INTERVAL_SECONDS", 300),
            max_advisories: env_or("MAX_ADVISORIES", 1000),
            max_clock_skew_seconds: env_or("MAX_CLOCK_SKEW_SECONDS", 60),
        };

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.entity_threshold < 2 {
            bail!("ENTITY_THRESHOLD must be >= 2");
        }
        if !(self.critical_threshold >= self.high_threshold
            && self.high_threshold >= self.medium_threshold
            && self.medium_threshold >= self.entity_threshold)
        {
            bail!("escalation thresholds must satisfy critical >= high >= medium >= entity_threshold");
        }
        if !(self.confidence_high_participants >= self.confidence_medium_participants
            && self.confidence_medium_participants >= self.entity_threshold)
        {
            bail!("confidence participant boundaries must satisfy high >= medium >= entity_threshold");
        }
        if !(self.confidence_high_span_seconds <= self.confidence_medium_span_seconds
            && self.confidence_medium_span_seconds <= self.time_window_seconds)
        {
            bail!("confidence span boundaries must satisfy high <= medium <= time_window");
        }
        Ok(())
    }
}
