use std::env;
use std::ops::RangeInclusive;

use anyhow::Context;

use crate::intelligence::IntelligenceConfig;

/// One year; also keeps `chrono::Duration::hours` in range.
const MAX_WINDOW_HOURS: i64 = 24 * 365;
const MAX_COORDINATION_WINDOW_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Bearer token for /api routes; auth disabled when unset
    pub api_token: Option<String>,

    // Session history
    pub session_ttl_hours: i64,
    pub session_sweep_interval_secs: u64,

    // Whale heuristics
    pub intelligence: IntelligenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            api_token: None,
            session_ttl_hours: 24,
            session_sweep_interval_secs: 300,
            intelligence: IntelligenceConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let mut intelligence = IntelligenceConfig::default();
        intelligence.behavior.window_hours = bounded_env(
            "WHALE_WINDOW_HOURS",
            intelligence.behavior.window_hours,
            1..=MAX_WINDOW_HOURS,
        )?;
        intelligence.behavior.coordination_window_secs = bounded_env(
            "COORDINATION_WINDOW_SECS",
            intelligence.behavior.coordination_window_secs,
            1..=MAX_COORDINATION_WINDOW_SECS,
        )?;

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            session_ttl_hours: bounded_env(
                "SESSION_TTL_HOURS",
                defaults.session_ttl_hours,
                1..=MAX_WINDOW_HOURS,
            )?,
            session_sweep_interval_secs: env::var("SESSION_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .unwrap_or(defaults.session_sweep_interval_secs),
            intelligence,
        })
    }

    /// Returns true if protected routes require a bearer token.
    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_WINDOW_HOURS))
    }
}

fn bounded_env(name: &str, default: i64, range: RangeInclusive<i64>) -> anyhow::Result<i64> {
    parse_bounded(name, env::var(name).ok().as_deref(), default, range)
}

/// Unset or blank falls back to `default`; anything else must parse and lie in `range`.
fn parse_bounded(
    name: &str,
    raw: Option<&str>,
    default: i64,
    range: RangeInclusive<i64>,
) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(default);
    };
    let value: i64 = raw
        .parse()
        .with_context(|| format!("{name} must be an integer, got {raw:?}"))?;
    if !range.contains(&value) {
        anyhow::bail!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_or_blank_uses_default() {
        assert_eq!(parse_bounded("X", None, 24, 1..=48).unwrap(), 24);
        assert_eq!(parse_bounded("X", Some("  "), 24, 1..=48).unwrap(), 24);
        assert_eq!(parse_bounded("X", Some(" 36 "), 24, 1..=48).unwrap(), 36);
    }

    #[test]
    fn test_out_of_range_hours_rejected() {
        let err = parse_bounded(
            "SESSION_TTL_HOURS",
            Some("9223372036854775807"),
            24,
            1..=MAX_WINDOW_HOURS,
        )
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_HOURS must be between 1 and 8760"));

        assert!(parse_bounded("WHALE_WINDOW_HOURS", Some("0"), 48, 1..=MAX_WINDOW_HOURS).is_err());
        assert!(parse_bounded("WHALE_WINDOW_HOURS", Some("-5"), 48, 1..=MAX_WINDOW_HOURS).is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = parse_bounded("COORDINATION_WINDOW_SECS", Some("1h"), 3_600, 1..=86_400)
            .unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn test_session_ttl_never_panics() {
        let config = AppConfig {
            session_ttl_hours: i64::MAX,
            ..AppConfig::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::hours(MAX_WINDOW_HOURS));
    }
}
