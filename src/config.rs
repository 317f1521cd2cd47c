use anyhow::Result;
use serde::Deserialize;
use std::env;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::matching::QueryLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub document_dir: String,
    pub limits: QueryLimits,
}

pub fn load() -> Result<Config> {
    let database_url =
        env::var("LOTTERY_DB_PATH").unwrap_or_else(|_| "data/lottery.db".to_string());
    let document_dir =
        env::var("LOTTERY_DOCUMENT_DIR").unwrap_or_else(|_| "documents".to_string());

    let limits = query_limits(
        env::var("LOTTERY_MIN_DIGITS").ok().as_deref(),
        env::var("LOTTERY_MAX_DIGITS").ok().as_deref(),
    )?;

    Ok(Config {
        database_url,
        document_dir,
        limits,
    })
}

/// Log filter built from `RUST_LOG`-style directives. Unset, empty or
/// unparsable directives fall back to `info`.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn query_limits(min: Option<&str>, max: Option<&str>) -> Result<QueryLimits, ConfigError> {
    let defaults = QueryLimits::default();
    let min_digits = parse_digits("LOTTERY_MIN_DIGITS", min)?.unwrap_or(defaults.min_digits);
    let max_digits = parse_digits("LOTTERY_MAX_DIGITS", max)?.unwrap_or(defaults.max_digits);

    if min_digits > max_digits {
        return Err(ConfigError::InvertedLimits {
            min: min_digits,
            max: max_digits,
        });
    }
    Ok(QueryLimits {
        min_digits,
        max_digits,
    })
}

fn parse_digits(name: &'static str, value: Option<&str>) -> Result<Option<usize>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber {
                name,
                value: raw.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(query_limits(None, None).unwrap(), QueryLimits::default());
    }

    #[test]
    fn test_overrides() {
        let limits = query_limits(Some("6"), Some(" 8 ")).unwrap();
        assert_eq!(limits.min_digits, 6);
        assert_eq!(limits.max_digits, 8);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            query_limits(Some("four"), None),
            Err(ConfigError::InvalidNumber { name: "LOTTERY_MIN_DIGITS", .. })
        ));
        assert!(query_limits(None, Some("0")).is_err());
        assert_eq!(
            query_limits(Some("9"), Some("4")),
            Err(ConfigError::InvertedLimits { min: 9, max: 4 })
        );
    }

    #[test]
    fn test_log_filter_honours_directives() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter(Some("lotto_scan=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("lotto_scan=loud")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
