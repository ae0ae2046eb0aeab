use std::time::Duration;

use crate::config::helpers::{parse_u32_env, parse_u64_env};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Cache and retry policy for client resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// A cached record younger than this is served without refetching.
    pub stale_time: Duration,
    /// A cached record untouched for this long is evicted.
    pub gc_time: Duration,
    /// Automatic re-runs of the lookup chain after a failure.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            retry_attempts: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

fn validate_windows(stale_secs: u64, gc_secs: u64) -> Result<(), ConfigError> {
    if gc_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "RESOLVER_GC_SECS".to_string(),
            message: "eviction window must be greater than zero".to_string(),
        });
    }
    if gc_secs < stale_secs {
        return Err(ConfigError::InvalidValue {
            key: "RESOLVER_GC_SECS".to_string(),
            message: format!(
                "eviction window ({gc_secs}s) must not be shorter than the freshness window ({stale_secs}s)"
            ),
        });
    }
    Ok(())
}

impl ResolverConfig {
    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let stale_secs = parse_u64_env("RESOLVER_STALE_SECS", settings.resolver.stale_secs)?;
        let gc_secs = parse_u64_env("RESOLVER_GC_SECS", settings.resolver.gc_secs)?;
        validate_windows(stale_secs, gc_secs)?;

        Ok(Self {
            stale_time: Duration::from_secs(stale_secs),
            gc_time: Duration::from_secs(gc_secs),
            retry_attempts: parse_u32_env("RESOLVER_RETRY", settings.resolver.retry)?,
            retry_delay: Duration::from_millis(parse_u64_env(
                "RESOLVER_RETRY_DELAY_MS",
                settings.resolver.retry_delay_ms,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::ConfigError;
    use crate::settings::Settings;

    #[test]
    fn resolver_resolve_uses_query_defaults() {
        let config = super::ResolverConfig::resolve(&Settings::default()).expect("resolver");
        assert_eq!(config, super::ResolverConfig::default());
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.gc_time, Duration::from_secs(600));
        assert_eq!(config.retry_attempts, 1);
    }

    #[test]
    fn validate_windows_rejects_gc_shorter_than_stale() {
        let err = super::validate_windows(600, 300).expect_err("must reject");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "RESOLVER_GC_SECS");
        assert!(message.contains("freshness window"), "unexpected message: {message}");
    }

    #[test]
    fn validate_windows_rejects_zero_gc() {
        assert!(super::validate_windows(0, 0).is_err());
        assert!(super::validate_windows(0, 1).is_ok());
    }
}
