//! Cache configuration and the TTL ladder.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SHORT_SECS: u64 = 60;
const DEFAULT_TTL_MEDIUM_SECS: u64 = 300;
const DEFAULT_TTL_LONG_SECS: u64 = 3600;
const DEFAULT_TTL_VERY_LONG_SECS: u64 = 86_400;

/// Named TTL tier for a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Volatile aggregates (dashboard stats).
    Short,
    /// Paginated list pages.
    Medium,
    /// Single-entity lookups.
    Long,
    /// Near-static sets (the category list).
    VeryLong,
}

/// Cache behavior knobs from the `[cache]` settings section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disabling turns every read into a store query and every set into a
    /// no-op; invalidation becomes trivially correct.
    pub enabled: bool,
    pub ttl_short_secs: u64,
    pub ttl_medium_secs: u64,
    pub ttl_long_secs: u64,
    pub ttl_very_long_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_short_secs: DEFAULT_TTL_SHORT_SECS,
            ttl_medium_secs: DEFAULT_TTL_MEDIUM_SECS,
            ttl_long_secs: DEFAULT_TTL_LONG_SECS,
            ttl_very_long_secs: DEFAULT_TTL_VERY_LONG_SECS,
        }
    }
}

impl CacheConfig {
    pub fn duration(&self, ttl: Ttl) -> Duration {
        let secs = match ttl {
            Ttl::Short => self.ttl_short_secs,
            Ttl::Medium => self.ttl_medium_secs,
            Ttl::Long => self.ttl_long_secs,
            Ttl::VeryLong => self.ttl_very_long_secs,
        };
        // A zero TTL would turn sets into immediate expiries; clamp to 1s.
        Duration::from_secs(secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.duration(Ttl::Short), Duration::from_secs(60));
        assert_eq!(config.duration(Ttl::Medium), Duration::from_secs(300));
        assert_eq!(config.duration(Ttl::Long), Duration::from_secs(3600));
        assert_eq!(config.duration(Ttl::VeryLong), Duration::from_secs(86_400));
    }

    #[test]
    fn zero_ttl_clamps_to_one_second() {
        let config = CacheConfig {
            ttl_short_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.duration(Ttl::Short), Duration::from_secs(1));
    }
}
