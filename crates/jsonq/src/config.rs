//! Engine configuration.
//!
//! [`EngineConfig`] controls when a view builds an equality index and when it
//! consults the result cache. Defaults suit interactive use; the
//! `JSONQ_*` environment variables override them through
//! [`EngineConfig::from_env`].

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Views longer than this get an equality index.
pub const DEFAULT_INDEX_THRESHOLD: usize = 100;
/// Views at least this long skip the result cache.
pub const DEFAULT_RESULT_CACHE_CEILING: usize = 10_000;

pub const ENV_INDEX_THRESHOLD: &str = "JSONQ_INDEX_THRESHOLD";
pub const ENV_RESULT_CACHE_CEILING: &str = "JSONQ_RESULT_CACHE_CEILING";
pub const ENV_USE_INDEX: &str = "JSONQ_USE_INDEX";

/// Tuning knobs for a view lineage.
///
/// # Example
///
/// ```
/// use jsonq::EngineConfig;
///
/// let config = EngineConfig::default().index_threshold(10).use_index(false);
/// assert_eq!(config.index_threshold, 10);
/// assert!(!config.use_index);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum length (exclusive) for a root view to carry an index.
    pub index_threshold: usize,
    /// Maximum length (exclusive) for a view to use the result cache.
    pub result_cache_ceiling: usize,
    /// Whether indexable conditions may use the index at all.
    pub use_index: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_threshold: DEFAULT_INDEX_THRESHOLD,
            result_cache_ceiling: DEFAULT_RESULT_CACHE_CEILING,
            use_index: true,
        }
    }
}

impl EngineConfig {
    pub fn index_threshold(mut self, threshold: usize) -> Self {
        self.index_threshold = threshold;
        self
    }

    pub fn result_cache_ceiling(mut self, ceiling: usize) -> Self {
        self.result_cache_ceiling = ceiling;
        self
    }

    pub fn use_index(mut self, enabled: bool) -> Self {
        self.use_index = enabled;
        self
    }

    /// Reads the configuration from the environment.
    ///
    /// Unset variables keep their default. Values that fail to parse keep
    /// the default too, with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            index_threshold: env_or(ENV_INDEX_THRESHOLD, defaults.index_threshold),
            result_cache_ceiling: env_or(ENV_RESULT_CACHE_CEILING, defaults.result_cache_ceiling),
            use_index: match env::var(ENV_USE_INDEX) {
                Ok(val) => {
                    val == "1" || val.eq_ignore_ascii_case("true") || val.eq_ignore_ascii_case("yes")
                }
                Err(_) => defaults.use_index,
            },
        }
    }

    /// Whether a root view of `len` records gets an index.
    pub fn wants_index(&self, len: usize) -> bool {
        self.use_index && len > self.index_threshold
    }

    /// Whether a view of `len` records may use the result cache.
    pub fn wants_result_cache(&self, len: usize) -> bool {
        len < self.result_cache_ceiling
    }
}

fn env_or<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, default = %default, "ignoring invalid setting");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ENV_INDEX_THRESHOLD);
        env::remove_var(ENV_RESULT_CACHE_CEILING);
        env::remove_var(ENV_USE_INDEX);
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.index_threshold, 100);
        assert_eq!(config.result_cache_ceiling, 10_000);
        assert!(config.use_index);
    }

    #[test]
    fn thresholds() {
        let config = EngineConfig::default();
        assert!(!config.wants_index(100));
        assert!(config.wants_index(101));
        assert!(!config.use_index(false).wants_index(1_000));

        assert!(config.wants_result_cache(9_999));
        assert!(!config.wants_result_cache(10_000));
    }

    #[test]
    #[serial]
    fn from_env_without_variables_is_default() {
        clear_env();
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    }

    #[test]
    #[serial]
    fn from_env_reads_variables() {
        clear_env();
        env::set_var(ENV_INDEX_THRESHOLD, "5");
        env::set_var(ENV_RESULT_CACHE_CEILING, " 50 ");
        env::set_var(ENV_USE_INDEX, "no");

        let config = EngineConfig::from_env();
        assert_eq!(config.index_threshold, 5);
        assert_eq!(config.result_cache_ceiling, 50);
        assert!(!config.use_index);
        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_accepts_flag_spellings() {
        clear_env();
        for val in ["1", "TRUE", "Yes"] {
            env::set_var(ENV_USE_INDEX, val);
            assert!(EngineConfig::from_env().use_index, "{val}");
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_ignores_garbage() {
        clear_env();
        env::set_var(ENV_INDEX_THRESHOLD, "lots");
        assert_eq!(
            EngineConfig::from_env().index_threshold,
            DEFAULT_INDEX_THRESHOLD
        );
        clear_env();
    }
}
