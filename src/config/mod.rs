//! Configuration management.
//!
//! Engine tunables grouped per concern, with hard defaults matching the
//! marketplace's production settings. A TOML file can override any subset;
//! unknown values fall back rather than fail.

use serde::Deserialize;
use std::time::Duration;

/// Main configuration for the search engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Fuzzy ranker tunables.
    pub fuzzy: FuzzyConfig,
    /// Result cache tunables.
    pub cache: CacheConfig,
    /// Suggestion engine tunables.
    pub suggest: SuggestConfig,
}

/// Fuzzy ranker tunables.
///
/// The field weights themselves are fixed in `services::fuzzy`; these
/// knobs control matching strictness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyConfig {
    /// Match distance above which a field does not count as matching.
    pub threshold: f32,
    /// Character span over which the position penalty reaches full
    /// weight.
    pub distance_tolerance: usize,
    /// Query tokens shorter than this are ignored.
    pub min_token_length: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            distance_tolerance: 100,
            min_token_length: 2,
        }
    }
}

/// Result cache tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for full search responses.
    pub search_ttl: Duration,
    /// TTL for autocomplete responses.
    pub autocomplete_ttl: Duration,
    /// Entry capacity for the in-memory backend.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(300),
            autocomplete_ttl: Duration::from_secs(60),
            capacity: 1024,
        }
    }
}

/// Suggestion engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestConfig {
    /// Minimum query length before sources are consulted.
    pub min_query_length: usize,
    /// How many terms each source contributes.
    pub per_source_limit: usize,
    /// Cap on the merged suggestion list.
    pub max_suggestions: usize,
    /// Per-source lookup deadline. Sources that miss it are omitted.
    pub source_timeout: Duration,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            per_source_limit: 5,
            max_suggestions: 10,
            source_timeout: Duration::from_millis(250),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Fuzzy section.
    pub fuzzy: Option<ConfigFileFuzzy>,
    /// Cache section.
    pub cache: Option<ConfigFileCache>,
    /// Suggest section.
    pub suggest: Option<ConfigFileSuggest>,
}

/// Fuzzy section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileFuzzy {
    /// Match threshold.
    pub threshold: Option<f32>,
    /// Position penalty span in characters.
    pub distance_tolerance: Option<usize>,
    /// Minimum token length.
    pub min_token_length: Option<usize>,
}

/// Cache section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCache {
    /// Search TTL in seconds.
    pub search_ttl_secs: Option<u64>,
    /// Autocomplete TTL in seconds.
    pub autocomplete_ttl_secs: Option<u64>,
    /// In-memory entry capacity.
    pub capacity: Option<usize>,
}

/// Suggest section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSuggest {
    /// Minimum query length.
    pub min_query_length: Option<usize>,
    /// Terms per source.
    pub per_source_limit: Option<usize>,
    /// Merged list cap.
    pub max_suggestions: Option<usize>,
    /// Per-source deadline in milliseconds.
    pub source_timeout_ms: Option<u64>,
}

impl EngineConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::InvalidInput(format!("cannot read config {}: {e}", path.display()))
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            crate::Error::InvalidInput(format!("cannot parse config {}: {e}", path.display()))
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Converts a `ConfigFile` to `EngineConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(fuzzy) = file.fuzzy {
            if let Some(v) = fuzzy.threshold {
                // Out-of-range thresholds would exclude everything or
                // nothing; clamp like request parameters.
                config.fuzzy.threshold = v.clamp(0.0, 1.0);
            }
            if let Some(v) = fuzzy.distance_tolerance {
                config.fuzzy.distance_tolerance = v.max(1);
            }
            if let Some(v) = fuzzy.min_token_length {
                config.fuzzy.min_token_length = v.max(1);
            }
        }
        if let Some(cache) = file.cache {
            if let Some(v) = cache.search_ttl_secs {
                config.cache.search_ttl = Duration::from_secs(v);
            }
            if let Some(v) = cache.autocomplete_ttl_secs {
                config.cache.autocomplete_ttl = Duration::from_secs(v);
            }
            if let Some(v) = cache.capacity {
                config.cache.capacity = v.max(1);
            }
        }
        if let Some(suggest) = file.suggest {
            if let Some(v) = suggest.min_query_length {
                config.suggest.min_query_length = v;
            }
            if let Some(v) = suggest.per_source_limit {
                config.suggest.per_source_limit = v;
            }
            if let Some(v) = suggest.max_suggestions {
                config.suggest.max_suggestions = v;
            }
            if let Some(v) = suggest.source_timeout_ms {
                config.suggest.source_timeout = Duration::from_millis(v);
            }
        }

        config
    }

    /// Sets the fuzzy tunables.
    #[must_use]
    pub const fn with_fuzzy(mut self, fuzzy: FuzzyConfig) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Sets the cache tunables.
    #[must_use]
    pub const fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the suggestion tunables.
    #[must_use]
    pub const fn with_suggest(mut self, suggest: SuggestConfig) -> Self {
        self.suggest = suggest;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.fuzzy.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.fuzzy.distance_tolerance, 100);
        assert_eq!(config.cache.search_ttl, Duration::from_secs(300));
        assert_eq!(config.cache.autocomplete_ttl, Duration::from_secs(60));
        assert_eq!(config.suggest.per_source_limit, 5);
        assert_eq!(config.suggest.max_suggestions, 10);
    }

    #[test]
    fn test_load_from_file_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cache]\nsearch_ttl_secs = 30\n\n[suggest]\nmax_suggestions = 4\n"
        )
        .unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.cache.search_ttl, Duration::from_secs(30));
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.autocomplete_ttl, Duration::from_secs(60));
        assert_eq!(config.suggest.max_suggestions, 4);
        assert!((config.fuzzy.threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_from_file_clamps_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fuzzy]\nthreshold = 7.5\n").unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert!((config.fuzzy.threshold - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let err = EngineConfig::load_from_file(std::path::Path::new("/nonexistent/soko.toml"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
    }
}
