//! Decoder configuration.
//!
//! Builder pattern for the options recognized at startup. Validation
//! happens in `Decoder::new`, single-threaded, before any record is
//! served.

use std::path::{Path, PathBuf};

/// Configuration for constructing a [`Decoder`](crate::Decoder).
///
/// ```
/// use ua_decoder::DecoderConfig;
///
/// let config = DecoderConfig::new()
///     .source_field("user_agent")
///     .rules_path("regexes.yaml")
///     .base_dir("/etc/ua-decoder")
///     .cache_size(10_000)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Record field holding the raw user-agent string. Required.
    pub(crate) source_field: String,

    /// Path to the classification rule file. Resolved against `base_dir`
    /// when relative.
    pub(crate) rules_path: PathBuf,

    /// Cache capacity in entries; `0` disables caching entirely.
    pub(crate) cache_size: usize,

    /// Host-provided base directory for relative rule paths.
    pub(crate) base_dir: Option<PathBuf>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            source_field: String::new(),
            rules_path: PathBuf::from("useragent/regexes.yaml"),
            cache_size: 0,
            base_dir: None,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the record field to read the raw user-agent string from.
    pub fn source_field(mut self, name: impl Into<String>) -> Self {
        self.source_field = name.into();
        self
    }

    /// Path to the rule file.
    pub fn rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = path.into();
        self
    }

    /// Cache capacity in entries. `0` disables caching.
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Base directory that relative rule paths are resolved against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// The rule-file path with `base_dir` applied.
    pub fn resolved_rules_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) if self.rules_path.is_relative() => base.join(&self.rules_path),
            _ => self.rules_path.clone(),
        }
    }

    /// The configured rule-file path as given.
    pub fn get_rules_path(&self) -> &Path {
        &self.rules_path
    }

    /// The configured cache capacity.
    pub fn get_cache_size(&self) -> usize {
        self.cache_size
    }
}
